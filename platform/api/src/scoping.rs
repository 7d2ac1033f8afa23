use ulid::Ulid;

use crate::database::{Workspace, WorkspaceInvite};

/// Implemented by every record that belongs to a workspace.
pub trait TenantScoped {
	fn workspace_id(&self) -> Ulid;
	fn is_archived(&self) -> bool;
}

/// The tenant-scoping contract: every read and write of workspace-owned data
/// filters by the resolved workspace id and by the not-archived flag.
///
/// A scope can only be built from a `Workspace`, which callers obtain through
/// the resolver or the lifecycle guards, so an unchecked id cannot become a
/// scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceScope {
	workspace_id: Ulid,
}

impl WorkspaceScope {
	pub fn new(workspace: &Workspace) -> Self {
		Self {
			workspace_id: workspace.id,
		}
	}

	pub fn workspace_id(&self) -> Ulid {
		self.workspace_id
	}

	pub fn contains<R: TenantScoped>(&self, record: &R) -> bool {
		record.workspace_id() == self.workspace_id && !record.is_archived()
	}

	pub fn filter<R: TenantScoped>(self, records: impl IntoIterator<Item = R>) -> impl Iterator<Item = R> {
		records.into_iter().filter(move |record| self.contains(record))
	}
}

impl From<&Workspace> for WorkspaceScope {
	fn from(workspace: &Workspace) -> Self {
		Self::new(workspace)
	}
}

impl TenantScoped for WorkspaceInvite {
	fn workspace_id(&self) -> Ulid {
		self.workspace_id
	}

	// An accepted invite has left the pending set.
	fn is_archived(&self) -> bool {
		self.is_accepted()
	}
}
