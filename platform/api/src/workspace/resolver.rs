use std::sync::Arc;

use ulid::Ulid;

use super::WorkspaceError;
use crate::database::{User, Workspace};
use crate::global::ApiGlobal;

/// Well-known name of the workspace selection header and cookie.
pub const WORKSPACE_HEADER: &str = "X-Workspace-ID";

/// Workspace selection hint carried by a request. Both carriers share the
/// [`WORKSPACE_HEADER`] name.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkspaceHint<'a> {
	pub header: Option<&'a str>,
	pub cookie: Option<&'a str>,
}

impl<'a> WorkspaceHint<'a> {
	/// The header wins over the cookie when both are present.
	pub fn value(&self) -> Option<&'a str> {
		self.header.or(self.cookie)
	}
}

/// Selects the workspace a request operates against.
///
/// A syntactically valid hint naming a non-archived workspace the user
/// belongs to is honored directly. Anything else (no hint, malformed hint,
/// unknown id, archived target, not a member) falls back to the first
/// accessible workspace in creation order. Resolution has no side effects;
/// transports that want a sticky default persist the choice themselves.
pub async fn resolve_workspace<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	hint: WorkspaceHint<'_>,
) -> Result<Workspace, WorkspaceError> {
	if let Some(id) = hint.value().and_then(|raw| Ulid::from_string(raw.trim()).ok()) {
		if let Some(workspace) = global.store().workspace_by_id(id).await? {
			if !workspace.is_archived && workspace.is_member(user.id) {
				return Ok(workspace);
			}
		}
	}

	global
		.store()
		.active_workspaces()
		.await?
		.into_iter()
		.find(|workspace| workspace.is_member(user.id))
		.ok_or(WorkspaceError::NoAccessibleWorkspace)
}

/// Every non-archived workspace the user belongs to, in creation order.
pub async fn accessible_workspaces<G: ApiGlobal>(global: &Arc<G>, user: &User) -> Result<Vec<Workspace>, WorkspaceError> {
	Ok(global
		.store()
		.active_workspaces()
		.await?
		.into_iter()
		.filter(|workspace| workspace.is_member(user.id))
		.collect())
}
