use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use ulid::Ulid;

use super::{DataStore, ReactivationRedemption, StoreError};
use crate::database::{User, Workspace, WorkspaceInvite, WorkspaceReactivationToken};

/// In-memory [`DataStore`], used by the test suite and by embedders that do
/// not need durability.
///
/// Collections are `BTreeMap`s keyed by ULID, so iteration order is id order,
/// which for ULIDs is creation order. The single `RwLock` gives the
/// conditional updates their check-and-set atomicity.
#[derive(Default)]
pub struct MemoryStore {
	inner: RwLock<Collections>,
}

#[derive(Default)]
struct Collections {
	users: BTreeMap<Ulid, User>,
	workspaces: BTreeMap<Ulid, Workspace>,
	invites: BTreeMap<Ulid, WorkspaceInvite>,
	reactivation_tokens: BTreeMap<Ulid, WorkspaceReactivationToken>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl DataStore for MemoryStore {
	async fn user_by_id(&self, id: Ulid) -> Result<Option<User>, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner.users.get(&id).cloned())
	}

	async fn user_by_email(&self, email_key: &str) -> Result<Option<User>, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner
			.users
			.values()
			.find(|user| User::email_key(&user.email) == email_key)
			.cloned())
	}

	async fn users_by_ids(&self, ids: &[Ulid]) -> Result<Vec<User>, StoreError> {
		let inner = self.inner.read().await;
		Ok(ids.iter().filter_map(|id| inner.users.get(id).cloned()).collect())
	}

	async fn insert_user(&self, user: User) -> Result<(), StoreError> {
		let mut inner = self.inner.write().await;
		inner.users.insert(user.id, user);
		Ok(())
	}

	async fn workspace_by_id(&self, id: Ulid) -> Result<Option<Workspace>, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner.workspaces.get(&id).cloned())
	}

	async fn active_workspaces(&self) -> Result<Vec<Workspace>, StoreError> {
		let inner = self.inner.read().await;
		let mut workspaces: Vec<Workspace> = inner
			.workspaces
			.values()
			.filter(|workspace| !workspace.is_archived)
			.cloned()
			.collect();
		// Stable sort on top of id order, so same-timestamp inserts keep a
		// deterministic creation order.
		workspaces.sort_by_key(|workspace| workspace.created_at);
		Ok(workspaces)
	}

	async fn insert_workspace(&self, workspace: Workspace) -> Result<(), StoreError> {
		let mut inner = self.inner.write().await;
		inner.workspaces.insert(workspace.id, workspace);
		Ok(())
	}

	async fn save_workspace(&self, workspace: Workspace) -> Result<(), StoreError> {
		// Last write wins, whole document.
		let mut inner = self.inner.write().await;
		inner.workspaces.insert(workspace.id, workspace);
		Ok(())
	}

	async fn invite_by_id(&self, workspace_id: Ulid, invite_id: Ulid) -> Result<Option<WorkspaceInvite>, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner
			.invites
			.get(&invite_id)
			.filter(|invite| invite.workspace_id == workspace_id)
			.cloned())
	}

	async fn invite_by_token(&self, token: &str) -> Result<Option<WorkspaceInvite>, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner.invites.values().find(|invite| invite.token == token).cloned())
	}

	async fn pending_invite_by_email(
		&self,
		workspace_id: Ulid,
		email_key: &str,
	) -> Result<Option<WorkspaceInvite>, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner
			.invites
			.values()
			.find(|invite| {
				invite.workspace_id == workspace_id
					&& !invite.is_accepted() && User::email_key(&invite.email) == email_key
			})
			.cloned())
	}

	async fn pending_invites(&self, workspace_id: Ulid) -> Result<Vec<WorkspaceInvite>, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner
			.invites
			.values()
			.filter(|invite| invite.workspace_id == workspace_id && !invite.is_accepted())
			.cloned()
			.collect())
	}

	async fn insert_invite(&self, invite: WorkspaceInvite) -> Result<(), StoreError> {
		let mut inner = self.inner.write().await;
		inner.invites.insert(invite.id, invite);
		Ok(())
	}

	async fn delete_invite(&self, invite_id: Ulid) -> Result<(), StoreError> {
		let mut inner = self.inner.write().await;
		inner.invites.remove(&invite_id);
		Ok(())
	}

	async fn accept_invite_if_pending(
		&self,
		invite_id: Ulid,
		user_id: Ulid,
		at: DateTime<Utc>,
	) -> Result<bool, StoreError> {
		let mut inner = self.inner.write().await;

		let Some(invite) = inner.invites.get_mut(&invite_id) else {
			return Ok(false);
		};
		if invite.is_accepted() {
			return Ok(false);
		}

		invite.accepted_at = Some(at);
		invite.accepted_by = Some(user_id);

		Ok(true)
	}

	async fn insert_reactivation_token(&self, entry: WorkspaceReactivationToken) -> Result<(), StoreError> {
		let mut inner = self.inner.write().await;
		inner.reactivation_tokens.insert(entry.id, entry);
		Ok(())
	}

	async fn consume_reactivation_token(
		&self,
		token: &str,
		user_id: Ulid,
		now: DateTime<Utc>,
	) -> Result<ReactivationRedemption, StoreError> {
		let mut inner = self.inner.write().await;

		let Some(entry) = inner.reactivation_tokens.values_mut().find(|entry| entry.token == token) else {
			return Ok(ReactivationRedemption::NotFound);
		};

		if entry.used_at.is_some() {
			return Ok(ReactivationRedemption::AlreadyUsed);
		}
		if entry.is_expired(now) {
			return Ok(ReactivationRedemption::Expired);
		}
		if entry.user_id != user_id {
			return Ok(ReactivationRedemption::WrongUser);
		}

		entry.used_at = Some(now);

		Ok(ReactivationRedemption::Redeemed(entry.clone()))
	}
}
