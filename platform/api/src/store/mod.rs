mod memory;

pub use memory::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ulid::Ulid;

use crate::database::{User, Workspace, WorkspaceInvite, WorkspaceReactivationToken};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
	#[error("storage backend error: {0}")]
	Backend(#[from] anyhow::Error),
}

/// Outcome of redeeming a reactivation token. Every check happens inside
/// the store call so that a token can never be marked used without passing
/// all of them, and can be marked used at most once.
#[derive(Debug, Clone, PartialEq)]
pub enum ReactivationRedemption {
	Redeemed(WorkspaceReactivationToken),
	NotFound,
	AlreadyUsed,
	Expired,
	/// The token exists and is live but is bound to a different user.
	WrongUser,
}

/// The persistence collaborator.
///
/// Implementations must serialize writes per document (last write wins) and
/// must make the two conditional updates atomic: a check that passes and the
/// write it guards may not interleave with another caller's.
#[async_trait]
pub trait DataStore: Send + Sync + 'static {
	// users
	async fn user_by_id(&self, id: Ulid) -> Result<Option<User>, StoreError>;
	/// Lookup by canonical email key, see [`User::email_key`].
	async fn user_by_email(&self, email_key: &str) -> Result<Option<User>, StoreError>;
	/// Bulk lookup preserving the order of `ids`; missing ids are skipped.
	async fn users_by_ids(&self, ids: &[Ulid]) -> Result<Vec<User>, StoreError>;
	async fn insert_user(&self, user: User) -> Result<(), StoreError>;

	// workspaces
	async fn workspace_by_id(&self, id: Ulid) -> Result<Option<Workspace>, StoreError>;
	/// All non-archived workspaces, in creation order.
	async fn active_workspaces(&self) -> Result<Vec<Workspace>, StoreError>;
	async fn insert_workspace(&self, workspace: Workspace) -> Result<(), StoreError>;
	/// Full-document upsert-by-id.
	async fn save_workspace(&self, workspace: Workspace) -> Result<(), StoreError>;

	// workspace invites
	/// Scoped lookup; an invite is only visible through its own workspace.
	async fn invite_by_id(&self, workspace_id: Ulid, invite_id: Ulid) -> Result<Option<WorkspaceInvite>, StoreError>;
	async fn invite_by_token(&self, token: &str) -> Result<Option<WorkspaceInvite>, StoreError>;
	async fn pending_invite_by_email(
		&self,
		workspace_id: Ulid,
		email_key: &str,
	) -> Result<Option<WorkspaceInvite>, StoreError>;
	async fn pending_invites(&self, workspace_id: Ulid) -> Result<Vec<WorkspaceInvite>, StoreError>;
	async fn insert_invite(&self, invite: WorkspaceInvite) -> Result<(), StoreError>;
	async fn delete_invite(&self, invite_id: Ulid) -> Result<(), StoreError>;
	/// Marks the invite accepted iff it is still pending. Returns whether
	/// this call won the acceptance.
	async fn accept_invite_if_pending(
		&self,
		invite_id: Ulid,
		user_id: Ulid,
		at: DateTime<Utc>,
	) -> Result<bool, StoreError>;

	// reactivation tokens
	async fn insert_reactivation_token(&self, entry: WorkspaceReactivationToken) -> Result<(), StoreError>;
	/// Redeems the token for `user_id`, marking it used only when every
	/// check passes.
	async fn consume_reactivation_token(
		&self,
		token: &str,
		user_id: Ulid,
		now: DateTime<Utc>,
	) -> Result<ReactivationRedemption, StoreError>;
}
