mod lifecycle;
mod resolver;

pub use lifecycle::*;
pub use resolver::*;

use std::sync::Arc;

use ulid::Ulid;

use crate::database::{User, Workspace};
use crate::global::ApiGlobal;
use crate::store::StoreError;
use crate::ErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum WorkspaceError {
	#[error("workspace not found")]
	NotFound,
	#[error("invite not found")]
	InviteNotFound,
	#[error("member not found")]
	MemberNotFound,
	#[error("only the workspace owner can do this")]
	NotOwner,
	#[error("no accessible workspace")]
	NoAccessibleWorkspace,
	#[error("reactivation token not found")]
	ReactivationNotFound,
	#[error("reactivation token belongs to a different user")]
	ReactivationDenied,
	#[error("reactivation token already used")]
	TokenUsed,
	#[error("reactivation token expired")]
	TokenExpired,
	#[error("user is already a member")]
	AlreadyMember,
	#[error("an invite for this email is already pending")]
	DuplicateInvite,
	#[error("invite already accepted")]
	AlreadyAccepted,
	#[error("invite email does not match your account")]
	EmailMismatch,
	#[error("workspace name is required")]
	InvalidName,
	#[error("invalid email: {0}")]
	InvalidEmail(&'static str),
	#[error("owner cannot leave their workspace")]
	OwnerCannotLeave,
	#[error("the workspace owner cannot be removed")]
	CannotRemoveOwner,
	#[error("store error: {0}")]
	Store(#[from] StoreError),
}

impl WorkspaceError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::NotFound | Self::InviteNotFound | Self::MemberNotFound | Self::ReactivationNotFound => {
				ErrorKind::NotFound
			}
			Self::NotOwner | Self::NoAccessibleWorkspace | Self::ReactivationDenied => ErrorKind::Forbidden,
			Self::TokenUsed | Self::AlreadyMember | Self::DuplicateInvite | Self::AlreadyAccepted => {
				ErrorKind::Conflict
			}
			Self::TokenExpired
			| Self::EmailMismatch
			| Self::InvalidName
			| Self::InvalidEmail(_)
			| Self::OwnerCannotLeave
			| Self::CannotRemoveOwner => ErrorKind::Invalid,
			Self::Store(_) => ErrorKind::Internal,
		}
	}

	/// The message safe to show outside. Token-bearing flows collapse to one
	/// generic wording so that responses cannot be used as a token oracle.
	pub fn public_message(&self) -> String {
		match self {
			Self::ReactivationNotFound | Self::ReactivationDenied | Self::TokenUsed | Self::TokenExpired => {
				"reactivation link is invalid or has expired".to_string()
			}
			Self::InviteNotFound | Self::AlreadyAccepted | Self::EmailMismatch => {
				"invite link is invalid or has expired".to_string()
			}
			Self::Store(_) => "internal error".to_string(),
			other => other.to_string(),
		}
	}
}

/// Looks up a non-archived workspace the user belongs to. Absent, archived
/// and inaccessible all collapse into `NotFound`.
pub(crate) async fn member_workspace<G: ApiGlobal>(
	global: &Arc<G>,
	workspace_id: Ulid,
	user: &User,
) -> Result<Workspace, WorkspaceError> {
	global
		.store()
		.workspace_by_id(workspace_id)
		.await?
		.filter(|workspace| !workspace.is_archived && workspace.is_member(user.id))
		.ok_or(WorkspaceError::NotFound)
}

pub(crate) fn require_owner(workspace: &Workspace, user: &User) -> Result<(), WorkspaceError> {
	if workspace.owner_id() != Some(user.id) {
		return Err(WorkspaceError::NotOwner);
	}

	Ok(())
}
