use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use ulid::Ulid;

use super::{member_workspace, require_owner, WorkspaceError};
use crate::database::{MemberRef, User, Workspace, WorkspaceInvite, WorkspaceReactivationToken};
use crate::global::ApiGlobal;
use crate::mailer;
use crate::store::{ReactivationRedemption, StoreError};

pub async fn create_workspace<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	name: &str,
) -> Result<Workspace, WorkspaceError> {
	let name = name.trim();
	if name.is_empty() {
		return Err(WorkspaceError::InvalidName);
	}

	let workspace = Workspace::new(name, user);
	global.store().insert_workspace(workspace.clone()).await?;

	Ok(workspace)
}

/// Auto-provisions the workspace every new account starts with, named after
/// the local part of the signup email.
pub async fn create_default_workspace<G: ApiGlobal>(global: &Arc<G>, user: &User) -> Result<Workspace, WorkspaceError> {
	let local_part = user.email.split('@').next().unwrap_or(&user.email);
	let name = format!("{}{}", global.workspace_config().default_workspace_prefix, local_part);

	create_workspace(global, user, &name).await
}

pub async fn rename_workspace<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	workspace_id: Ulid,
	name: &str,
) -> Result<Workspace, WorkspaceError> {
	let mut workspace = member_workspace(global, workspace_id, user).await?;
	require_owner(&workspace, user)?;

	let name = name.trim();
	if name.is_empty() {
		return Err(WorkspaceError::InvalidName);
	}

	workspace.name = name.to_string();
	normalize_links(global, &mut workspace).await?;
	global.store().save_workspace(workspace.clone()).await?;

	Ok(workspace)
}

/// Soft-deletes the workspace and issues the reactivation token that can
/// undo it. The owner is notified after the archive has been committed;
/// notification failure does not roll anything back.
pub async fn archive_workspace<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	workspace_id: Ulid,
) -> Result<(), WorkspaceError> {
	let mut workspace = member_workspace(global, workspace_id, user).await?;
	require_owner(&workspace, user)?;

	let entry = WorkspaceReactivationToken::new(
		workspace.id,
		user.id,
		global.workspace_config().reactivation_validity(),
	);
	let token = entry.token.clone();
	global.store().insert_reactivation_token(entry).await?;

	workspace.is_archived = true;
	normalize_links(global, &mut workspace).await?;
	global.store().save_workspace(workspace.clone()).await?;

	let url = mailer::reactivation_url(global.mailer_config(), &token);
	mailer::notify(
		global,
		&user.email,
		&format!("Reactivate {}", workspace.name),
		&format!(
			"Your workspace \"{}\" has been deactivated.\nReactivate it here: {}\n",
			workspace.name, url
		),
	)
	.await;

	Ok(())
}

/// Redeems a reactivation token. Single use, time-boxed, and bound to the
/// user who archived the workspace; the store consumes it atomically so two
/// concurrent redemptions cannot both succeed.
pub async fn reactivate_workspace<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	token: &str,
) -> Result<Workspace, WorkspaceError> {
	let entry = match global
		.store()
		.consume_reactivation_token(token, user.id, Utc::now())
		.await?
	{
		ReactivationRedemption::Redeemed(entry) => entry,
		ReactivationRedemption::NotFound => return Err(WorkspaceError::ReactivationNotFound),
		ReactivationRedemption::AlreadyUsed => return Err(WorkspaceError::TokenUsed),
		ReactivationRedemption::Expired => return Err(WorkspaceError::TokenExpired),
		ReactivationRedemption::WrongUser => return Err(WorkspaceError::ReactivationDenied),
	};

	let mut workspace = global
		.store()
		.workspace_by_id(entry.workspace_id)
		.await?
		.ok_or(WorkspaceError::NotFound)?;

	workspace.is_archived = false;
	normalize_links(global, &mut workspace).await?;
	global.store().save_workspace(workspace.clone()).await?;

	Ok(workspace)
}

pub async fn list_invites<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	workspace_id: Ulid,
) -> Result<Vec<WorkspaceInvite>, WorkspaceError> {
	let workspace = member_workspace(global, workspace_id, user).await?;
	require_owner(&workspace, user)?;

	Ok(global.store().pending_invites(workspace.id).await?)
}

pub async fn create_invite<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	workspace_id: Ulid,
	email: &str,
) -> Result<WorkspaceInvite, WorkspaceError> {
	let workspace = member_workspace(global, workspace_id, user).await?;
	require_owner(&workspace, user)?;

	User::validate_email(email.trim()).map_err(WorkspaceError::InvalidEmail)?;
	let email_key = User::email_key(email);

	if let Some(existing) = global.store().user_by_email(&email_key).await? {
		if workspace.is_member(existing.id) {
			return Err(WorkspaceError::AlreadyMember);
		}
	}

	if global
		.store()
		.pending_invite_by_email(workspace.id, &email_key)
		.await?
		.is_some()
	{
		return Err(WorkspaceError::DuplicateInvite);
	}

	let invite = WorkspaceInvite::new(workspace.id, &email_key, user.id);
	global.store().insert_invite(invite.clone()).await?;

	let url = mailer::invite_url(global.mailer_config(), &invite.token);
	mailer::notify(
		global,
		&invite.email,
		&format!("Invitation to {}", workspace.name),
		&format!(
			"You have been invited to join the workspace \"{}\".\nAccept the invite here: {}\n",
			workspace.name, url
		),
	)
	.await;

	Ok(invite)
}

/// Accepts an invite by token. Membership is idempotent; the acceptance
/// itself is at-most-once through the store's conditional update.
pub async fn accept_invite<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	token: &str,
) -> Result<Workspace, WorkspaceError> {
	let invite = global
		.store()
		.invite_by_token(token)
		.await?
		.ok_or(WorkspaceError::InviteNotFound)?;

	if invite.is_accepted() {
		return Err(WorkspaceError::AlreadyAccepted);
	}
	if User::email_key(&invite.email) != User::email_key(&user.email) {
		return Err(WorkspaceError::EmailMismatch);
	}

	let mut workspace = global
		.store()
		.workspace_by_id(invite.workspace_id)
		.await?
		.filter(|workspace| !workspace.is_archived)
		.ok_or(WorkspaceError::NotFound)?;

	if !global
		.store()
		.accept_invite_if_pending(invite.id, user.id, Utc::now())
		.await?
	{
		// Lost the race to a concurrent acceptance.
		return Err(WorkspaceError::AlreadyAccepted);
	}

	if workspace.add_member(user) {
		normalize_links(global, &mut workspace).await?;
		global.store().save_workspace(workspace.clone()).await?;
	}

	Ok(workspace)
}

pub async fn revoke_invite<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	workspace_id: Ulid,
	invite_id: Ulid,
) -> Result<(), WorkspaceError> {
	let workspace = member_workspace(global, workspace_id, user).await?;
	require_owner(&workspace, user)?;

	let invite = global
		.store()
		.invite_by_id(workspace.id, invite_id)
		.await?
		.ok_or(WorkspaceError::InviteNotFound)?;

	if invite.is_accepted() {
		return Err(WorkspaceError::AlreadyAccepted);
	}

	global.store().delete_invite(invite.id).await?;

	Ok(())
}

pub async fn remove_member<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	workspace_id: Ulid,
	member_id: Ulid,
) -> Result<(), WorkspaceError> {
	let mut workspace = member_workspace(global, workspace_id, user).await?;
	require_owner(&workspace, user)?;

	if workspace.owner_id() == Some(member_id) {
		return Err(WorkspaceError::CannotRemoveOwner);
	}
	if !workspace.member_ids().contains(&member_id) {
		return Err(WorkspaceError::MemberNotFound);
	}

	workspace.remove_member(member_id);
	normalize_links(global, &mut workspace).await?;
	global.store().save_workspace(workspace).await?;

	Ok(())
}

pub async fn leave_workspace<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	workspace_id: Ulid,
) -> Result<(), WorkspaceError> {
	let mut workspace = member_workspace(global, workspace_id, user).await?;

	if workspace.owner_id() == Some(user.id) {
		return Err(WorkspaceError::OwnerCannotLeave);
	}

	workspace.remove_member(user.id);
	normalize_links(global, &mut workspace).await?;
	global.store().save_workspace(workspace).await?;

	Ok(())
}

/// The resolved member list of a workspace the caller belongs to, in member
/// set order.
pub async fn workspace_members<G: ApiGlobal>(
	global: &Arc<G>,
	user: &User,
	workspace_id: Ulid,
) -> Result<Vec<User>, WorkspaceError> {
	let workspace = member_workspace(global, workspace_id, user).await?;

	Ok(global.store().users_by_ids(&workspace.member_ids()).await?)
}

/// Rewrites member and owner links as embedded records before a save, so
/// that older stored shapes converge instead of accumulating. Entries whose
/// user no longer exists are dropped; an empty resolution leaves the stored
/// set untouched rather than wiping it.
pub(crate) async fn normalize_links<G: ApiGlobal>(
	global: &Arc<G>,
	workspace: &mut Workspace,
) -> Result<(), StoreError> {
	let member_ids = workspace.member_ids();
	if !member_ids.is_empty() {
		let users = global.store().users_by_ids(&member_ids).await?;
		let users_by_id: HashMap<Ulid, User> = users.into_iter().map(|user| (user.id, user)).collect();

		let resolved: Vec<MemberRef> = member_ids
			.iter()
			.filter_map(|id| users_by_id.get(id))
			.map(MemberRef::record)
			.collect();

		if !resolved.is_empty() {
			workspace.members = resolved;
		}
	}

	if let Some(owner_id) = workspace.owner_id() {
		if !matches!(workspace.owner, MemberRef::Record(_)) {
			if let Some(owner) = global.store().user_by_id(owner_id).await? {
				workspace.owner = MemberRef::record(&owner);
			}
		}
	}

	Ok(())
}
