use chrono::Duration;
use serde_json::json;
use ulid::Ulid;

use crate::database::{MemberRef, Workspace, WorkspaceReactivationToken};
use crate::global::ApiGlobal;
use crate::tests::global::{mock_global_state, mock_global_state_failing_mail, seed_user};
use crate::workspace::{
	accept_invite, accessible_workspaces, archive_workspace, create_default_workspace, create_invite,
	create_workspace, leave_workspace, list_invites, reactivate_workspace, remove_member, rename_workspace,
	revoke_invite, workspace_members, WorkspaceError,
};
use crate::ErrorKind;

/// Pulls the emailed token back out of a link in the notification body.
fn token_from_body(body: &str, segment: &str) -> String {
	let start = body.find(segment).expect("body should contain the link") + segment.len();
	body[start..]
		.chars()
		.take_while(|c| c.is_ascii_alphanumeric())
		.collect()
}

#[tokio::test]
async fn test_create_workspace_requires_name() {
	let (global, _) = mock_global_state();
	let user = seed_user(&global, "u@x.com").await;

	let err = create_workspace(&global, &user, "   ").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::InvalidName));
	assert_eq!(err.kind(), ErrorKind::Invalid);

	let workspace = create_workspace(&global, &user, "  Acme  ").await.unwrap();
	assert_eq!(workspace.name, "Acme");
	assert_eq!(workspace.owner_id(), Some(user.id));
	assert!(workspace.is_member(user.id));
}

#[tokio::test]
async fn test_default_workspace_is_named_after_the_email() {
	let (global, _) = mock_global_state();
	let user = seed_user(&global, "jane@x.com").await;

	let workspace = create_default_workspace(&global, &user).await.unwrap();
	assert_eq!(workspace.name, "Workspace of jane");
	assert!(workspace.is_member(user.id));
}

#[tokio::test]
async fn test_rename_is_owner_only_and_validated() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "owner@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	let err = rename_workspace(&global, &owner, workspace.id, "").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::InvalidName));

	let renamed = rename_workspace(&global, &owner, workspace.id, "Acme Ltd").await.unwrap();
	assert_eq!(renamed.name, "Acme Ltd");

	let stored = global.store().workspace_by_id(workspace.id).await.unwrap().unwrap();
	assert_eq!(stored.name, "Acme Ltd");
}

// Scenario: owner invites an email, and a second invite for the same email
// conflicts until the first one is resolved.
#[tokio::test]
async fn test_duplicate_invite_conflicts() {
	let (global, outbox) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	let invite = create_invite(&global, &owner, workspace.id, "b@x.com").await.unwrap();
	assert_eq!(invite.email, "b@x.com");

	let mail = outbox.take();
	assert_eq!(mail.len(), 1);
	assert_eq!(mail[0].to, "b@x.com");
	assert!(mail[0].body.contains(&format!("/invite/{}", invite.token)));

	let err = create_invite(&global, &owner, workspace.id, "b@x.com").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::DuplicateInvite));
	assert_eq!(err.kind(), ErrorKind::Conflict);

	// Same address, different casing.
	let err = create_invite(&global, &owner, workspace.id, "B@X.com").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::DuplicateInvite));
}

#[tokio::test]
async fn test_inviting_an_existing_member_conflicts() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let member = seed_user(&global, "b@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	let invite = create_invite(&global, &owner, workspace.id, "b@x.com").await.unwrap();
	accept_invite(&global, &member, &invite.token).await.unwrap();

	let err = create_invite(&global, &owner, workspace.id, "b@x.com").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::AlreadyMember));
}

#[tokio::test]
async fn test_invalid_invite_email_is_rejected() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	let err = create_invite(&global, &owner, workspace.id, "nope").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::InvalidEmail(_)));
}

// Scenario: the invited user accepts, becomes a member, and the invite
// reaches its terminal accepted state exactly once.
#[tokio::test]
async fn test_accept_invite() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let invitee = seed_user(&global, "b@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	let invite = create_invite(&global, &owner, workspace.id, "B@x.com").await.unwrap();

	let joined = accept_invite(&global, &invitee, &invite.token).await.unwrap();
	assert_eq!(joined.id, workspace.id);
	assert!(joined.is_member(invitee.id));

	let stored = global.store().invite_by_token(&invite.token).await.unwrap().unwrap();
	assert!(stored.is_accepted());
	assert_eq!(stored.accepted_by, Some(invitee.id));

	let members = workspace_members(&global, &owner, workspace.id).await.unwrap();
	assert!(members.iter().any(|member| member.id == invitee.id));

	// Acceptance is terminal; membership gained exactly once.
	let err = accept_invite(&global, &invitee, &invite.token).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::AlreadyAccepted));

	let workspace = global.store().workspace_by_id(workspace.id).await.unwrap().unwrap();
	assert_eq!(
		workspace.member_ids().iter().filter(|id| **id == invitee.id).count(),
		1
	);
}

#[tokio::test]
async fn test_accept_invite_requires_matching_email() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let other = seed_user(&global, "c@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	let invite = create_invite(&global, &owner, workspace.id, "b@x.com").await.unwrap();

	let err = accept_invite(&global, &other, &invite.token).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::EmailMismatch));
	// A token probe never learns more than "invalid or expired".
	assert_eq!(err.public_message(), "invite link is invalid or has expired");

	let err = accept_invite(&global, &other, "no-such-token").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::InviteNotFound));
	assert_eq!(err.public_message(), "invite link is invalid or has expired");
}

#[tokio::test]
async fn test_revoke_invite() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let invitee = seed_user(&global, "b@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	let invite = create_invite(&global, &owner, workspace.id, "b@x.com").await.unwrap();
	assert_eq!(list_invites(&global, &owner, workspace.id).await.unwrap().len(), 1);

	revoke_invite(&global, &owner, workspace.id, invite.id).await.unwrap();
	assert!(list_invites(&global, &owner, workspace.id).await.unwrap().is_empty());

	let err = revoke_invite(&global, &owner, workspace.id, invite.id).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::InviteNotFound));

	// An accepted invite can never be revoked.
	let invite = create_invite(&global, &owner, workspace.id, "b@x.com").await.unwrap();
	accept_invite(&global, &invitee, &invite.token).await.unwrap();
	let err = revoke_invite(&global, &owner, workspace.id, invite.id).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::AlreadyAccepted));
}

// Scenario: archival hides the workspace, and the emailed token restores it
// exactly once.
#[tokio::test]
async fn test_archive_and_reactivate() {
	let (global, outbox) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	archive_workspace(&global, &owner, workspace.id).await.unwrap();
	assert!(accessible_workspaces(&global, &owner).await.unwrap().is_empty());

	let mail = outbox.take();
	assert_eq!(mail.len(), 1);
	assert_eq!(mail[0].to, owner.email);
	let token = token_from_body(&mail[0].body, "/workspace/reactivate/");

	let restored = reactivate_workspace(&global, &owner, &token).await.unwrap();
	assert_eq!(restored.id, workspace.id);
	assert!(!restored.is_archived);
	assert_eq!(accessible_workspaces(&global, &owner).await.unwrap().len(), 1);

	// Single use.
	let err = reactivate_workspace(&global, &owner, &token).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::TokenUsed));
	assert_eq!(err.public_message(), "reactivation link is invalid or has expired");
}

#[tokio::test]
async fn test_reactivation_is_bound_to_the_archiving_user() {
	let (global, outbox) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let other = seed_user(&global, "b@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	archive_workspace(&global, &owner, workspace.id).await.unwrap();
	let mail = outbox.take();
	let token = token_from_body(&mail[0].body, "/workspace/reactivate/");

	let err = reactivate_workspace(&global, &other, &token).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::ReactivationDenied));
	assert_eq!(err.kind(), ErrorKind::Forbidden);
	assert_eq!(err.public_message(), "reactivation link is invalid or has expired");

	// The failed attempt must not have burned the token.
	reactivate_workspace(&global, &owner, &token).await.unwrap();
}

#[tokio::test]
async fn test_expired_reactivation_token() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	let entry = WorkspaceReactivationToken::new(workspace.id, owner.id, Duration::days(-1));
	let token = entry.token.clone();
	global.store().insert_reactivation_token(entry).await.unwrap();

	let err = reactivate_workspace(&global, &owner, &token).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::TokenExpired));

	let err = reactivate_workspace(&global, &owner, "no-such-token").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::ReactivationNotFound));
}

// Scenario: a plain member holds none of the owner's rights.
#[tokio::test]
async fn test_owner_only_operations_reject_members() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let member = seed_user(&global, "b@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	let invite = create_invite(&global, &owner, workspace.id, "b@x.com").await.unwrap();
	accept_invite(&global, &member, &invite.token).await.unwrap();

	let err = rename_workspace(&global, &member, workspace.id, "Mine").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::NotOwner));
	assert_eq!(err.kind(), ErrorKind::Forbidden);

	let err = archive_workspace(&global, &member, workspace.id).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::NotOwner));

	let err = create_invite(&global, &member, workspace.id, "c@x.com").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::NotOwner));

	let err = list_invites(&global, &member, workspace.id).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::NotOwner));

	let err = remove_member(&global, &member, workspace.id, owner.id).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::NotOwner));
}

#[tokio::test]
async fn test_outsiders_cannot_see_the_workspace() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let stranger = seed_user(&global, "s@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	// Inaccessible and absent are the same from outside.
	let err = rename_workspace(&global, &stranger, workspace.id, "Mine").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::NotFound));
	assert_eq!(err.kind(), ErrorKind::NotFound);

	let err = workspace_members(&global, &stranger, workspace.id).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::NotFound));

	let err = rename_workspace(&global, &owner, Ulid::new(), "Mine").await.unwrap_err();
	assert!(matches!(err, WorkspaceError::NotFound));
}

#[tokio::test]
async fn test_remove_member() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let member = seed_user(&global, "b@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	let invite = create_invite(&global, &owner, workspace.id, "b@x.com").await.unwrap();
	accept_invite(&global, &member, &invite.token).await.unwrap();

	let err = remove_member(&global, &owner, workspace.id, owner.id).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::CannotRemoveOwner));

	let err = remove_member(&global, &owner, workspace.id, Ulid::new()).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::MemberNotFound));

	remove_member(&global, &owner, workspace.id, member.id).await.unwrap();
	let stored = global.store().workspace_by_id(workspace.id).await.unwrap().unwrap();
	assert!(!stored.is_member(member.id));
}

#[tokio::test]
async fn test_leave_workspace() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let member = seed_user(&global, "b@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	let invite = create_invite(&global, &owner, workspace.id, "b@x.com").await.unwrap();
	accept_invite(&global, &member, &invite.token).await.unwrap();

	let err = leave_workspace(&global, &owner, workspace.id).await.unwrap_err();
	assert!(matches!(err, WorkspaceError::OwnerCannotLeave));

	leave_workspace(&global, &member, workspace.id).await.unwrap();
	let stored = global.store().workspace_by_id(workspace.id).await.unwrap().unwrap();
	assert!(!stored.is_member(member.id));
	assert!(stored.is_member(owner.id));
}

#[tokio::test]
async fn test_mutations_normalize_stored_member_shapes() {
	let (global, _) = mock_global_state();
	let owner = seed_user(&global, "u@x.com").await;
	let member = seed_user(&global, "b@x.com").await;

	// Seed a workspace the way an older storage generation left it.
	let mut workspace = Workspace::new("Acme", &owner);
	workspace.owner = MemberRef::Id(owner.id);
	workspace.members = vec![
		MemberRef::Text(owner.id.to_string()),
		serde_json::from_value::<MemberRef>(json!({ "_id": member.id.to_string() })).unwrap(),
		MemberRef::Text("junk".to_string()),
	];
	global.store().insert_workspace(workspace.clone()).await.unwrap();

	assert!(workspace.is_member(member.id));

	rename_workspace(&global, &owner, workspace.id, "Acme Ltd").await.unwrap();

	let stored = global.store().workspace_by_id(workspace.id).await.unwrap().unwrap();
	assert!(matches!(stored.owner, MemberRef::Record(_)));
	assert_eq!(stored.members.len(), 2);
	assert!(stored.members.iter().all(|entry| matches!(entry, MemberRef::Record(_))));
	assert_eq!(stored.member_ids(), vec![owner.id, member.id]);
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_the_operation() {
	let global = mock_global_state_failing_mail();
	let owner = seed_user(&global, "u@x.com").await;
	let workspace = create_workspace(&global, &owner, "Acme").await.unwrap();

	create_invite(&global, &owner, workspace.id, "b@x.com").await.unwrap();

	archive_workspace(&global, &owner, workspace.id).await.unwrap();
	let stored = global.store().workspace_by_id(workspace.id).await.unwrap().unwrap();
	assert!(stored.is_archived);
}
