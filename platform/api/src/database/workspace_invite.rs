use chrono::{DateTime, Utc};
use ulid::Ulid;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkspaceInvite {
	/// The unique identifier for the invite.
	pub id: Ulid,
	/// Foreign key to the workspaces collection.
	pub workspace_id: Ulid,
	/// The invitee's email, stored in canonical (lowercased) form.
	pub email: String,
	/// The user who issued the invite.
	pub invited_by: Ulid,
	/// Opaque token carried by the emailed accept link.
	pub token: String,
	/// The time the invite was created.
	pub created_at: DateTime<Utc>,
	/// The time the invite was accepted. `None` while pending.
	pub accepted_at: Option<DateTime<Utc>>,
	/// The user who accepted the invite.
	pub accepted_by: Option<Ulid>,
}

impl WorkspaceInvite {
	pub fn new(workspace_id: Ulid, email: &str, invited_by: Ulid) -> Self {
		Self {
			id: Ulid::new(),
			workspace_id,
			email: email.to_string(),
			invited_by,
			token: super::generate_token(),
			created_at: Utc::now(),
			accepted_at: None,
			accepted_by: None,
		}
	}

	/// Accepted invites are terminal: they can no longer be revoked or
	/// accepted again.
	pub fn is_accepted(&self) -> bool {
		self.accepted_at.is_some()
	}
}
