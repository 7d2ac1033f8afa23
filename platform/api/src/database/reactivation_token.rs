use chrono::{DateTime, Duration, Utc};
use ulid::Ulid;

/// Single-use credential for undoing a workspace's soft-deletion, issued at
/// archival time and emailed to the owner.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkspaceReactivationToken {
	/// The unique identifier for the token record.
	pub id: Ulid,
	/// Foreign key to the workspaces collection.
	pub workspace_id: Ulid,
	/// The user who archived the workspace; the only user allowed to redeem.
	pub user_id: Ulid,
	/// Opaque token carried by the emailed reactivation link.
	pub token: String,
	/// The time the token was issued.
	pub created_at: DateTime<Utc>,
	/// The time the token stops being redeemable.
	pub expires_at: DateTime<Utc>,
	/// The time the token was redeemed. `None` while unused.
	pub used_at: Option<DateTime<Utc>>,
}

impl WorkspaceReactivationToken {
	pub fn new(workspace_id: Ulid, user_id: Ulid, validity: Duration) -> Self {
		let now = Utc::now();

		Self {
			id: Ulid::new(),
			workspace_id,
			user_id,
			token: super::generate_token(),
			created_at: now,
			expires_at: now + validity,
			used_at: None,
		}
	}

	pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
		self.expires_at < now
	}
}
