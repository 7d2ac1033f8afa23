use chrono::{DateTime, Utc};
use ulid::Ulid;

use super::{MemberRef, User};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Workspace {
	/// The unique identifier for the workspace.
	pub id: Ulid,
	/// The name of the workspace.
	pub name: String,
	/// Reference to the single owning user.
	pub owner: MemberRef,
	/// References to the member users. The owner is a member whether or not
	/// a duplicate entry appears here.
	pub members: Vec<MemberRef>,
	/// Soft-delete flag. Archived workspaces are hidden from resolution and
	/// from every lifecycle operation except reactivation.
	pub is_archived: bool,
	/// The time the workspace was created.
	pub created_at: DateTime<Utc>,
}

impl Workspace {
	pub fn new(name: impl Into<String>, owner: &User) -> Self {
		Self {
			id: Ulid::new(),
			name: name.into(),
			owner: MemberRef::record(owner),
			members: vec![MemberRef::record(owner)],
			is_archived: false,
			created_at: Utc::now(),
		}
	}

	/// The owner's identifier. `None` only for pathological stored data;
	/// every shape the store has ever written resolves.
	pub fn owner_id(&self) -> Option<Ulid> {
		self.owner.id()
	}

	/// Normalized member identifiers, in stored order, skipping entries
	/// that carry no usable id.
	pub fn member_ids(&self) -> Vec<Ulid> {
		self.members.iter().filter_map(MemberRef::id).collect()
	}

	/// A user is in the workspace if they own it or appear in the member
	/// set.
	pub fn is_member(&self, user_id: Ulid) -> bool {
		self.owner_id() == Some(user_id) || self.member_ids().contains(&user_id)
	}

	/// Appends the user to the member set. Idempotent; returns whether the
	/// set changed.
	pub fn add_member(&mut self, user: &User) -> bool {
		if self.member_ids().contains(&user.id) {
			return false;
		}

		self.members.push(MemberRef::record(user));
		true
	}

	/// Drops every member entry resolving to the given id. Returns whether
	/// the set changed.
	pub fn remove_member(&mut self, user_id: Ulid) -> bool {
		let before = self.members.len();
		self.members.retain(|member| member.id() != Some(user_id));
		self.members.len() != before
	}
}
