use serde_json::Value;
use ulid::Ulid;

use super::User;

/// Embedded snapshot of a referenced user, the shape every mutation
/// re-normalizes member links into.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UserRecord {
	pub id: Ulid,
	pub email: String,
	pub full_name: Option<String>,
}

impl From<&User> for UserRecord {
	fn from(user: &User) -> Self {
		Self {
			id: user.id,
			email: user.email.clone(),
			full_name: user.full_name.clone(),
		}
	}
}

/// A stored reference to a workspace member.
///
/// Member links have been written in several shapes over the life of the
/// data set. All of them are normalized on read through [`MemberRef::id`]
/// and rewritten as [`MemberRef::Record`] whenever the member set is saved.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum MemberRef {
	/// Embedded sub-document carrying the identifier.
	Record(UserRecord),
	/// Database back-reference.
	Ref {
		#[serde(rename = "$ref")]
		collection: String,
		#[serde(rename = "$id")]
		id: Ulid,
	},
	/// Bare identifier.
	Id(Ulid),
	/// Bare string; only meaningful when it parses as an identifier.
	Text(String),
	/// Partially-decoded mapping from an older storage generation.
	Fields(serde_json::Map<String, Value>),
}

impl MemberRef {
	pub fn record(user: &User) -> Self {
		Self::Record(UserRecord::from(user))
	}

	/// Extracts the canonical identifier, or `None` for shapes that carry
	/// no usable id. Unrecognized entries are excluded from membership
	/// rather than failing the read.
	pub fn id(&self) -> Option<Ulid> {
		match self {
			Self::Record(user) => Some(user.id),
			Self::Ref { id, .. } => Some(*id),
			Self::Id(id) => Some(*id),
			Self::Text(raw) => Ulid::from_string(raw).ok(),
			Self::Fields(fields) => {
				// Probed in precedence order: back-reference key first,
				// then the raw primary key, then a plain id field.
				if let Some(id) = fields.get("$id").and_then(value_id) {
					return Some(id);
				}
				if let Some(id) = fields.get("_id").and_then(value_id) {
					return Some(id);
				}
				fields.get("id").and_then(value_id)
			}
		}
	}
}

fn value_id(value: &Value) -> Option<Ulid> {
	value.as_str().and_then(|raw| Ulid::from_string(raw).ok())
}
