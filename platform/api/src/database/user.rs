use chrono::{DateTime, Utc};
use ulid::Ulid;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct User {
	/// The unique identifier for the user.
	pub id: Ulid,
	/// The email of the user. Matching is case-insensitive, see [`User::email_key`].
	pub email: String,
	/// The hashed password of the user. Opaque to this crate.
	pub password_hash: String,
	/// Whether the user has verified their email.
	pub email_verified: bool,
	/// The display name of the user.
	pub full_name: Option<String>,
	/// The time the user was created.
	pub created_at: DateTime<Utc>,
}

impl User {
	pub fn new(email: &str, password_hash: &str) -> Self {
		Self {
			id: Ulid::new(),
			email: email.to_string(),
			password_hash: password_hash.to_string(),
			email_verified: false,
			full_name: None,
			created_at: Utc::now(),
		}
	}

	/// Canonical form an email is matched and indexed by.
	pub fn email_key(email: &str) -> String {
		email.trim().to_lowercase()
	}

	/// Validates an email.
	pub fn validate_email(email: &str) -> Result<(), &'static str> {
		if email.len() < 5 {
			return Err("Email must be at least 5 characters long");
		}

		if email.len() > 100 {
			return Err("Email must be at most 100 characters long");
		}

		if !email_address::EmailAddress::is_valid(email) {
			return Err("Email is not a valid email address");
		}

		Ok(())
	}
}
