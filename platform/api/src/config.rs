use chrono::Duration;

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct JwtConfig {
	/// JWT signing secret
	pub secret: String,

	/// JWT issuer
	pub issuer: String,
}

impl Default for JwtConfig {
	fn default() -> Self {
		Self {
			issuer: "tally".to_string(),
			secret: "tally".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
	/// How long a reactivation token stays redeemable after a workspace is
	/// archived, in days
	pub reactivation_validity_days: i64,

	/// Prefix for the workspace auto-created at signup, followed by the
	/// local part of the owner's email
	pub default_workspace_prefix: String,
}

impl WorkspaceConfig {
	pub fn reactivation_validity(&self) -> Duration {
		Duration::days(self.reactivation_validity_days)
	}
}

impl Default for WorkspaceConfig {
	fn default() -> Self {
		Self {
			reactivation_validity_days: 7,
			default_workspace_prefix: "Workspace of ".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct MailerConfig {
	/// Base URL the invite and reactivation links point at
	pub frontend_url: String,
}

impl Default for MailerConfig {
	fn default() -> Self {
		Self {
			frontend_url: "http://localhost:3000".to_string(),
		}
	}
}
