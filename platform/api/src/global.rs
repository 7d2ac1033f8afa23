use std::sync::Arc;

use crate::config::{JwtConfig, MailerConfig, WorkspaceConfig};
use crate::mailer::Mailer;
use crate::store::DataStore;

/// Process-level dependencies, injected instead of living in statics so that
/// every consumer (and every test) can carry its own configuration and
/// collaborators.
pub trait ApiGlobal: Send + Sync + 'static {
	/// Token signing configuration
	fn jwt_config(&self) -> &JwtConfig;

	/// Membership lifecycle configuration
	fn workspace_config(&self) -> &WorkspaceConfig;

	/// Outbound notification configuration
	fn mailer_config(&self) -> &MailerConfig;

	/// The persistence collaborator
	fn store(&self) -> &Arc<dyn DataStore>;

	/// The notification collaborator
	fn mailer(&self) -> &Arc<dyn Mailer>;
}
