use std::sync::Arc;

use async_trait::async_trait;

use crate::config::MailerConfig;
use crate::global::ApiGlobal;

#[derive(thiserror::Error, Debug)]
pub enum MailerError {
	#[error("failed to deliver mail: {0}")]
	Delivery(#[from] anyhow::Error),
}

/// Outbound notification collaborator.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
	async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError>;
}

pub fn invite_url(config: &MailerConfig, token: &str) -> String {
	format!("{}/invite/{}", config.frontend_url.trim_end_matches('/'), token)
}

pub fn reactivation_url(config: &MailerConfig, token: &str) -> String {
	format!(
		"{}/workspace/reactivate/{}",
		config.frontend_url.trim_end_matches('/'),
		token
	)
}

/// Sends a notification, swallowing delivery failures. A lifecycle state
/// change that has already been committed must not be failed by its
/// notification.
pub(crate) async fn notify<G: ApiGlobal>(global: &Arc<G>, to: &str, subject: &str, body: &str) {
	if let Err(err) = global.mailer().send(to, subject, body).await {
		tracing::error!(error = %err, to = to, subject = subject, "failed to send notification email");
	}
}
