use std::sync::Arc;

use crate::database::User;
use crate::global::ApiGlobal;
use crate::jwt::{AuthJwtPayload, JwtState, TokenError};
use crate::store::StoreError;
use crate::ErrorKind;

/// Name of the session cookie carrying the access token.
pub const AUTH_COOKIE: &str = "access_token";

/// Raw credential material extracted from a request by the transport layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct Credentials<'a> {
	/// Value of the [`AUTH_COOKIE`] cookie, if present.
	pub cookie: Option<&'a str>,
	/// Value of the `Authorization` header, if present.
	pub authorization: Option<&'a str>,
}

impl<'a> Credentials<'a> {
	/// The cookie wins over the header when both are present. Header tokens
	/// must be bearer tokens.
	pub fn token(&self) -> Option<&'a str> {
		if let Some(token) = self.cookie {
			return Some(token);
		}

		self.authorization.and_then(|value| value.strip_prefix("Bearer "))
	}
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
	#[error("not logged in")]
	NotLoggedIn,
	#[error("invalid token")]
	InvalidToken,
	#[error("token expired")]
	TokenExpired,
	#[error("user not found")]
	UserNotFound,
	#[error("email not verified")]
	EmailNotVerified,
	#[error("failed to fetch user: {0}")]
	Store(#[from] StoreError),
}

impl AuthError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::NotLoggedIn | Self::InvalidToken | Self::TokenExpired | Self::UserNotFound => {
				ErrorKind::Unauthenticated
			}
			Self::EmailNotVerified => ErrorKind::EmailNotVerified,
			Self::Store(_) => ErrorKind::Internal,
		}
	}
}

/// Resolves request credentials into the authenticated user.
///
/// Pure lookup: no side effects, no session state. The email-verification
/// gate sits here so that no downstream operation ever sees an unverified
/// account.
pub async fn authenticate<G: ApiGlobal>(global: &Arc<G>, credentials: Credentials<'_>) -> Result<User, AuthError> {
	let token = credentials.token().ok_or(AuthError::NotLoggedIn)?;

	let jwt = AuthJwtPayload::verify(global, token).map_err(|err| match err {
		TokenError::Expired => AuthError::TokenExpired,
		TokenError::Invalid => AuthError::InvalidToken,
	})?;

	let user = global
		.store()
		.user_by_id(jwt.user_id)
		.await?
		.ok_or(AuthError::UserNotFound)?;

	if !user.email_verified {
		return Err(AuthError::EmailNotVerified);
	}

	Ok(user)
}
