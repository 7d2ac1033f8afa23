use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use sha2::Sha256;
use ulid::Ulid;

use crate::global::ApiGlobal;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
	/// Bad signature, malformed payload, wrong issuer, or claims from the
	/// future. Deliberately one bucket so the error does not leak which
	/// check failed.
	#[error("invalid token")]
	Invalid,
	#[error("token expired")]
	Expired,
}

#[derive(Debug)]
pub struct AuthJwtPayload {
	pub user_id: Ulid,
	pub expiration: Option<DateTime<Utc>>,
	pub issued_at: DateTime<Utc>,
	pub not_before: Option<DateTime<Utc>>,
	pub audience: Option<String>,
}

impl AuthJwtPayload {
	pub fn new(user_id: Ulid, validity: Duration) -> Self {
		let now = Utc::now();

		Self {
			user_id,
			expiration: Some(now + validity),
			issued_at: now,
			not_before: None,
			audience: None,
		}
	}
}

pub trait JwtState: Sized {
	fn to_claims(&self) -> Claims;

	fn from_claims(claims: &Claims) -> Option<Self>;

	fn serialize<G: ApiGlobal>(&self, global: &Arc<G>) -> Option<String> {
		let config = global.jwt_config();

		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).ok()?;
		let mut claims = self.to_claims();

		claims.registered.issuer = Some(config.issuer.clone());

		if claims.registered.issued_at.is_none() {
			claims.registered.issued_at = Some(Utc::now().timestamp() as u64);
		}

		claims.sign_with_key(&key).ok()
	}

	fn verify<G: ApiGlobal>(global: &Arc<G>, token: &str) -> Result<Self, TokenError> {
		let config = global.jwt_config();

		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).map_err(|_| TokenError::Invalid)?;
		let token: Token<Header, Claims, _> = token.verify_with_key(&key).map_err(|_| TokenError::Invalid)?;

		let claims = token.claims();

		if claims.registered.issuer.as_ref() != Some(&config.issuer) {
			return Err(TokenError::Invalid);
		}

		let iat = claims
			.registered
			.issued_at
			.and_then(|x| Utc.timestamp_opt(x as i64, 0).single())
			.ok_or(TokenError::Invalid)?;
		if iat > Utc::now() {
			return Err(TokenError::Invalid);
		}

		let nbf = claims
			.registered
			.not_before
			.and_then(|x| Utc.timestamp_opt(x as i64, 0).single());
		if let Some(nbf) = nbf {
			if nbf > Utc::now() {
				return Err(TokenError::Invalid);
			}
		}

		let exp = claims
			.registered
			.expiration
			.and_then(|x| Utc.timestamp_opt(x as i64, 0).single());
		if let Some(exp) = exp {
			if exp < Utc::now() {
				return Err(TokenError::Expired);
			}
		}

		Self::from_claims(claims).ok_or(TokenError::Invalid)
	}
}

impl JwtState for AuthJwtPayload {
	fn to_claims(&self) -> Claims {
		Claims {
			registered: RegisteredClaims {
				issuer: None,
				subject: Some(self.user_id.to_string()),
				audience: self.audience.clone(),
				expiration: self.expiration.map(|x| x.timestamp() as u64),
				not_before: self.not_before.map(|x| x.timestamp() as u64),
				issued_at: Some(self.issued_at.timestamp() as u64),
				json_web_token_id: None,
			},
			private: Default::default(),
		}
	}

	fn from_claims(claims: &Claims) -> Option<Self> {
		Some(Self {
			audience: claims.registered.audience.clone(),
			expiration: claims
				.registered
				.expiration
				.and_then(|x| Utc.timestamp_opt(x as i64, 0).single()),
			issued_at: Utc.timestamp_opt(claims.registered.issued_at? as i64, 0).single()?,
			not_before: claims
				.registered
				.not_before
				.and_then(|x| Utc.timestamp_opt(x as i64, 0).single()),
			user_id: claims.registered.subject.as_ref().and_then(|x| Ulid::from_string(x).ok())?,
		})
	}
}
