//! Workspace-scoped authorization and membership core for the Tally backend.
//!
//! The HTTP transport and the resource CRUD handlers live outside this crate;
//! they consume the identity resolver, the workspace resolver, the membership
//! lifecycle operations and the tenant-scoping contract defined here.

pub mod auth;
pub mod config;
pub mod database;
pub mod global;
pub mod jwt;
pub mod logging;
pub mod mailer;
pub mod scoping;
pub mod store;
pub mod workspace;

#[cfg(test)]
mod tests;

/// Transport-facing classification of a failure.
///
/// Callers map these to their protocol's status codes. The split between
/// `Unauthenticated`, `Forbidden` and `NotFound` is load-bearing: a resource
/// that exists but is not visible to the caller must be indistinguishable
/// from one that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// No credential, or a credential that could not be validated.
	Unauthenticated,
	/// Authenticated, but the account has not completed email verification.
	EmailNotVerified,
	/// Authenticated, but not authorized for this workspace or action.
	Forbidden,
	/// The target is absent, or not visible to the caller.
	NotFound,
	/// The operation conflicts with current state (duplicate, already done).
	Conflict,
	/// The input was rejected before any state change.
	Invalid,
	/// A collaborator (storage, mail relay) failed.
	Internal,
}
