mod member_ref;
mod reactivation_token;
mod user;
mod workspace;
mod workspace_invite;

pub use member_ref::*;
pub use reactivation_token::*;
pub use user::*;
pub use workspace::*;
pub use workspace_invite::*;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Generates an opaque token for invite and reactivation links.
pub(crate) fn generate_token() -> String {
	rand::thread_rng()
		.sample_iter(&Alphanumeric)
		.take(32)
		.map(char::from)
		.collect()
}
