use std::str::FromStr;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::{self, Handle};
use tracing_subscriber::{EnvFilter, Registry};

static RELOAD_HANDLE: OnceCell<Handle<EnvFilter, Registry>> = OnceCell::new();

/// Installs the global tracing subscriber. Calling it again only reloads the
/// filter level.
pub fn init(level: &str, json: bool) -> Result<()> {
	let reload = RELOAD_HANDLE.get_or_try_init(|| {
		let env_filter = EnvFilter::from_str(level)?;

		let (filter, handle) = reload::Layer::new(env_filter);

		let registry = tracing_subscriber::registry().with(filter);

		let fmt_layer = tracing_subscriber::fmt::layer()
			.with_line_number(true)
			.with_file(true);

		if json {
			registry.with(fmt_layer.json()).try_init()
		} else {
			registry.with(fmt_layer.pretty()).try_init()
		}
		.map(|_| handle)
		.map_err(anyhow::Error::from)
	})?;

	reload.reload(EnvFilter::from_str(level)?)?;

	Ok(())
}
