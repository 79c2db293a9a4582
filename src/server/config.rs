// std
use std::{
	env,
	net::{Ipv4Addr, SocketAddr},
};
// self
use crate::{
	_prelude::*,
	auth::{DEFAULT_TOKENS_FILE, TOKENS_FILE_ENV},
	error::ConfigError,
};

/// Environment variable holding the listen address.
pub const BIND_ENV: &str = "OBJSTORE_BIND";

/// Route layer settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
	/// Listen address.
	pub bind: SocketAddr,
	/// Token file consulted by the bearer-token cache.
	pub tokens_file: PathBuf,
	/// Largest accepted `PUT` body.
	pub max_object_bytes: usize,
}
impl ServerConfig {
	/// Default listen port.
	pub const DEFAULT_PORT: u16 = 8000;
	/// Default body limit (32 MiB).
	pub const DEFAULT_MAX_OBJECT_BYTES: usize = 32 * 1024 * 1024;

	/// Reads `OBJSTORE_BIND` and `AUTH_TOKENS_FILE`, falling back to the defaults.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_vars(env::var(BIND_ENV).ok(), env::var_os(TOKENS_FILE_ENV).map(PathBuf::from))
	}

	fn from_vars(bind: Option<String>, tokens_file: Option<PathBuf>) -> Result<Self, ConfigError> {
		let mut config = Self::default();

		if let Some(raw) = bind.filter(|raw| !raw.trim().is_empty()) {
			config.bind = raw
				.trim()
				.parse()
				.map_err(|_| ConfigError::InvalidBindAddress { value: raw.clone() })?;
		}
		if let Some(path) = tokens_file.filter(|path| !path.as_os_str().is_empty()) {
			config.tokens_file = path;
		}

		Ok(config)
	}
}
impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			bind: SocketAddr::from((Ipv4Addr::LOCALHOST, Self::DEFAULT_PORT)),
			tokens_file: PathBuf::from(DEFAULT_TOKENS_FILE),
			max_object_bytes: Self::DEFAULT_MAX_OBJECT_BYTES,
		}
	}
}
