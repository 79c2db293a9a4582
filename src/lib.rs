//! Resilient object store access over HTTP: retrying blocking and async clients, cursor-based
//! pagination, and a hot-reloading bearer-token gate for the serving side.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod cursor;
pub mod error;
pub mod executor;
pub mod http;
pub mod obs;
pub mod page;
#[cfg(feature = "server")] pub mod server;
pub mod store;
pub mod timestamp;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	/// Returns a unique, not-yet-created directory under the system temp dir.
	pub fn temp_dir(label: &str) -> PathBuf {
		std::env::temp_dir().join(format!(
			"objstore_{label}_{}_{}",
			std::process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		))
	}

	/// Removes a directory created by a test, ignoring directories that never materialized.
	pub fn remove_temp_dir(dir: &Path) {
		if dir.exists() {
			std::fs::remove_dir_all(dir).unwrap_or_else(|e| {
				panic!("Failed to remove temporary directory {}: {e}", dir.display())
			});
		}
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeSet, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use bytes::Bytes;
	pub use parking_lot::RwLock;
	pub use reqwest::{Error as ReqwestError, Method, StatusCode};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
