//! Hot-reloading bearer-token cache.
//!
//! The cache moves through `unloaded → loaded → (stale → loaded)*`. Every validation stats the
//! backing file under one exclusive lock and reloads it synchronously whenever its modification
//! time differs from the last one observed; between changes the previous snapshot is served.
//! A missing file yields an empty record set. A file that fails to load is reported to the caller
//! while the previous snapshot and timestamp stay in place, so the next validation retries.

// std
use std::{
	env, fs,
	io::ErrorKind,
	sync::{
		OnceLock,
		atomic::{AtomicU64, Ordering},
	},
	time::SystemTime,
};
// crates.io
use subtle::ConstantTimeEq;
// self
use crate::{
	_prelude::*,
	auth::{AuthError, TokenFileError, TokenRecord, token::file, token_digest},
	obs,
};

/// Environment variable naming the token file.
pub const TOKENS_FILE_ENV: &str = "AUTH_TOKENS_FILE";
/// Token file used when [`TOKENS_FILE_ENV`] is unset.
pub const DEFAULT_TOKENS_FILE: &str = "tokens.json";

static GLOBAL: OnceLock<Arc<TokenCache>> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FileStamp {
	Unloaded,
	Missing,
	Modified(SystemTime),
}

#[derive(Debug)]
struct CachedToken {
	digest: [u8; 32],
	record: TokenRecord,
}

#[derive(Debug)]
struct CacheState {
	path: PathBuf,
	entries: Arc<[CachedToken]>,
	observed: FileStamp,
}

/// Token records loaded from a JSON file and refreshed when the file changes.
#[derive(Debug)]
pub struct TokenCache {
	state: AsyncMutex<CacheState>,
	loads: AtomicU64,
}
impl TokenCache {
	/// Creates an unloaded cache backed by `path`.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			state: AsyncMutex::new(CacheState {
				path: path.into(),
				entries: Arc::from(Vec::new()),
				observed: FileStamp::Unloaded,
			}),
			loads: AtomicU64::new(0),
		}
	}

	/// Creates a cache backed by `$AUTH_TOKENS_FILE`, or `tokens.json` when unset.
	pub fn from_env() -> Self {
		Self::new(default_path())
	}

	/// Process-wide cache, created on first use.
	pub fn global() -> Arc<TokenCache> {
		GLOBAL.get_or_init(|| Arc::new(Self::from_env())).clone()
	}

	/// Points the cache at another file and forces a reload on the next validation.
	pub async fn set_path(&self, path: impl Into<PathBuf>) {
		let mut state = self.state.lock().await;

		state.path = path.into();
		state.observed = FileStamp::Unloaded;
	}

	/// Drops the cached records and forces a reload on the next validation.
	pub async fn reset(&self) {
		let mut state = self.state.lock().await;

		state.entries = Arc::from(Vec::new());
		state.observed = FileStamp::Unloaded;
	}

	/// Current backing file.
	pub async fn path(&self) -> PathBuf {
		self.state.lock().await.path.clone()
	}

	/// Number of successful file loads so far.
	pub fn load_count(&self) -> u64 {
		self.loads.load(Ordering::Relaxed)
	}

	/// Records currently served, reloading first if the file changed.
	pub async fn records(&self) -> Result<Vec<TokenRecord>, TokenFileError> {
		let entries = self.snapshot().await?;

		Ok(entries.iter().map(|entry| entry.record.clone()).collect())
	}

	/// Resolves a plaintext bearer token to its record.
	///
	/// Fails with [`AuthError::UnknownToken`] when no digest matches and with
	/// [`AuthError::Expired`] when the matching record is past its expiry.
	pub async fn validate(&self, token: &str) -> Result<TokenRecord, AuthError> {
		let entries = self.snapshot().await?;
		let presented = token_digest(token);
		let mut matched = None;

		for entry in entries.iter() {
			let equal = bool::from(entry.digest.as_slice().ct_eq(presented.as_slice()));

			if equal && matched.is_none() {
				matched = Some(entry);
			}
		}

		let entry = matched.ok_or(AuthError::UnknownToken)?;

		if entry.record.is_expired_at(OffsetDateTime::now_utc()) {
			return Err(AuthError::Expired { name: entry.record.name.clone() });
		}

		Ok(entry.record.clone())
	}

	async fn snapshot(&self) -> Result<Arc<[CachedToken]>, TokenFileError> {
		let mut state = self.state.lock().await;
		let stamp = match fs::metadata(&state.path) {
			Ok(meta) => FileStamp::Modified(
				meta.modified().map_err(|source| TokenFileError::Io {
					path: state.path.clone(),
					source,
				})?,
			),
			Err(e) if e.kind() == ErrorKind::NotFound => FileStamp::Missing,
			Err(source) => return Err(TokenFileError::Io { path: state.path.clone(), source }),
		};

		if stamp == FileStamp::Missing {
			state.entries = Arc::from(Vec::new());
			state.observed = FileStamp::Missing;
		} else if stamp != state.observed {
			match load_entries(&state.path) {
				Ok(entries) => {
					obs::tokens_reloaded(&state.path, entries.len());

					state.entries = Arc::from(entries);
					state.observed = stamp;

					self.loads.fetch_add(1, Ordering::Relaxed);
				},
				Err(e) => {
					obs::tokens_load_failed(&state.path, &e.to_string());

					return Err(e);
				},
			}
		}

		Ok(state.entries.clone())
	}
}
impl Default for TokenCache {
	fn default() -> Self {
		Self::from_env()
	}
}

fn default_path() -> PathBuf {
	env::var_os(TOKENS_FILE_ENV)
		.filter(|raw| !raw.is_empty())
		.map(PathBuf::from)
		.unwrap_or_else(|| PathBuf::from(DEFAULT_TOKENS_FILE))
}

fn load_entries(path: &Path) -> Result<Vec<CachedToken>, TokenFileError> {
	file::load_records(path)?
		.into_iter()
		.map(|record| Ok(CachedToken { digest: record.digest()?, record }))
		.collect()
}
