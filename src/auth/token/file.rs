//! JSON token file: loading, atomic persistence, and the issue/revoke/rotate lifecycle.
//!
//! The file holds a JSON array of [`TokenRecord`]s. Every mutation rewrites the whole array to
//! `<file>.tmp`, syncs it, and renames it over the target, so readers (including the hot-reloading
//! cache) only ever observe complete snapshots.

// std
use std::{
	collections::HashSet,
	ffi::OsString,
	fs::{self, File},
	io::{ErrorKind, Write},
};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenRecord, TokenSecret},
};

/// Failures raised while reading or writing the token file.
#[derive(Debug, ThisError)]
pub enum TokenFileError {
	/// Filesystem access failed.
	#[error("Token file `{}` could not be accessed.", path.display())]
	Io {
		/// File (or temporary file) being accessed.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// The file is not a JSON array of token records.
	#[error("Token file `{}` is corrupted or contains invalid token data.", path.display())]
	Parse {
		/// Offending file.
		path: PathBuf,
		/// Path-aware parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The records could not be serialized.
	#[error("Token records could not be serialized.")]
	Serialize(#[source] serde_json::Error),
	/// A record violates the file invariants.
	#[error("Token `{name}` is invalid: {reason}.")]
	InvalidRecord {
		/// Record name.
		name: String,
		/// Violated invariant.
		reason: String,
	},
	/// A token with this name is already present.
	#[error("A token with name `{name}` already exists.")]
	AlreadyExists {
		/// Conflicting name.
		name: String,
	},
	/// No token with this name is present.
	#[error("No token with name `{name}` found.")]
	UnknownName {
		/// Requested name.
		name: String,
	},
}
impl TokenFileError {
	fn io(path: &Path, source: std::io::Error) -> Self {
		Self::Io { path: path.to_path_buf(), source }
	}
}

/// A freshly issued or rotated token together with its one-time plaintext.
#[derive(Clone, Debug)]
pub struct IssuedToken {
	/// Persisted record.
	pub record: TokenRecord,
	/// Plaintext bearer secret; it is not recoverable after this value is dropped.
	pub secret: TokenSecret,
}

/// Reads every record from `path`.
///
/// A missing or empty file yields an empty set. Malformed JSON, duplicate names, and digests that
/// are not 64 hex characters are reported as corruption.
pub fn load_records(path: &Path) -> Result<Vec<TokenRecord>, TokenFileError> {
	let bytes = match fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
		Err(e) => return Err(TokenFileError::io(path, e)),
	};

	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(Vec::new());
	}

	let mut de = serde_json::Deserializer::from_slice(&bytes);
	let mut records: Vec<TokenRecord> = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| TokenFileError::Parse { path: path.to_path_buf(), source })?;
	let mut names = HashSet::with_capacity(records.len());

	for record in &mut records {
		if record.name.is_empty() {
			return Err(TokenFileError::InvalidRecord {
				name: String::new(),
				reason: "name must not be empty".into(),
			});
		}
		if !names.insert(record.name.clone()) {
			return Err(TokenFileError::InvalidRecord {
				name: record.name.clone(),
				reason: "name is not unique".into(),
			});
		}

		record.hash.make_ascii_lowercase();
		record.digest()?;
	}

	Ok(records)
}

/// Atomically replaces the contents of `path` with `records`.
pub fn save_records(path: &Path, records: &[TokenRecord]) -> Result<(), TokenFileError> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent).map_err(|e| TokenFileError::io(parent, e))?;
	}

	let serialized = serde_json::to_vec_pretty(records).map_err(TokenFileError::Serialize)?;
	let tmp_path = tmp_path(path);

	{
		let mut file = File::create(&tmp_path).map_err(|e| TokenFileError::io(&tmp_path, e))?;

		file.write_all(&serialized).map_err(|e| TokenFileError::io(&tmp_path, e))?;
		file.sync_all().map_err(|e| TokenFileError::io(&tmp_path, e))?;
	}

	fs::rename(&tmp_path, path).map_err(|e| TokenFileError::io(path, e))
}

/// Creates a new token named `name` valid for `ttl`.
pub fn issue(
	path: &Path,
	name: &str,
	ttl: Duration,
	scopes: ScopeSet,
) -> Result<IssuedToken, TokenFileError> {
	if name.is_empty() {
		return Err(TokenFileError::InvalidRecord {
			name: String::new(),
			reason: "name must not be empty".into(),
		});
	}

	let mut records = load_records(path)?;

	if records.iter().any(|record| record.name == name) {
		return Err(TokenFileError::AlreadyExists { name: name.to_owned() });
	}

	let secret = TokenSecret::generate();
	let now = OffsetDateTime::now_utc();
	let record = TokenRecord {
		name: name.to_owned(),
		hash: secret.hash(),
		expires: now + ttl,
		created_at: Some(now),
		scopes,
	};

	records.push(record.clone());
	save_records(path, &records)?;

	Ok(IssuedToken { record, secret })
}

/// Removes the token named `name`, returning the removed record.
pub fn revoke(path: &Path, name: &str) -> Result<TokenRecord, TokenFileError> {
	let mut records = load_records(path)?;
	let index = records
		.iter()
		.position(|record| record.name == name)
		.ok_or_else(|| TokenFileError::UnknownName { name: name.to_owned() })?;
	let removed = records.remove(index);

	save_records(path, &records)?;

	Ok(removed)
}

/// Replaces the secret and expiry of `name`.
///
/// Scopes are replaced only when `scopes` is a non-empty set; otherwise the existing scopes are
/// kept.
pub fn rotate(
	path: &Path,
	name: &str,
	ttl: Duration,
	scopes: Option<ScopeSet>,
) -> Result<IssuedToken, TokenFileError> {
	let mut records = load_records(path)?;
	let record = records
		.iter_mut()
		.find(|record| record.name == name)
		.ok_or_else(|| TokenFileError::UnknownName { name: name.to_owned() })?;
	let secret = TokenSecret::generate();

	record.hash = secret.hash();
	record.expires = OffsetDateTime::now_utc() + ttl;

	if let Some(scopes) = scopes.filter(|s| !s.is_empty()) {
		record.scopes = scopes;
	}

	let record = record.clone();

	save_records(path, &records)?;

	Ok(IssuedToken { record, secret })
}

fn tmp_path(path: &Path) -> PathBuf {
	let mut raw = OsString::from(path.as_os_str());

	raw.push(".tmp");

	PathBuf::from(raw)
}
