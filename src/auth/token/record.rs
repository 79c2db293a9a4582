//! Persisted token records.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenFileError},
	timestamp,
};

/// One entry of the token file.
///
/// Only the hex SHA-256 digest of the bearer secret is stored; the plaintext is shown once at
/// issuance and never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
	/// Unique logical name.
	pub name: String,
	/// Lowercase hex SHA-256 digest of the plaintext token.
	pub hash: String,
	/// Absolute expiry instant.
	#[serde(with = "timestamp::iso8601")]
	pub expires: OffsetDateTime,
	/// Issuance instant, when known.
	#[serde(default, with = "timestamp::iso8601::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Capabilities granted to the holder.
	#[serde(default)]
	pub scopes: ScopeSet,
}
impl TokenRecord {
	/// Returns `true` once `instant` is strictly past the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires < instant
	}

	/// Returns `true` if the record is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Decodes the stored digest, rejecting anything but 32 bytes of hex.
	pub fn digest(&self) -> Result<[u8; 32], TokenFileError> {
		let invalid = || TokenFileError::InvalidRecord {
			name: self.name.clone(),
			reason: "hash must be 64 hex characters".into(),
		};
		let bytes = hex::decode(&self.hash).map_err(|_| invalid())?;

		<[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| invalid())
	}
}
