//! Bearer secrets: redacted wrapper, generation, and the digest stored in place of the plaintext.

// crates.io
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const GENERATED_LEN: usize = 43;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Generates a fresh random secret.
	pub fn generate() -> Self {
		Self(rand::rng().sample_iter(Alphanumeric).take(GENERATED_LEN).map(char::from).collect())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Hex digest persisted for this secret.
	pub fn hash(&self) -> String {
		hash_token(&self.0)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Raw SHA-256 digest of a plaintext token.
pub fn token_digest(token: &str) -> [u8; 32] {
	Sha256::digest(token.as_bytes()).into()
}

/// Lowercase hex SHA-256 digest of a plaintext token.
pub fn hash_token(token: &str) -> String {
	hex::encode(token_digest(token))
}
