//! Bearer-token authentication for the serving side: token records and their backing file, the
//! hot-reloading token cache, and scope authorization.

pub mod authorizer;
pub mod cache;
pub mod scope;
pub mod token;

pub use authorizer::*;
pub use cache::*;
pub use scope::*;
pub use token::{file::*, record::*, secret::*};

// self
use crate::_prelude::*;

/// Reasons a request fails authentication or authorization.
///
/// Every variant except [`AuthError::Forbidden`] and [`AuthError::Config`] surfaces as HTTP 401;
/// the distinct kinds exist for logging and tests.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// No `Authorization` header was sent.
	#[error("Invalid or missing token.")]
	MissingCredentials,
	/// The `Authorization` header is not `Bearer <token>`.
	#[error("Invalid or missing token.")]
	Malformed,
	/// No record matches the presented token.
	#[error("Invalid or missing token.")]
	UnknownToken,
	/// The matching record is past its expiry.
	#[error("Token expired.")]
	Expired {
		/// Name of the expired record.
		name: String,
	},
	/// The token lacks required scopes.
	#[error("Missing required scopes: {}.", missing.join(", "))]
	Forbidden {
		/// Missing scopes in ascending order.
		missing: Vec<String>,
	},
	/// The token file could not be loaded.
	#[error(transparent)]
	Config(#[from] TokenFileError),
}
impl AuthError {
	/// HTTP status the route layer answers with.
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Forbidden { .. } => StatusCode::FORBIDDEN,
			Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
			_ => StatusCode::UNAUTHORIZED,
		}
	}

	/// Stable label used in log events.
	pub fn reason(&self) -> &'static str {
		match self {
			Self::MissingCredentials => "missing_credentials",
			Self::Malformed => "malformed",
			Self::UnknownToken => "unknown_token",
			Self::Expired { .. } => "expired",
			Self::Forbidden { .. } => "forbidden",
			Self::Config(_) => "config",
		}
	}
}
impl From<AuthError> for Error {
	fn from(err: AuthError) -> Self {
		match err {
			AuthError::Config(source) => Error::CorruptConfiguration(source),
			AuthError::Forbidden { .. } => Error::Forbidden { message: err.to_string() },
			other => Error::Unauthorized { message: other.to_string() },
		}
	}
}
