//! Crate-level error types shared by the clients, the executor, and the serving side.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every variant names one semantic condition so callers can branch on the kind (for example,
/// treat [`Error::NotFound`] as absence) without inspecting message text.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout) on a single attempt.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Every allowed attempt failed with a retryable condition.
	#[error("Request failed after {attempts} attempts.")]
	Exhausted {
		/// Number of attempts performed.
		attempts: u32,
		/// The failure observed on the final attempt.
		#[source]
		source: Box<Error>,
	},
	/// Response body could not be decoded into the expected shape.
	#[error("Response body is malformed.")]
	Decode {
		/// Path-aware parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Pagination cursor is malformed or no longer refers to a live key.
	#[error(transparent)]
	InvalidCursor(#[from] crate::cursor::CursorError),
	/// Token backing file could not be read or parsed.
	#[error(transparent)]
	CorruptConfiguration(#[from] crate::auth::TokenFileError),
	/// Server-side storage failure.
	#[error(transparent)]
	Storage(#[from] crate::store::StoreError),

	/// The requested key does not exist.
	#[error("Object `{key}` was not found.")]
	NotFound {
		/// Key (or resource path) that was requested.
		key: String,
	},
	/// The backend does not implement the requested operation.
	#[error("Operation is not supported by the backend: {message}.")]
	Unsupported {
		/// Server-supplied message.
		message: String,
	},
	/// Bearer token is missing, unknown, or expired.
	#[error("Request is unauthorized: {message}.")]
	Unauthorized {
		/// Server-supplied message.
		message: String,
	},
	/// Bearer token lacks a required scope.
	#[error("Request is forbidden: {message}.")]
	Forbidden {
		/// Server-supplied message.
		message: String,
	},
	/// The server rejected the request with a 4xx status.
	#[error("HTTP {status}: {message}.")]
	Client {
		/// HTTP status code.
		status: u16,
		/// Server-supplied message.
		message: String,
	},
	/// The server failed with a 5xx status that is not retried.
	#[error("HTTP {status}: {message}.")]
	Server {
		/// HTTP status code.
		status: u16,
		/// Server-supplied message.
		message: String,
	},
}
impl Error {
	/// Maps an HTTP failure status into its semantic kind.
	///
	/// `resource` labels [`Error::NotFound`]; the message is kept verbatim for every other kind.
	pub fn from_status(status: StatusCode, message: String, resource: &str) -> Self {
		match status {
			StatusCode::UNAUTHORIZED => Self::Unauthorized { message },
			StatusCode::FORBIDDEN => Self::Forbidden { message },
			StatusCode::NOT_FOUND => Self::NotFound { key: resource.to_owned() },
			StatusCode::NOT_IMPLEMENTED => Self::Unsupported { message },
			s if s.is_server_error() => Self::Server { status: s.as_u16(), message },
			s => Self::Client { status: s.as_u16(), message },
		}
	}

	/// HTTP status associated with the failure, when one was observed.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::NotFound { .. } => Some(404),
			Self::Unsupported { .. } => Some(501),
			Self::Unauthorized { .. } => Some(401),
			Self::Forbidden { .. } => Some(403),
			Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
			Self::Exhausted { source, .. } => source.status(),
			_ => None,
		}
	}

	/// Returns `true` when the condition is transient and the executor may try again.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Transport(_) => true,
			Self::Server { status, .. } => matches!(status, 502..=504),
			_ => false,
		}
	}

	/// Returns `true` for [`Error::NotFound`].
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}

	pub(crate) fn decode(source: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self::Decode { source }
	}
}

/// Configuration and validation failures raised before any request leaves the process.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed or cannot carry path segments.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// The rejected URL text.
		url: String,
	},
	/// Object keys must be non-empty.
	#[error("Object keys cannot be empty.")]
	EmptyKey,
	/// Page size must fall within the server's listing limit.
	#[error("Page size must be between 1 and 1000.")]
	InvalidPageSize,
	/// API key cannot be placed into an `Authorization` header.
	#[error("API key contains characters that are not valid in an HTTP header.")]
	InvalidApiKey,
	/// Listen address cannot be parsed.
	#[error("Bind address `{value}` is invalid.")]
	InvalidBindAddress {
		/// The rejected address text.
		value: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the object store.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the transport timeout.
	#[error("Request to the object store timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the object store.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

/// Splits reqwest failures into configuration problems and retryable transport failures.
pub(crate) fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::http_client_build(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { source: Box::new(err) }.into();
	}

	TransportError::network(err).into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_mapping_covers_taxonomy() {
		let map = |code: u16| {
			let status = StatusCode::from_u16(code).expect("Status fixture should be valid.");

			Error::from_status(status, "boom".into(), "k")
		};

		assert!(matches!(map(401), Error::Unauthorized { .. }));
		assert!(matches!(map(403), Error::Forbidden { .. }));
		assert!(matches!(map(404), Error::NotFound { ref key } if key == "k"));
		assert!(matches!(map(501), Error::Unsupported { .. }));
		assert!(matches!(map(500), Error::Server { status: 500, .. }));
		assert!(matches!(map(409), Error::Client { status: 409, .. }));
	}

	#[test]
	fn retryable_classification_is_narrow() {
		let gateway = Error::Server { status: 503, message: "busy".into() };
		let internal = Error::Server { status: 500, message: "bug".into() };
		let missing = Error::NotFound { key: "k".into() };

		assert!(gateway.is_retryable());
		assert!(!internal.is_retryable());
		assert!(!missing.is_retryable());
		assert!(missing.is_not_found());
	}

	#[test]
	fn exhausted_exposes_last_failure() {
		let last = Error::Server { status: 504, message: "gateway".into() };
		let err = Error::Exhausted { attempts: 3, source: Box::new(last) };

		assert_eq!(err.status(), Some(504));
		assert_eq!(err.to_string(), "Request failed after 3 attempts.");

		let source = StdError::source(&err).expect("Exhausted errors should expose their source.");

		assert!(source.to_string().contains("gateway"));
	}
}
