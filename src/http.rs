//! Transport primitives shared by the blocking and the async executors.
//!
//! The module exposes [`ApiRequest`], the transport-agnostic description of one logical call,
//! [`ApiResponse`], a fully-buffered response handed back to the client layer, and
//! [`ResponseMetadata`], the subset of a response the retry state machine inspects. Executors
//! fill [`ResponseMetadata`] from the raw transport response before deciding whether the body
//! needs to be read at all.

// crates.io
use reqwest::header::{HeaderMap, RETRY_AFTER};
// self
use crate::{_prelude::*, obs::OpKind};

/// One logical request, replayed verbatim on every attempt.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// Operation label used for spans and metrics.
	pub op: OpKind,
	/// HTTP method.
	pub method: Method,
	/// Fully-resolved URL, including query parameters.
	pub url: Url,
	/// Raw request body.
	pub body: Option<Bytes>,
	/// Failure status the caller wants returned instead of raised.
	pub allow_status: Option<StatusCode>,
	/// Human-readable resource label used when classifying a 404.
	pub resource: String,
}
impl ApiRequest {
	/// Creates a request without body or allow-listed status.
	pub fn new(op: OpKind, method: Method, url: Url, resource: impl Into<String>) -> Self {
		Self { op, method, url, body: None, allow_status: None, resource: resource.into() }
	}

	/// Attaches a raw body.
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Lets `status` through to the caller instead of raising it.
	pub fn allow(mut self, status: StatusCode) -> Self {
		self.allow_status = Some(status);

		self
	}
}

/// Fully-buffered response returned by an executor.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body.
	pub body: Bytes,
}

/// Captures the parts of a response the retry state machine needs.
///
/// Additional metadata fields may be added in future releases, so downstream code
/// should construct values using field names instead of struct update syntax.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code.
	pub status: StatusCode,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl ResponseMetadata {
	/// Extracts metadata from a status line and its headers.
	pub fn from_parts(status: StatusCode, headers: &HeaderMap) -> Self {
		Self { status, retry_after: parse_retry_after(headers) }
	}
}

#[derive(Deserialize)]
struct ErrorEnvelope {
	error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
	#[serde(default)]
	message: Option<String>,
}

/// Extracts the human-readable message from a failure body.
///
/// Structured `{"error": {"message": ...}}` payloads yield their message; anything else falls
/// back to the raw text.
pub fn error_message(status: StatusCode, body: &[u8]) -> String {
	if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
		return envelope.error.message.unwrap_or_else(|| "Unknown error".into());
	}

	let text = String::from_utf8_lossy(body);
	let text = text.trim();

	if text.is_empty() {
		status.canonical_reason().unwrap_or("Unknown error").to_owned()
	} else {
		format!("{} error: {text}", status.as_u16())
	}
}

/// Reads `Retry-After` as a whole number of seconds.
///
/// HTTP-date values and anything non-numeric yield `None`, leaving the caller on its own
/// backoff schedule.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();
	let secs = raw.parse::<u32>().ok()?;

	Some(Duration::seconds(i64::from(secs)))
}
