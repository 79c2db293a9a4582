//! Opaque pagination cursors.
//!
//! A cursor is the standard (padded) base64 encoding of the JSON object
//! `{"last_key": "<string>"}`. Anything else fails to decode with [`CursorError`]; callers must
//! treat the string as opaque and only hand it back to the listing endpoint that produced it.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value;
// self
use crate::_prelude::*;

/// Failures raised while decoding or resolving a cursor.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CursorError {
	/// The cursor is not valid base64.
	#[error("Invalid cursor: not base64.")]
	Encoding,
	/// The decoded payload is not the expected JSON object.
	#[error("Invalid cursor: malformed payload.")]
	Payload,
	/// The cursor's key is not part of the current key set.
	#[error("Invalid cursor: key is no longer listed.")]
	UnknownKey,
	/// The server rejected the cursor.
	#[error("Invalid cursor: {message}.")]
	Rejected {
		/// Server-supplied message.
		message: String,
	},
}

#[derive(Serialize)]
struct CursorPayload {
	last_key: String,
}

/// Encodes `last_key` into an opaque cursor.
pub fn encode(last_key: &str) -> String {
	let payload = CursorPayload { last_key: last_key.to_owned() };
	// Serializing a single string field cannot fail.
	let json = serde_json::to_vec(&payload).unwrap_or_default();

	STANDARD.encode(json)
}

/// Decodes a cursor produced by [`encode`] back into its `last_key`.
pub fn decode(cursor: &str) -> Result<String, CursorError> {
	let raw = STANDARD.decode(cursor).map_err(|_| CursorError::Encoding)?;
	// Only a one-entry object qualifies; arrays and extra fields are rejected.
	let Value::Object(mut payload) =
		serde_json::from_slice::<Value>(&raw).map_err(|_| CursorError::Payload)?
	else {
		return Err(CursorError::Payload);
	};

	if payload.len() != 1 {
		return Err(CursorError::Payload);
	}

	match payload.remove("last_key") {
		Some(Value::String(last_key)) => Ok(last_key),
		_ => Err(CursorError::Payload),
	}
}
