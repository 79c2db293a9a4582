// crates.io
use axum::{
	Json,
	extract::rejection::{BytesRejection, PathRejection, QueryRejection},
	http::{HeaderValue, header::WWW_AUTHENTICATE},
	response::{IntoResponse, Response},
};
// self
use crate::{_prelude::*, auth::AuthError, cursor::CursorError, obs, store::StoreError};

/// Failure answered with `{"error": {"code": "<status>", "message": "<text>"}}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
	/// Response status.
	pub status: StatusCode,
	/// Human-readable message.
	pub message: String,
}
impl ApiError {
	/// Creates an error with an explicit status.
	pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
		Self { status, message: message.into() }
	}

	/// `400 Bad Request`.
	pub fn bad_request(message: impl Into<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, message)
	}

	/// `404 Not Found` for a missing object.
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND, "Object not found")
	}

	/// Maps a store failure on a read or delete path.
	pub fn from_store(err: StoreError) -> Self {
		match err {
			StoreError::NotFound { .. } => Self::not_found(),
			StoreError::Unsupported { message } => Self::new(StatusCode::NOT_IMPLEMENTED, message),
			StoreError::Rejected { message } => Self::bad_request(message),
			StoreError::Backend { message } => Self::new(StatusCode::INTERNAL_SERVER_ERROR, message),
		}
	}

	/// Maps a store failure on `PUT`; anything but an unsupported backend is the caller's fault.
	pub fn from_put(err: StoreError) -> Self {
		match err {
			StoreError::Unsupported { message } => Self::new(StatusCode::NOT_IMPLEMENTED, message),
			other => Self::bad_request(other.to_string()),
		}
	}
}
impl From<AuthError> for ApiError {
	fn from(err: AuthError) -> Self {
		obs::auth_rejected(err.reason());

		let message = match &err {
			AuthError::Config(_) => "Token configuration is invalid".to_owned(),
			other => other.to_string().trim_end_matches('.').to_owned(),
		};

		Self::new(err.status(), message)
	}
}
impl From<CursorError> for ApiError {
	fn from(_: CursorError) -> Self {
		Self::bad_request("Invalid cursor")
	}
}
impl From<PathRejection> for ApiError {
	fn from(rejection: PathRejection) -> Self {
		Self::new(rejection.status(), rejection.body_text())
	}
}
impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		Self::new(rejection.status(), rejection.body_text())
	}
}
impl From<BytesRejection> for ApiError {
	fn from(rejection: BytesRejection) -> Self {
		Self::new(rejection.status(), rejection.body_text())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = serde_json::json!({
			"error": { "code": self.status.as_u16().to_string(), "message": self.message }
		});
		let mut response = (self.status, Json(body)).into_response();

		if self.status == StatusCode::UNAUTHORIZED {
			response.headers_mut().insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
		}

		response
	}
}
