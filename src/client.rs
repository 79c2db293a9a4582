//! Object store clients.
//!
//! [`AsyncClient`] and [`BlockingClient`] expose the same operations with the same semantics.
//! Both build requests through [`Routes`] and interpret responses with the helpers in this
//! module; they only differ in the executor that drives the I/O and in how a listing is
//! exposed (a [`Stream`](futures::Stream) or an [`Iterator`]).

#[cfg(feature = "blocking")] mod blocking;
mod config;
mod nonblocking;
mod pager;

#[cfg(feature = "blocking")] pub use blocking::{BlockingClient, Keys};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use nonblocking::AsyncClient;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	cursor::CursorError,
	error::ConfigError,
	http::{ApiRequest, ApiResponse},
	obs::OpKind,
	page::ListQuery,
};

/// Builds the [`ApiRequest`] for every object store route beneath a base URL.
#[derive(Clone, Debug)]
pub struct Routes {
	base: Url,
}
impl Routes {
	/// Creates routes rooted at `base`.
	pub fn new(base: Url) -> Self {
		Self { base }
	}

	/// `PUT /objects/{key}` carrying `data`.
	pub fn put(&self, key: &str, data: Bytes) -> Result<ApiRequest> {
		Ok(self.object(OpKind::Put, Method::PUT, key)?.with_body(data))
	}

	/// `GET /objects/{key}`.
	pub fn get(&self, key: &str) -> Result<ApiRequest> {
		self.object(OpKind::Get, Method::GET, key)
	}

	/// `HEAD /objects/{key}`, letting 404 through as an answer.
	pub fn exists(&self, key: &str) -> Result<ApiRequest> {
		Ok(self.object(OpKind::Exists, Method::HEAD, key)?.allow(StatusCode::NOT_FOUND))
	}

	/// `DELETE /objects/{key}`.
	pub fn delete(&self, key: &str) -> Result<ApiRequest> {
		self.object(OpKind::Delete, Method::DELETE, key)
	}

	/// `GET /objects?prefix&limit&cursor`.
	pub fn list(&self, query: &ListQuery) -> Result<ApiRequest> {
		let mut url = self.collection_url()?;

		{
			let mut pairs = url.query_pairs_mut();

			if let Some(prefix) = query.prefix_filter() {
				pairs.append_pair("prefix", prefix);
			}

			pairs.append_pair("limit", &query.limit.to_string());

			if let Some(cursor) = &query.cursor {
				pairs.append_pair("cursor", cursor);
			}
		}

		Ok(ApiRequest::new(OpKind::List, Method::GET, url, "objects"))
	}

	fn object(&self, op: OpKind, method: Method, key: &str) -> Result<ApiRequest> {
		if key.is_empty() {
			return Err(ConfigError::EmptyKey.into());
		}

		let mut url = self.collection_url()?;

		// The key travels as one segment; `/` inside it is percent-encoded.
		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidBaseUrl { url: self.base.to_string() })?
			.push(key);

		Ok(ApiRequest::new(op, method, url, key))
	}

	fn collection_url(&self) -> Result<Url> {
		let mut url = self.base.clone();

		url.set_query(None);
		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidBaseUrl { url: self.base.to_string() })?
			.pop_if_empty()
			.push("objects");

		Ok(url)
	}
}

/// Decodes a JSON body, reporting the failing path on mismatch.
pub(crate) fn decode_json<T>(response: &ApiResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut de).map_err(Error::decode)
}

/// Maps a 400 on a cursor-bearing listing to [`Error::InvalidCursor`].
pub(crate) fn classify_list_error(err: Error, query: &ListQuery) -> Error {
	match err {
		Error::Client { status: 400, message } if query.cursor.is_some() =>
			CursorError::Rejected { message }.into(),
		other => other,
	}
}
