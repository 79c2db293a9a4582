//! Storage capability consumed by the route layer, plus the built-in in-memory backend.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Boxed future returned by [`ObjectStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Opaque key/value capability behind the HTTP routes.
///
/// Implementations own their internal representation; the route layer only relies on the five
/// operations below and on the [`StoreError`] kinds they report.
pub trait ObjectStore
where
	Self: Send + Sync,
{
	/// Stores `data` under `key`, replacing any previous value.
	fn put<'a>(&'a self, key: &'a str, data: Bytes) -> StoreFuture<'a, ObjectMetadata>;

	/// Returns the bytes stored under `key`.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Bytes>;

	/// Reports whether `key` is present.
	fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool>;

	/// Removes `key`, failing with [`StoreError::NotFound`] when it is absent.
	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;

	/// Returns every stored key in any order.
	///
	/// Backends that cannot enumerate their key space report [`StoreError::Unsupported`].
	fn keys(&self) -> StoreFuture<'_, Vec<String>>;
}

/// Error type produced by [`ObjectStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// The key is not present.
	#[error("Object `{key}` was not found.")]
	NotFound {
		/// Requested key.
		key: String,
	},
	/// The backend refused the input (for example an empty key).
	#[error("Store rejected the request: {message}.")]
	Rejected {
		/// Human-readable error payload.
		message: String,
	},
	/// The backend does not implement the operation.
	#[error("Operation is not supported: {message}.")]
	Unsupported {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Description of a stored object, returned by `put`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
	/// Object key.
	pub key: String,
	/// Payload length in bytes.
	pub size: u64,
	/// Instant the object was written.
	#[serde(with = "crate::timestamp::iso8601")]
	pub created_at: OffsetDateTime,
}
