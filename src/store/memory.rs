//! Thread-safe in-memory [`ObjectStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{ObjectMetadata, ObjectStore, StoreError, StoreFuture},
};

type ObjectMap = Arc<RwLock<HashMap<String, Bytes>>>;

/// Storage backend that keeps objects in-process.
///
/// Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(ObjectMap);
impl MemoryStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored objects.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn put_now(map: &ObjectMap, key: &str, data: Bytes) -> Result<ObjectMetadata, StoreError> {
		if key.is_empty() {
			return Err(StoreError::Rejected { message: "key must not be empty".into() });
		}

		let size = data.len() as u64;

		map.write().insert(key.to_owned(), data);

		Ok(ObjectMetadata { key: key.to_owned(), size, created_at: OffsetDateTime::now_utc() })
	}

	fn get_now(map: &ObjectMap, key: &str) -> Result<Bytes, StoreError> {
		map.read()
			.get(key)
			.cloned()
			.ok_or_else(|| StoreError::NotFound { key: key.to_owned() })
	}

	fn delete_now(map: &ObjectMap, key: &str) -> Result<(), StoreError> {
		match map.write().remove(key) {
			Some(_) => Ok(()),
			None => Err(StoreError::NotFound { key: key.to_owned() }),
		}
	}
}
impl ObjectStore for MemoryStore {
	fn put<'a>(&'a self, key: &'a str, data: Bytes) -> StoreFuture<'a, ObjectMetadata> {
		Box::pin(async move { Self::put_now(&self.0, key, data) })
	}

	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Bytes> {
		Box::pin(async move { Self::get_now(&self.0, key) })
	}

	fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
		Box::pin(async move { Ok(self.0.read().contains_key(key)) })
	}

	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		Box::pin(async move { Self::delete_now(&self.0, key) })
	}

	fn keys(&self) -> StoreFuture<'_, Vec<String>> {
		Box::pin(async move { Ok(self.0.read().keys().cloned().collect()) })
	}
}
