// self
use crate::{
	_prelude::*,
	client::{ClientConfig, Routes, classify_list_error, decode_json, pager::KeyPager},
	error::ConfigError,
	executor::BlockingExecutor,
	obs::{self, OpKind, OpOutcome, OpSpan},
	page::{ListPage, ListQuery},
	store::ObjectMetadata,
};

/// Blocking object store client.
///
/// Calls block the current thread, including backoff and rate-limit sleeps. The connection pool
/// is safe to share across threads. Do not construct or use this client inside an async runtime;
/// use [`AsyncClient`](crate::client::AsyncClient) there.
#[derive(Debug)]
pub struct BlockingClient {
	config: ClientConfig,
	routes: Routes,
	executor: BlockingExecutor,
}
impl BlockingClient {
	/// Builds a client with its own connection pool.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let http = reqwest::blocking::Client::builder()
			.timeout(config.timeout().unsigned_abs())
			.build()
			.map_err(|e| Error::from(ConfigError::http_client_build(e)))?;

		Self::with_http_client(config, http)
	}

	/// Builds a client on top of a caller-supplied [`reqwest::blocking::Client`].
	pub fn with_http_client(config: ClientConfig, http: reqwest::blocking::Client) -> Result<Self> {
		let headers = config.default_headers()?;
		let executor = BlockingExecutor::new(http, config.retry_policy()).with_headers(headers);
		let routes = Routes::new(config.base_url().clone());

		Ok(Self { config, routes, executor })
	}

	/// Settings this client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Stores `data` under `key`.
	pub fn put(&self, key: &str, data: impl Into<Bytes>) -> Result<ObjectMetadata> {
		self.observe(OpKind::Put, "put", || {
			let request = self.routes.put(key, data.into())?;
			let response = self.executor.execute(&request)?;

			decode_json(&response)
		})
	}

	/// Fetches the bytes stored under `key`; a missing key is [`Error::NotFound`].
	pub fn get(&self, key: &str) -> Result<Bytes> {
		self.observe(OpKind::Get, "get", || {
			let request = self.routes.get(key)?;

			Ok(self.executor.execute(&request)?.body)
		})
	}

	/// Reports whether `key` exists. Only 404 maps to `false`; other failures propagate.
	pub fn exists(&self, key: &str) -> Result<bool> {
		self.observe(OpKind::Exists, "exists", || {
			let request = self.routes.exists(key)?;

			Ok(self.executor.execute(&request)?.status.is_success())
		})
	}

	/// Deletes `key`; a missing key is [`Error::NotFound`].
	pub fn delete(&self, key: &str) -> Result<()> {
		self.observe(OpKind::Delete, "delete", || {
			let request = self.routes.delete(key)?;

			self.executor.execute(&request).map(|_| ())
		})
	}

	/// Fetches one listing page.
	pub fn list(&self, query: &ListQuery) -> Result<ListPage> {
		self.observe(OpKind::List, "list", || {
			let request = self.routes.list(query)?;
			let response =
				self.executor.execute(&request).map_err(|e| classify_list_error(e, query))?;

			decode_json(&response)
		})
	}

	/// Lazily yields every key (optionally under `prefix`) in ascending order.
	///
	/// See [`Keys`] for the paging behavior.
	pub fn keys(&self, prefix: Option<&str>) -> Keys<'_> {
		Keys { client: self, pager: KeyPager::new(prefix, self.config.page_size()) }
	}

	/// Releases the connection pool.
	///
	/// A pool passed in through `with_http_client` stays alive while other handles to it exist.
	pub fn close(self) {
		drop(self);
	}

	fn observe<T, F>(&self, kind: OpKind, stage: &'static str, f: F) -> Result<T>
	where
		F: FnOnce() -> Result<T>,
	{
		let _guard = OpSpan::new(kind, stage).entered();

		obs::record_op_outcome(kind, OpOutcome::Attempt);

		let result = f();

		obs::record_op_outcome(kind, OpOutcome::of(&result));

		result
	}
}

/// Iterator over listed keys, fetching one page per round trip.
///
/// Iteration ends after the last page or right after the first error is yielded. Creating a
/// new iterator restarts the scan from the first key.
#[derive(Debug)]
pub struct Keys<'a> {
	client: &'a BlockingClient,
	pager: KeyPager,
}
impl Iterator for Keys<'_> {
	type Item = Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(key) = self.pager.pop() {
				return Some(Ok(key));
			}
			if self.pager.is_done() {
				return None;
			}

			match self.client.list(self.pager.query()) {
				Ok(page) => self.pager.absorb(page),
				Err(e) => {
					self.pager.finish();

					return Some(Err(e));
				},
			}
		}
	}
}
