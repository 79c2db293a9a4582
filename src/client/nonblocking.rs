// crates.io
use futures::{Stream, stream};
// self
use crate::{
	_prelude::*,
	client::{ClientConfig, Routes, classify_list_error, decode_json, pager::KeyPager},
	error::ConfigError,
	executor::Executor,
	obs::{self, OpKind, OpOutcome, OpSpan},
	page::{ListPage, ListQuery},
	store::ObjectMetadata,
};

/// Async object store client.
///
/// Every network wait (connect, read, backoff, rate-limit sleep) is a suspension point. The
/// client owns its connection pool; [`AsyncClient::close`] or dropping the value releases it.
#[derive(Debug)]
pub struct AsyncClient {
	config: ClientConfig,
	routes: Routes,
	executor: Executor,
}
impl AsyncClient {
	/// Builds a client with its own connection pool.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let http = reqwest::Client::builder()
			.timeout(config.timeout().unsigned_abs())
			.build()
			.map_err(|e| Error::from(ConfigError::http_client_build(e)))?;

		Self::with_http_client(config, http)
	}

	/// Builds a client on top of a caller-supplied [`reqwest::Client`].
	///
	/// The configured timeout is not applied to `http`; the bearer header is.
	pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Result<Self> {
		let headers = config.default_headers()?;
		let executor = Executor::new(http, config.retry_policy()).with_headers(headers);
		let routes = Routes::new(config.base_url().clone());

		Ok(Self { config, routes, executor })
	}

	/// Settings this client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Stores `data` under `key`.
	pub async fn put(&self, key: &str, data: impl Into<Bytes>) -> Result<ObjectMetadata> {
		const KIND: OpKind = OpKind::Put;

		let span = OpSpan::new(KIND, "put");
		let data = data.into();

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.routes.put(key, data)?;
				let response = self.executor.execute(&request).await?;

				decode_json(&response)
			})
			.await;

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		result
	}

	/// Fetches the bytes stored under `key`; a missing key is [`Error::NotFound`].
	pub async fn get(&self, key: &str) -> Result<Bytes> {
		const KIND: OpKind = OpKind::Get;

		let span = OpSpan::new(KIND, "get");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.routes.get(key)?;

				Ok(self.executor.execute(&request).await?.body)
			})
			.await;

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		result
	}

	/// Reports whether `key` exists. Only 404 maps to `false`; other failures propagate.
	pub async fn exists(&self, key: &str) -> Result<bool> {
		const KIND: OpKind = OpKind::Exists;

		let span = OpSpan::new(KIND, "exists");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.routes.exists(key)?;
				let response = self.executor.execute(&request).await?;

				Ok(response.status.is_success())
			})
			.await;

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		result
	}

	/// Deletes `key`; a missing key is [`Error::NotFound`].
	pub async fn delete(&self, key: &str) -> Result<()> {
		const KIND: OpKind = OpKind::Delete;

		let span = OpSpan::new(KIND, "delete");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.routes.delete(key)?;

				self.executor.execute(&request).await.map(|_| ())
			})
			.await;

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		result
	}

	/// Fetches one listing page.
	pub async fn list(&self, query: &ListQuery) -> Result<ListPage> {
		const KIND: OpKind = OpKind::List;

		let span = OpSpan::new(KIND, "list");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.routes.list(query)?;
				let response = self
					.executor
					.execute(&request)
					.await
					.map_err(|e| classify_list_error(e, query))?;

				decode_json(&response)
			})
			.await;

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		result
	}

	/// Lazily yields every key (optionally under `prefix`) in ascending order.
	///
	/// Each batch costs one round trip of [`ClientConfig::page_size`] keys. The stream ends after
	/// the last page or after yielding the first error; dropping it stops the scan. Every call
	/// starts a fresh scan.
	pub fn keys<'a>(
		&'a self,
		prefix: Option<&str>,
	) -> impl Stream<Item = Result<String>> + Send + use<'a> {
		let pager = KeyPager::new(prefix, self.config.page_size());

		stream::unfold((self, pager), |(client, mut pager)| async move {
			loop {
				if let Some(key) = pager.pop() {
					return Some((Ok(key), (client, pager)));
				}
				if pager.is_done() {
					return None;
				}

				match client.list(pager.query()).await {
					Ok(page) => pager.absorb(page),
					Err(e) => {
						pager.finish();

						return Some((Err(e), (client, pager)));
					},
				}
			}
		})
	}

	/// Releases the connection pool.
	///
	/// A pool passed in through `with_http_client` stays alive while other handles to it exist.
	pub fn close(self) {
		drop(self);
	}
}
