// crates.io
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	executor::RetryPolicy,
	page::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT},
};

/// Validated settings shared by [`AsyncClient`](crate::client::AsyncClient) and
/// [`BlockingClient`](crate::client::BlockingClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
	base_url: Url,
	api_key: TokenSecret,
	timeout: Duration,
	retry: RetryPolicy,
	page_size: usize,
}
impl ClientConfig {
	/// Default transport timeout applied to every attempt.
	pub const DEFAULT_TIMEOUT: Duration = Duration::seconds(30);

	/// Returns a builder seeded with the server URL and the bearer key.
	pub fn builder(base_url: impl Into<String>, api_key: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url, api_key)
	}

	/// Server root; object routes are resolved beneath it.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Bearer key sent with every request.
	pub fn api_key(&self) -> &TokenSecret {
		&self.api_key
	}

	/// Per-attempt transport timeout.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Retry budget and initial backoff delay.
	pub fn retry_policy(&self) -> RetryPolicy {
		self.retry
	}

	/// Keys fetched per round trip when iterating a listing.
	pub fn page_size(&self) -> usize {
		self.page_size
	}

	/// Headers attached to every attempt; the bearer value is marked sensitive.
	pub(crate) fn default_headers(&self) -> Result<HeaderMap, ConfigError> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", self.api_key.expose()))
			.map_err(|_| ConfigError::InvalidApiKey)?;
		let mut headers = HeaderMap::new();

		value.set_sensitive(true);
		headers.insert(AUTHORIZATION, value);

		Ok(headers)
	}
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
	base_url: String,
	api_key: TokenSecret,
	timeout: Duration,
	max_retries: u32,
	retry_delay: Duration,
	page_size: usize,
}
impl ClientConfigBuilder {
	fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			api_key: TokenSecret::new(api_key),
			timeout: ClientConfig::DEFAULT_TIMEOUT,
			max_retries: RetryPolicy::DEFAULT_MAX_RETRIES,
			retry_delay: RetryPolicy::DEFAULT_RETRY_DELAY,
			page_size: DEFAULT_PAGE_LIMIT,
		}
	}

	/// Overrides the per-attempt transport timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Overrides the attempt budget for transient failures.
	pub fn max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;

		self
	}

	/// Overrides the initial backoff delay.
	pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
		self.retry_delay = retry_delay;

		self
	}

	/// Overrides the number of keys fetched per listing round trip.
	///
	/// Must lie within the server's accepted `limit` range, `1..=1000`.
	pub fn page_size(mut self, page_size: usize) -> Self {
		self.page_size = page_size;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let invalid = || ConfigError::InvalidBaseUrl { url: self.base_url.clone() };
		let base_url = Url::parse(&self.base_url).map_err(|_| invalid())?;

		if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
			return Err(invalid());
		}
		if !(1..=MAX_PAGE_LIMIT).contains(&self.page_size) {
			return Err(ConfigError::InvalidPageSize);
		}

		let timeout =
			if self.timeout.is_positive() { self.timeout } else { ClientConfig::DEFAULT_TIMEOUT };
		let config = ClientConfig {
			base_url,
			api_key: self.api_key,
			timeout,
			retry: RetryPolicy::new(self.max_retries, self.retry_delay),
			page_size: self.page_size,
		};

		config.default_headers()?;

		Ok(config)
	}
}
