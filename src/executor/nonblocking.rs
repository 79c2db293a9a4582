// crates.io
use reqwest::header::HeaderMap;
// self
use crate::{
	_prelude::*,
	error,
	executor::{RequestAttemptState, RetryPolicy, Step},
	http::{ApiRequest, ApiResponse},
};

/// Async driver for [`RequestAttemptState`] backed by [`reqwest::Client`].
///
/// The executor is cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct Executor {
	http: reqwest::Client,
	policy: RetryPolicy,
	headers: HeaderMap,
}
impl Executor {
	/// Wraps an HTTP client with the provided retry policy.
	pub fn new(http: reqwest::Client, policy: RetryPolicy) -> Self {
		Self { http, policy, headers: HeaderMap::new() }
	}

	/// Sends `headers` with every attempt, in addition to the client's own defaults.
	pub fn with_headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;

		self
	}

	/// Returns the retry policy applied to every call.
	pub fn policy(&self) -> RetryPolicy {
		self.policy
	}

	/// Returns the underlying HTTP client.
	pub fn http_client(&self) -> &reqwest::Client {
		&self.http
	}

	/// Sends `request` until it succeeds, fails permanently, or exhausts the retry budget.
	///
	/// Waits are performed with [`tokio::time::sleep`] so the calling task yields while backing
	/// off. Dropping the returned future abandons the call.
	pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let mut state = RequestAttemptState::new(self.policy);

		loop {
			let step = match self.send(request).await {
				Ok(response) => state.on_response(request, response),
				Err(err) => state.on_failure(request, err),
			};

			match step {
				Step::Deliver(response) => return Ok(response),
				Step::Sleep(wait) => tokio::time::sleep(wait.unsigned_abs()).await,
				Step::Fail(err) => return Err(err),
			}
		}
	}

	async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let mut builder = self
			.http
			.request(request.method.clone(), request.url.clone())
			.headers(self.headers.clone());

		if let Some(body) = &request.body {
			builder = builder.body(body.clone());
		}

		let response = builder.send().await.map_err(error::map_reqwest_error)?;
		let status = response.status();
		let headers = response.headers().clone();
		let body = response.bytes().await.map_err(error::map_reqwest_error)?;

		Ok(ApiResponse { status, headers, body })
	}
}
