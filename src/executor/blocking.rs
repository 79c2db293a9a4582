// crates.io
use reqwest::header::HeaderMap;
// self
use crate::{
	_prelude::*,
	error,
	executor::{RequestAttemptState, RetryPolicy, Step},
	http::{ApiRequest, ApiResponse},
};

/// Blocking driver for [`RequestAttemptState`] backed by [`reqwest::blocking::Client`].
///
/// Waits block the calling thread. Do not use this executor from inside an async runtime.
#[derive(Clone, Debug)]
pub struct BlockingExecutor {
	http: reqwest::blocking::Client,
	policy: RetryPolicy,
	headers: HeaderMap,
}
impl BlockingExecutor {
	/// Wraps a blocking HTTP client with the provided retry policy.
	pub fn new(http: reqwest::blocking::Client, policy: RetryPolicy) -> Self {
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
	pub fn http_client(&self) -> &reqwest::blocking::Client {
		&self.http
	}

	/// Sends `request` until it succeeds, fails permanently, or exhausts the retry budget.
	pub fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let mut state = RequestAttemptState::new(self.policy);

		loop {
			let step = match self.send(request) {
				Ok(response) => state.on_response(request, response),
				Err(err) => state.on_failure(request, err),
			};

			match step {
				Step::Deliver(response) => return Ok(response),
				Step::Sleep(wait) => std::thread::sleep(wait.unsigned_abs()),
				Step::Fail(err) => return Err(err),
			}
		}
	}

	fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let mut builder = self
			.http
			.request(request.method.clone(), request.url.clone())
			.headers(self.headers.clone());

		if let Some(body) = &request.body {
			builder = builder.body(body.to_vec());
		}

		let response = builder.send().map_err(error::map_reqwest_error)?;
		let status = response.status();
		let headers = response.headers().clone();
		let body = response.bytes().map_err(error::map_reqwest_error)?;

		Ok(ApiResponse { status, headers, body })
	}
}
