//! Resilient request execution with bounded retries, exponential backoff, and 429 cooperation.
//!
//! The retry rules live in [`RequestAttemptState`], a transport-agnostic state machine that is
//! fed one outcome per attempt and answers with a [`Step`]. The drivers ([`Executor`] for async
//! callers, [`BlockingExecutor`] behind the `blocking` feature) only perform the I/O and the
//! sleeping, so both client variants follow identical retry semantics.
//!
//! # Rules
//!
//! - Transport failures and gateway statuses (502, 503, 504) consume one unit of the retry
//!   budget and wait for the current backoff delay, which then doubles.
//! - HTTP 429 waits for `Retry-After` seconds (or the current delay when the header is absent or
//!   non-numeric) and never touches the budget or the backoff sequence.
//! - Any other failure status is classified into an [`Error`] and returned immediately, unless
//!   the request allow-listed that status.
//! - A retryable failure on the final attempt yields [`Error::Exhausted`].

#[cfg(feature = "blocking")] mod blocking;
mod nonblocking;

#[cfg(feature = "blocking")] pub use blocking::BlockingExecutor;
pub use nonblocking::Executor;

// self
use crate::{
	_prelude::*,
	http::{self, ApiRequest, ApiResponse, ResponseMetadata},
	obs::{self, RetryReason},
};

/// Retry budget and initial backoff delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Maximum number of attempts for retryable failures; `0` behaves like `1`.
	pub max_retries: u32,
	/// Delay before the first retry; doubles after each retry.
	pub retry_delay: Duration,
}
impl RetryPolicy {
	/// Default attempt budget.
	pub const DEFAULT_MAX_RETRIES: u32 = 3;
	/// Default initial backoff delay.
	pub const DEFAULT_RETRY_DELAY: Duration = Duration::seconds(1);

	/// Creates a policy with the provided budget and initial delay.
	pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
		let retry_delay = if retry_delay.is_negative() { Duration::ZERO } else { retry_delay };

		Self { max_retries, retry_delay }
	}

	fn max_attempts(&self) -> u32 {
		self.max_retries.max(1)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_RETRY_DELAY)
	}
}

/// What a driver must do after an attempt.
#[derive(Debug)]
pub enum Step {
	/// Hand the response to the caller.
	Deliver(ApiResponse),
	/// Sleep for the duration, then attempt again.
	Sleep(Duration),
	/// Return the error to the caller.
	Fail(Error),
}

/// Per-call retry state: attempts consumed, current backoff delay, and the last failure.
///
/// Each in-flight call owns exactly one value; it is never shared.
#[derive(Debug)]
pub struct RequestAttemptState {
	policy: RetryPolicy,
	attempts: u32,
	delay: Duration,
	rate_limited: u32,
	last_error: Option<Error>,
}
impl RequestAttemptState {
	/// Starts a fresh call under `policy`.
	pub fn new(policy: RetryPolicy) -> Self {
		Self { policy, attempts: 0, delay: policy.retry_delay, rate_limited: 0, last_error: None }
	}

	/// Attempts that consumed the retry budget so far.
	pub fn attempts(&self) -> u32 {
		self.attempts
	}

	/// Delay the next transient retry will wait for.
	pub fn current_delay(&self) -> Duration {
		self.delay
	}

	/// Number of 429 responses cooperated with so far.
	pub fn rate_limited(&self) -> u32 {
		self.rate_limited
	}

	/// Failure that triggered the most recent retry, if any.
	pub fn last_error(&self) -> Option<&Error> {
		self.last_error.as_ref()
	}

	/// Feeds a complete HTTP response into the state machine.
	pub fn on_response(&mut self, request: &ApiRequest, response: ApiResponse) -> Step {
		let meta = ResponseMetadata::from_parts(response.status, &response.headers);

		if meta.status == StatusCode::TOO_MANY_REQUESTS {
			let wait = meta.retry_after.unwrap_or(self.delay);

			self.rate_limited += 1;

			obs::record_retry(request.op, RetryReason::RateLimited);
			obs::retry_scheduled(
				request.op,
				RetryReason::RateLimited,
				self.attempts + 1,
				wait,
				"429 Too Many Requests",
			);

			return Step::Sleep(wait);
		}
		if !meta.status.is_client_error() && !meta.status.is_server_error() {
			return Step::Deliver(response);
		}
		if request.allow_status == Some(meta.status) {
			return Step::Deliver(response);
		}

		let message = http::error_message(meta.status, &response.body);

		self.on_failure(request, Error::from_status(meta.status, message, &request.resource))
	}

	/// Feeds a failed attempt (transport error or classified status) into the state machine.
	pub fn on_failure(&mut self, request: &ApiRequest, err: Error) -> Step {
		self.attempts += 1;

		if !err.is_retryable() {
			obs::request_failed(request.op, self.attempts, &err.to_string());

			return Step::Fail(err);
		}
		if self.attempts >= self.policy.max_attempts() {
			obs::request_failed(request.op, self.attempts, &err.to_string());

			self.last_error = None;

			return Step::Fail(Error::Exhausted { attempts: self.attempts, source: Box::new(err) });
		}

		let wait = self.delay;

		self.delay = self.delay.saturating_mul(2);

		obs::record_retry(request.op, RetryReason::Transient);
		obs::retry_scheduled(request.op, RetryReason::Transient, self.attempts, wait, &err.to_string());

		self.last_error = Some(err);

		Step::Sleep(wait)
	}
}
