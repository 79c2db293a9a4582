//! Optional observability helpers for client operations and the serving side.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `objstore.request` with the `op` and
//!   `stage` fields, plus events for retries, rate-limit waits, token reloads, and rejected
//!   credentials.
//! - Enable `metrics` to increment the `objstore_request_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`, and `objstore_retry_total` labeled by
//!   `reason`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Object store operations observed by the clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// `PUT /objects/{key}`.
	Put,
	/// `GET /objects/{key}`.
	Get,
	/// `HEAD /objects/{key}`.
	Exists,
	/// `DELETE /objects/{key}`.
	Delete,
	/// `GET /objects`.
	List,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Put => "put",
			OpKind::Get => "get",
			OpKind::Exists => "exists",
			OpKind::Delete => "delete",
			OpKind::List => "list",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}

	/// Maps a result into its outcome label.
	pub fn of<T>(result: &Result<T>) -> Self {
		if result.is_ok() { OpOutcome::Success } else { OpOutcome::Failure }
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Why the executor is about to sleep before another attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RetryReason {
	/// Transport failure or gateway status; consumes the retry budget.
	Transient,
	/// HTTP 429; does not consume the retry budget.
	RateLimited,
}
impl RetryReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RetryReason::Transient => "transient",
			RetryReason::RateLimited => "rate_limited",
		}
	}
}
