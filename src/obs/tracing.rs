// self
use crate::{
	_prelude::*,
	obs::{OpKind, RetryReason},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("objstore.request", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> OpSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OpSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OpSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`OpSpan::entered`].
pub struct OpSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard(..)")
	}
}

/// Emits an event for a retry the executor is about to wait for.
pub fn retry_scheduled(kind: OpKind, reason: RetryReason, attempt: u32, wait: Duration, cause: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			op = kind.as_str(),
			reason = reason.as_str(),
			attempt,
			wait_ms = wait.whole_milliseconds() as u64,
			cause,
			"retrying object store request",
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, reason, attempt, wait, cause);
	}
}

/// Emits an event when the executor gives up on a request.
pub fn request_failed(kind: OpKind, attempts: u32, cause: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(op = kind.as_str(), attempts, cause, "object store request failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, attempts, cause);
	}
}

/// Emits an event after the token cache re-read its backing file.
pub fn tokens_reloaded(path: &Path, count: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(path = %path.display(), count, "reloaded token records");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (path, count);
	}
}

/// Emits an event when the token cache cannot load its backing file.
pub fn tokens_load_failed(path: &Path, cause: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(path = %path.display(), cause, "token file could not be loaded");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (path, cause);
	}
}

/// Emits an event once the route layer is accepting connections.
pub fn server_listening(addr: std::net::SocketAddr) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(address = %addr, "serving object store");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = addr;
	}
}

/// Emits an event for a rejected credential or scope check.
pub fn auth_rejected(reason: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(reason, "rejected request credentials");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = reason;
	}
}
