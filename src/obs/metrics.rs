// self
use crate::obs::{OpKind, OpOutcome, RetryReason};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"objstore_request_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a scheduled retry via the global metrics recorder (when enabled).
pub fn record_retry(kind: OpKind, reason: RetryReason) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"objstore_retry_total",
			"op" => kind.as_str(),
			"reason" => reason.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, reason);
	}
}
