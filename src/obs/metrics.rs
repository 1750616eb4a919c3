// self
use crate::obs::{InterceptKind, InterceptOutcome};

/// Records an interceptor outcome via the global metrics recorder (when enabled).
pub fn record_intercept_outcome(kind: InterceptKind, outcome: InterceptOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_token_injector_intercept_total",
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_intercept_outcome_noop_without_recorder() {
		record_intercept_outcome(InterceptKind::Send, InterceptOutcome::Retried);
	}
}
