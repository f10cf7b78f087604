// self
use crate::obs::{SyncKind, SyncOutcomeLabel};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_sync_outcome(kind: SyncKind, outcome: SyncOutcomeLabel) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"timeoff_hub_sync_total",
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
	fn record_sync_outcome_noop_without_metrics() {
		record_sync_outcome(SyncKind::Timeoff, SyncOutcomeLabel::Failure);
	}
}
