// self
use crate::obs::{FlowKind, FlowOutcome};

/// Label used when an outcome is not tied to a remote exchange (cache hits).
const CACHE_FLOW: &str = "cache";

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: Option<FlowKind>, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"bearer_broker_flow_total",
			"flow" => kind.map_or(CACHE_FLOW, FlowKind::as_str),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome, CACHE_FLOW);
	}
}
