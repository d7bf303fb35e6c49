//! Observability helpers for token acquisition.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `bearer_broker.acquire` and
//!   `bearer_broker.flow` plus events for acquisitions, retries, and fatal failures.
//! - Enable `metrics` to increment the `bearer_broker_flow_total` counter for every
//!   attempt/cache hit/success/retry/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Remote exchanges performed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Username/password exchange against the token endpoint.
	Authenticate,
	/// Refresh-token exchange against the refresh endpoint.
	Refresh,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Authenticate => "authenticate",
			FlowKind::Refresh => "refresh",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each acquisition step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// A remote exchange is about to start.
	Attempt,
	/// A cached token satisfied the caller.
	CacheHit,
	/// A remote exchange produced a new token.
	Success,
	/// A retryable failure consumed one unit of backoff.
	Retry,
	/// A failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::CacheHit => "cache_hit",
			FlowOutcome::Success => "success",
			FlowOutcome::Retry => "retry",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
