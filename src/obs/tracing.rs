// self
use crate::{_prelude::*, obs::FlowKind, token::TokenRecord};

/// Future returned by [`FlowSpan::instrument`] when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`FlowSpan::instrument`]; the input future itself without tracing.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span wrapper shared by the acquisition loop and its exchanges; inert without `tracing`.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates the outer span covering one `get_token` call.
	pub fn acquire() -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("bearer_broker.acquire") }
		}
		#[cfg(not(feature = "tracing"))]
		{
			Self {}
		}
	}

	/// Creates the span covering one remote exchange.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("bearer_broker.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span on every poll of `fut` instead of holding a guard across awaits.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
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

pub(crate) fn log_gate_wait() {
	#[cfg(feature = "tracing")]
	tracing::debug!("Waiting for the in-flight token acquisition to finish.");
}

pub(crate) fn log_cache_hit(record: &TokenRecord, now: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::debug!(
		token = %record.token.fingerprint(),
		age_secs = (now - record.issued_at).whole_seconds(),
		remaining_secs = (record.token_expires_at - now).whole_seconds(),
		"Serving cached token."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (record, now);
}

pub(crate) fn log_acquired(kind: FlowKind, record: &TokenRecord, expires_in: u64) {
	#[cfg(feature = "tracing")]
	tracing::info!(
		flow = kind.as_str(),
		token = %record.token.fingerprint(),
		user_id = record.subject.user_id.as_deref().unwrap_or("-"),
		username = record.subject.username.as_deref().unwrap_or("-"),
		scopes = %record.subject.scopes.join(" "),
		expires_in,
		"Token fetched successfully."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, record, expires_in);
}

pub(crate) fn log_retry(kind: Option<FlowKind>, attempt: u32, delay: Duration, error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		flow = kind.map_or("-", FlowKind::as_str),
		attempt,
		delay_ms = delay.whole_milliseconds() as u64,
		error = %error,
		"Token acquisition failed; retrying."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, attempt, delay, error);
}

pub(crate) fn log_failure(kind: Option<FlowKind>, attempt: u32, error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::error!(
		flow = kind.map_or("-", FlowKind::as_str),
		attempt,
		error = %error,
		"Token acquisition failed."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, attempt, error);
}
