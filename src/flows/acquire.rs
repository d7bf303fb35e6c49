// self
use crate::{
	_prelude::*,
	backoff::AttemptContext,
	classify::Disposition,
	flows::{TokenBroker, common::Failure},
	http::{AuthHttpClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::{CacheState, Secret},
};

impl<C, M> TokenBroker<C, M>
where
	C: ?Sized + AuthHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns a token that is valid at the time of the call.
	///
	/// Serves the cached token while it is valid, renews it through the refresh endpoint
	/// while the refresh token is valid, and authenticates with the configured credentials
	/// otherwise. Retryable failures are retried according to [`TokenBroker::backoff`];
	/// once the attempt budget is spent the last failure is returned inside
	/// [`Error::RetriesExhausted`].
	pub async fn get_token(&self) -> Result<Secret> {
		FlowSpan::acquire().instrument(self.acquire_with_retries()).await
	}

	async fn acquire_with_retries(&self) -> Result<Secret> {
		let mut ctx = AttemptContext::default();

		loop {
			ctx.begin();

			let Failure { error, disposition } = match self.acquire_once(&mut ctx).await {
				Ok(token) => return Ok(token),
				Err(failure) => failure,
			};
			let error = match disposition {
				Disposition::Retryable => match ctx.next_delay(&self.backoff) {
					Some(delay) => {
						obs::log_retry(ctx.flow, ctx.attempt, delay, &error);
						obs::record_flow_outcome(ctx.flow, FlowOutcome::Retry);
						self.metrics.record_retry();
						self.sleeper.sleep(delay).await;

						continue;
					},
					None => Error::RetriesExhausted { attempts: ctx.attempt, last: Box::new(error) },
				},
				Disposition::Fatal => error,
			};

			obs::log_failure(ctx.flow, ctx.attempt, &error);
			obs::record_flow_outcome(ctx.flow, FlowOutcome::Failure);
			self.metrics.record_failure();

			return Err(error);
		}
	}

	/// Runs one pass of the decision sequence while holding the gate.
	async fn acquire_once(&self, ctx: &mut AttemptContext) -> Result<Secret, Failure> {
		let mut cache = self.gate.admit().await;
		let now = self.clock.now();
		let state = cache.state(now);

		if let (CacheState::TokenValid, Some(record)) = (state, cache.record()) {
			obs::log_cache_hit(record, now);
			obs::record_flow_outcome(None, FlowOutcome::CacheHit);
			self.metrics.record_cache_hit();

			return Ok(record.token.clone());
		}

		// The record is dropped before any exchange; a failed attempt never leaves it behind.
		let previous = cache.clear();

		match (state, previous) {
			(CacheState::TokenExpiredRefreshValid, Some(record)) => {
				ctx.flow = Some(FlowKind::Refresh);

				self.refresh(&mut cache, record.refresh_token).await
			},
			_ => {
				ctx.flow = Some(FlowKind::Authenticate);

				self.authenticate(&mut cache).await
			},
		}
	}
}
