//! Retry backoff policy and the per-call attempt bookkeeping.

// crates.io
use rand::Rng;
// self
use crate::{_prelude::*, obs::FlowKind};

/// Exponential backoff bounded by a maximum number of attempts.
///
/// The delay after the `n`-th failed attempt is `initial_delay * multiplier^(n-1)`, capped at
/// `max_delay`, optionally spread by `jitter` (a fraction of the delay in `0.0..=1.0`).
/// `max_attempts` counts every attempt, including the first one.
#[derive(Clone, Debug, PartialEq)]
pub struct BackoffPolicy {
	/// Total attempts per `get_token` call.
	pub max_attempts: u32,
	/// Delay applied after the first failure.
	pub initial_delay: Duration,
	/// Growth factor applied per additional failure.
	pub multiplier: f64,
	/// Upper bound for a single delay.
	pub max_delay: Duration,
	/// Random spread applied to each delay; zero keeps delays deterministic.
	pub jitter: f64,
}
impl BackoffPolicy {
	/// Overrides the total number of attempts (at least one).
	pub fn with_max_attempts(mut self, attempts: u32) -> Self {
		self.max_attempts = attempts.max(1);

		self
	}

	/// Overrides the delay applied after the first failure.
	pub fn with_initial_delay(mut self, delay: Duration) -> Self {
		self.initial_delay = if delay.is_negative() { Duration::ZERO } else { delay };

		self
	}

	/// Overrides the growth factor (values below one are treated as one).
	pub fn with_multiplier(mut self, multiplier: f64) -> Self {
		self.multiplier = if multiplier.is_finite() { multiplier.max(1.) } else { 1. };

		self
	}

	/// Overrides the cap applied to each delay.
	pub fn with_max_delay(mut self, delay: Duration) -> Self {
		self.max_delay = if delay.is_negative() { Duration::ZERO } else { delay };

		self
	}

	/// Spreads each delay by up to `fraction` of its value in either direction.
	pub fn with_jitter(mut self, fraction: f64) -> Self {
		self.jitter = if fraction.is_finite() { fraction.clamp(0., 1.) } else { 0. };

		self
	}

	/// Returns `true` when another attempt may follow the `attempt`-th one.
	pub fn allows_retry_after(&self, attempt: u32) -> bool {
		attempt < self.max_attempts
	}

	/// Deterministic delay to wait after the `attempt`-th failure (1-based).
	pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
		let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);

		self.capped(self.initial_delay.as_seconds_f64() * self.multiplier.powi(exponent))
	}

	/// Delay after the `attempt`-th failure with jitter applied, never above `max_delay`.
	pub fn jittered_delay_for_attempt(&self, attempt: u32) -> Duration {
		let delay = self.delay_for_attempt(attempt);

		if self.jitter <= 0. || delay.is_zero() {
			return delay;
		}

		let factor = rand::rng().random_range((1. - self.jitter)..=(1. + self.jitter));

		self.capped(delay.as_seconds_f64() * factor)
	}

	fn capped(&self, secs: f64) -> Duration {
		if !secs.is_finite() || secs >= self.max_delay.as_seconds_f64() {
			return self.max_delay;
		}

		Duration::seconds_f64(secs.max(0.))
	}
}
impl Default for BackoffPolicy {
	/// Three attempts, waiting 1s and then 2s, each delay capped at 30s, no jitter.
	fn default() -> Self {
		Self {
			max_attempts: 3,
			initial_delay: Duration::SECOND,
			multiplier: 2.,
			max_delay: Duration::seconds(30),
			jitter: 0.,
		}
	}
}

/// Bookkeeping for one `get_token` call across its retries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttemptContext {
	/// Attempts started so far (1-based once the first attempt begins).
	pub attempt: u32,
	/// Remote exchange performed by the current attempt, if any.
	pub flow: Option<FlowKind>,
	/// Total backoff waited so far.
	pub elapsed_backoff: Duration,
}
impl AttemptContext {
	/// Starts the next attempt.
	pub fn begin(&mut self) {
		self.attempt += 1;
		self.flow = None;
	}

	/// Consumes one unit of backoff after a retryable failure.
	///
	/// Returns `None` once the policy's attempt budget is spent.
	pub fn next_delay(&mut self, policy: &BackoffPolicy) -> Option<Duration> {
		if !policy.allows_retry_after(self.attempt) {
			return None;
		}

		let delay = policy.jittered_delay_for_attempt(self.attempt);

		self.elapsed_backoff += delay;

		Some(delay)
	}
}
