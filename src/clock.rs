//! Time sources and sleepers used by the acquisition loop.
//!
//! Expiry checks read the current instant through [`Clock`] and retry delays go through
//! [`Sleeper`], so tests can move time forward and observe backoff without waiting.

// self
use crate::_prelude::*;

/// Boxed future returned by [`Sleeper::sleep`].
pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Supplies the current instant.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current UTC instant.
	fn now(&self) -> OffsetDateTime;
}

/// Suspends the caller between retry attempts.
pub trait Sleeper
where
	Self: Send + Sync,
{
	/// Completes once `delay` has elapsed.
	fn sleep(&self, delay: Duration) -> SleepFuture<'_>;
}

/// Wall clock backed by [`OffsetDateTime::now_utc`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle while the broker owns
/// another.
#[derive(Clone, Debug)]
pub struct ManualClock(Arc<Mutex<OffsetDateTime>>);
impl ManualClock {
	/// Creates a clock frozen at `instant`.
	pub fn new(instant: OffsetDateTime) -> Self {
		Self(Arc::new(Mutex::new(instant)))
	}

	/// Moves the clock forward.
	///
	/// The clock stays put when the result would leave the representable range.
	pub fn advance(&self, by: Duration) {
		let mut now = self.0.lock();

		if let Some(next) = now.checked_add(by) {
			*now = next;
		}
	}

	/// Moves the clock backward.
	///
	/// The clock stays put when the result would leave the representable range.
	pub fn rewind(&self, by: Duration) {
		let mut now = self.0.lock();

		if let Some(next) = now.checked_sub(by) {
			*now = next;
		}
	}

	/// Jumps to `instant`.
	pub fn set(&self, instant: OffsetDateTime) {
		*self.0.lock() = instant;
	}
}
impl Default for ManualClock {
	fn default() -> Self {
		Self::new(OffsetDateTime::UNIX_EPOCH)
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}

/// [`Sleeper`] backed by the tokio timer.
#[cfg(feature = "tokio")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;
#[cfg(feature = "tokio")]
impl Sleeper for TokioSleeper {
	fn sleep(&self, delay: Duration) -> SleepFuture<'_> {
		let delay = std::time::Duration::try_from(delay).unwrap_or_default();

		Box::pin(tokio::time::sleep(delay))
	}
}
