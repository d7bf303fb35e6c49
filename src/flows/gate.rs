// crates.io
use async_lock::MutexGuard;
// self
use crate::{_prelude::*, obs};

/// Admits one task at a time into the state it guards.
///
/// Waiters are not handed the holder's result; each one runs its own check once admitted.
#[derive(Debug, Default)]
pub(crate) struct FlightGate<T> {
	state: AsyncMutex<T>,
}
impl<T> FlightGate<T> {
	pub(crate) async fn admit(&self) -> MutexGuard<'_, T> {
		if let Some(guard) = self.state.try_lock() {
			return guard;
		}

		obs::log_gate_wait();

		self.state.lock().await
	}
}
