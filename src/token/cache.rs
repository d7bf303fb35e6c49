//! In-memory token cache owned by the acquisition loop.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	token::{TokenGrant, TokenRecord},
};

/// Cache state derived from the record and the current instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CacheState {
	/// Nothing has been acquired yet (or the last attempt cleared the record).
	NoToken,
	/// The cached token can be served as-is.
	TokenValid,
	/// The token expired but the refresh token can still renew it.
	TokenExpiredRefreshValid,
	/// Both the token and the refresh token expired.
	TokenExpiredNoRefresh,
}

/// Holds at most one [`TokenRecord`].
///
/// The cache performs no I/O. Callers must hold the single-flight gate while touching it.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
	record: Option<TokenRecord>,
}
impl TokenCache {
	pub(crate) fn is_token_valid(&self, now: OffsetDateTime) -> bool {
		self.record.as_ref().is_some_and(|record| record.is_token_valid_at(now))
	}

	pub(crate) fn is_refresh_valid(&self, now: OffsetDateTime) -> bool {
		self.record.as_ref().is_some_and(|record| record.is_refresh_valid_at(now))
	}

	pub(crate) fn state(&self, now: OffsetDateTime) -> CacheState {
		match &self.record {
			None => CacheState::NoToken,
			Some(_) if self.is_token_valid(now) => CacheState::TokenValid,
			Some(_) if self.is_refresh_valid(now) => CacheState::TokenExpiredRefreshValid,
			Some(_) => CacheState::TokenExpiredNoRefresh,
		}
	}

	pub(crate) fn record(&self) -> Option<&TokenRecord> {
		self.record.as_ref()
	}

	/// Replaces the record with one built from `grant`.
	///
	/// The previous record is left untouched when the grant's lifetimes are out of range.
	pub(crate) fn store(
		&mut self,
		grant: TokenGrant,
		now: OffsetDateTime,
	) -> Result<&TokenRecord, ConfigError> {
		let record = TokenRecord::from_grant(grant, now)?;

		Ok(self.record.insert(record))
	}

	/// Removes the record, handing it back to the caller.
	pub(crate) fn clear(&mut self) -> Option<TokenRecord> {
		self.record.take()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::token::{Secret, Subject};

	fn grant(token: &str, expires_in: u64, refresh_expires_in: u64) -> TokenGrant {
		TokenGrant {
			token: Secret::new(token),
			refresh_token: Secret::new(format!("{token}-refresh")),
			expires_in,
			refresh_expires_in,
			subject: Subject::default(),
		}
	}

	#[test]
	fn empty_cache_reports_no_token() {
		let now = datetime!(2025-03-01 12:00:00 UTC);
		let cache = TokenCache::default();

		assert_eq!(cache.state(now), CacheState::NoToken);
		assert!(!cache.is_token_valid(now));
		assert!(!cache.is_refresh_valid(now));
		assert!(cache.record().is_none());
	}

	#[test]
	fn state_follows_the_clock() {
		let now = datetime!(2025-03-01 12:00:00 UTC);
		let mut cache = TokenCache::default();

		cache.store(grant("first", 30, 60), now).expect("Grant should be stored.");

		assert_eq!(cache.state(now), CacheState::TokenValid);
		assert_eq!(cache.record().map(|record| record.token.expose()), Some("first"));
		assert_eq!(
			cache.state(now + Duration::seconds(30)),
			CacheState::TokenExpiredRefreshValid
		);
		assert_eq!(cache.state(now + Duration::seconds(60)), CacheState::TokenExpiredNoRefresh);
	}

	#[test]
	fn store_replaces_both_secrets_and_expiries() {
		let now = datetime!(2025-03-01 12:00:00 UTC);
		let later = now + Duration::seconds(45);
		let mut cache = TokenCache::default();

		cache.store(grant("first", 30, 60), now).expect("First grant should be stored.");
		cache.store(grant("second", 30, 60), later).expect("Second grant should be stored.");

		let record = cache.record().expect("Record should be present after storing.");

		assert_eq!(record.token.expose(), "second");
		assert_eq!(record.refresh_token.expose(), "second-refresh");
		assert_eq!(record.token_expires_at, later + Duration::seconds(30));
		assert_eq!(record.refresh_expires_at, later + Duration::seconds(60));
	}

	#[test]
	fn clear_hands_back_the_record() {
		let now = datetime!(2025-03-01 12:00:00 UTC);
		let mut cache = TokenCache::default();

		cache.store(grant("first", 30, 60), now).expect("Grant should be stored.");

		let previous = cache.clear().expect("Clearing should return the previous record.");

		assert_eq!(previous.refresh_token.expose(), "first-refresh");
		assert_eq!(cache.state(now), CacheState::NoToken);
		assert!(cache.clear().is_none());
	}

	#[test]
	fn out_of_range_grant_keeps_previous_record() {
		let now = datetime!(2025-03-01 12:00:00 UTC);
		let mut cache = TokenCache::default();

		cache.store(grant("first", 30, 60), now).expect("Grant should be stored.");

		assert!(cache.store(grant("broken", u64::MAX, 60), now).is_err());
		assert_eq!(cache.record().map(|record| record.token.expose()), Some("first"));
	}
}
