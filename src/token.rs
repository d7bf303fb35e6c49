//! Token secrets, the cached token record, and the cache that owns it.

pub mod secret;

pub(crate) mod cache;
pub(crate) mod record;

pub use secret::*;

pub(crate) use cache::*;
pub(crate) use record::*;
