//! Bearer token acquisition and caching for outbound service calls.
//!
//! [`flows::TokenBroker`] serves a cached token while it is valid, renews it with the refresh
//! endpoint, and falls back to username/password authentication, retrying classified
//! failures with exponential backoff. Concurrent callers are serialized so at most one
//! exchange with the authentication server is in flight.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod backoff;
pub mod classify;
pub mod clock;
pub mod config;
pub mod error;
pub mod ext;
pub mod flows;
pub mod http;
pub mod obs;
pub mod token;

mod wire;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
