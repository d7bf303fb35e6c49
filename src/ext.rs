//! Extension contracts for consumers of broker-issued tokens.
//!
//! [`RequestSignerExt`] attaches a token to whatever request type the caller's HTTP client
//! uses; [`TokenBroker::authorize`](crate::flows::TokenBroker::authorize) acquires the token
//! first so a failed acquisition stops the outbound call before it is built.

pub mod request_signer;

pub use request_signer::*;
