//! Resilient request layer for the n8n REST API.
//!
//! - [`classifier`]: failure → [`ErrorKind`] + retry verdict
//! - [`retry`]: backoff scheduling
//! - [`executor`]: runs an [`Operation`] until success or abort
//! - [`transport`]: one HTTP exchange (`reqwest`)

pub mod classifier;
pub mod executor;
pub mod retry;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use classifier::{classify, classify_status, ErrorKind, ErrorVerdict, Failure};
pub use executor::RequestExecutor;
pub use retry::{AttemptState, RetryDecision, RetryPolicy};
pub use transport::{Operation, RawResponse, ReqwestTransport, Transport, TransportError};
