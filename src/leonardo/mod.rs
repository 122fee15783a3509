//! Resilient Leonardo.ai web client: rate limiting, cookie-derived bearer
//! sessions, browser-profiled transport, bounded retries and the motion job
//! lifecycle.

mod client;
pub mod job;
pub mod multipart;
pub mod policy;
pub mod ratelimit;
pub mod retry;
pub mod session;
pub mod transport;
mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use client::LeonardoClient;
pub use job::{GenerationJob, MotionResult, PollOutcome};
pub use policy::{RetryAction, RetryPolicy};
pub use ratelimit::{RateLimiter, RatePermit};
pub use retry::{Authenticator, Reply, Retrier};
pub use session::{CookieStore, FileCookieStore, SessionManager};
pub use transport::{ApiRequest, Endpoints, HttpTransport, RequestBody, Transport};
