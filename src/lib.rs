pub mod config;
pub mod error;
pub mod leonardo;
pub mod utils;

pub use config::Config;
pub use error::{JobError, JobPhase, LeonardoError};
pub use leonardo::{FileCookieStore, LeonardoClient, MotionResult};
