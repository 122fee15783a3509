mod job;
mod leonardo;

pub use job::{JobError, JobPhase};
pub use leonardo::LeonardoError;
