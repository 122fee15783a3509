//! Motion job lifecycle: upload, submit, poll status, poll feed, resolve.

mod driver;
mod state;

pub(crate) use driver::JobDriver;
pub use driver::image_mime_type;
pub use state::{GenerationJob, MotionResult, PollOutcome};
