pub mod generation;
pub mod graphql;
pub mod queries;
pub mod session;
pub mod upload;
pub mod user;

pub use generation::{
    CreateMotionData, FeedData, FeedGeneration, GeneratedImage, GenerationState,
    GenerationStatus, MotionSvdGenerationJob, StatusData,
};
pub use graphql::{GraphqlError, GraphqlErrorEnvelope, GraphqlRequest, GraphqlResponse};
pub use session::{SessionDescriptor, SessionUser};
pub use upload::{CreateUploadData, UploadInitImage, UploadPolicyFields};
pub use user::{UserDetailsData, UserRecord};
