use serde::Deserialize;
use serde_json::Value;
use std::{collections::BTreeMap, fmt};

use crate::graphql::null_as_default;

/// Backend generation status.
///
/// Anything other than `PENDING` is terminal; only `COMPLETE` is success.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum GenerationState {
    #[default]
    Pending,
    Complete,
    Failed,
    Other(String),
}

impl From<String> for GenerationState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "PENDING" => Self::Pending,
            "COMPLETE" => Self::Complete,
            "FAILED" => Self::Failed,
            _ => Self::Other(raw),
        }
    }
}

impl GenerationState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMotionData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub motion_svd_generation_job: MotionSvdGenerationJob,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotionSvdGenerationJob {
    pub api_credit_cost: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub generation_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub generations: Vec<GenerationStatus>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct GenerationStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: GenerationState,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub generations: Vec<FeedGeneration>,
}

/// Feed entry. Only the fields the job state machine reads are typed; the rest
/// is kept verbatim for diagnostics.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct FeedGeneration {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: GenerationState,

    #[serde(default, deserialize_with = "null_as_default")]
    pub generated_images: Vec<GeneratedImage>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct GeneratedImage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default, rename = "motionMP4URL")]
    pub motion_mp4_url: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
