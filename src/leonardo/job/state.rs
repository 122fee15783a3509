//! Pure poll steps: `(job, response) -> continue | done | error`.
//!
//! Status only ever changes by applying a backend response; nothing here
//! transitions a job locally.

use leonai_schema::{FeedData, FeedGeneration, GenerationState, StatusData};

use crate::error::LeonardoError;

/// Result of applying one poll response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Continue,
    Done(T),
}

/// Final artifact of a motion generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionResult {
    pub asset_id: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct GenerationJob {
    generation_id: String,
    status: GenerationState,
    result: Option<MotionResult>,
}

impl GenerationJob {
    pub fn new(generation_id: impl Into<String>) -> Self {
        Self {
            generation_id: generation_id.into(),
            status: GenerationState::Pending,
            result: None,
        }
    }

    pub fn generation_id(&self) -> &str {
        &self.generation_id
    }

    pub fn status(&self) -> &GenerationState {
        &self.status
    }

    pub fn result(&self) -> Option<&MotionResult> {
        self.result.as_ref()
    }

    /// Status phase. No entry for this generation means keep waiting; a
    /// `COMPLETE` entry ends the phase; any other status is terminal.
    pub fn apply_status(&mut self, data: &StatusData) -> Result<PollOutcome<()>, LeonardoError> {
        let Some(entry) = data
            .generations
            .iter()
            .find(|g| g.id == self.generation_id)
        else {
            return Ok(PollOutcome::Continue);
        };

        self.status = entry.status.clone();
        match &self.status {
            GenerationState::Complete => Ok(PollOutcome::Done(())),
            other => Err(LeonardoError::GenerationFailed {
                status: other.clone(),
            }),
        }
    }

    /// Feed phase. Returns the matched entry once it is `COMPLETE`.
    pub fn apply_feed(
        &mut self,
        data: &FeedData,
    ) -> Result<PollOutcome<FeedGeneration>, LeonardoError> {
        if data.generations.is_empty() {
            return Err(LeonardoError::NoGenerations);
        }
        let entry = data
            .generations
            .iter()
            .find(|g| g.id == self.generation_id)
            .ok_or_else(|| LeonardoError::GenerationNotFound(self.generation_id.clone()))?;

        self.status = entry.status.clone();
        match &self.status {
            GenerationState::Pending => Ok(PollOutcome::Continue),
            GenerationState::Complete => Ok(PollOutcome::Done(entry.clone())),
            other => Err(LeonardoError::GenerationFailed {
                status: other.clone(),
            }),
        }
    }

    /// Pick the playable video out of a completed feed entry.
    pub fn resolve(&mut self, entry: &FeedGeneration) -> Result<MotionResult, LeonardoError> {
        let image = entry
            .generated_images
            .first()
            .ok_or(LeonardoError::MissingField("generated_images"))?;
        let url = image
            .motion_mp4_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(LeonardoError::MissingField("motionMP4URL"))?;
        if image.id.is_empty() {
            return Err(LeonardoError::MissingField("generated_images.id"));
        }

        let result = MotionResult {
            asset_id: image.id.clone(),
            url: url.to_string(),
        };
        self.result = Some(result.clone());
        Ok(result)
    }
}
