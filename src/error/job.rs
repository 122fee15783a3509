use std::fmt;
use thiserror::Error as ThisError;

use super::LeonardoError;

/// Lifecycle phase a job failure surfaced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Uploading,
    Submitting,
    PollingStatus,
    PollingFeed,
    Resolving,
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobPhase::Uploading => "upload",
            JobPhase::Submitting => "submission",
            JobPhase::PollingStatus => "status polling",
            JobPhase::PollingFeed => "feed polling",
            JobPhase::Resolving => "result resolution",
        })
    }
}

/// Terminal failure of a single motion job.
///
/// Once the backend has accepted the job, `generation_id` is always set so the
/// generation can be inspected manually.
#[derive(Debug, ThisError)]
#[error("Motion job {phase} failed{}: {source}", generation_suffix(.generation_id.as_deref()))]
pub struct JobError {
    pub phase: JobPhase,
    pub generation_id: Option<String>,
    /// Raw body of the last poll response, if any.
    pub last_response: Option<String>,
    #[source]
    pub source: LeonardoError,
}

fn generation_suffix(generation_id: Option<&str>) -> String {
    generation_id
        .map(|id| format!(" (generation {id})"))
        .unwrap_or_default()
}

impl JobError {
    pub fn new(phase: JobPhase, source: LeonardoError) -> Self {
        Self {
            phase,
            generation_id: None,
            last_response: None,
            source,
        }
    }

    pub fn with_generation(mut self, generation_id: &str) -> Self {
        self.generation_id = Some(generation_id.to_string());
        self
    }

    pub fn with_last_response(mut self, raw: Option<&[u8]>) -> Self {
        self.last_response = raw.map(|b| String::from_utf8_lossy(b).into_owned());
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }
}
