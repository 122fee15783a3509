use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Motion job configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Motion strength used when the caller passes none (or zero).
    /// TOML: `job.motion_strength`. Default: `5`.
    #[serde(default = "default_motion_strength")]
    pub motion_strength: u32,

    /// Interval between status-only polls.
    /// TOML: `job.status_poll_secs`. Default: `5`.
    #[serde(default = "default_poll_secs")]
    pub status_poll_secs: u64,

    /// Wait before the first feed poll.
    /// TOML: `job.feed_first_wait_secs`. Default: `1`.
    #[serde(default = "default_feed_first_wait_secs")]
    pub feed_first_wait_secs: u64,

    /// Interval between subsequent feed polls.
    /// TOML: `job.feed_poll_secs`. Default: `5`.
    #[serde(default = "default_poll_secs")]
    pub feed_poll_secs: u64,

    /// Page size of the feed query.
    /// TOML: `job.feed_limit`. Default: `10`.
    #[serde(default = "default_feed_limit")]
    pub feed_limit: u32,
}

#[derive(Debug, Clone)]
pub struct JobResolvedConfig {
    pub motion_strength: u32,
    pub status_poll: Duration,
    pub feed_first_wait: Duration,
    pub feed_poll: Duration,
    pub feed_limit: u32,
}

impl JobConfig {
    pub fn resolve(&self) -> JobResolvedConfig {
        JobResolvedConfig {
            motion_strength: if self.motion_strength == 0 {
                default_motion_strength()
            } else {
                self.motion_strength
            },
            status_poll: Duration::from_secs(self.status_poll_secs),
            feed_first_wait: Duration::from_secs(self.feed_first_wait_secs),
            feed_poll: Duration::from_secs(self.feed_poll_secs),
            feed_limit: self.feed_limit.max(1),
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            motion_strength: default_motion_strength(),
            status_poll_secs: default_poll_secs(),
            feed_first_wait_secs: default_feed_first_wait_secs(),
            feed_poll_secs: default_poll_secs(),
            feed_limit: default_feed_limit(),
        }
    }
}

impl Default for JobResolvedConfig {
    fn default() -> Self {
        JobConfig::default().resolve()
    }
}

fn default_motion_strength() -> u32 {
    5
}

fn default_poll_secs() -> u64 {
    5
}

fn default_feed_first_wait_secs() -> u64 {
    1
}

fn default_feed_limit() -> u32 {
    10
}
