use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::artifacts::DebugArtifacts;

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default)]
    pub loglevel: String,

    /// File holding the browser session cookie header (`name=value; name2=value2`).
    /// Rewritten on shutdown with the rotated cookies.
    /// TOML: `basic.cookie_path`. Default: `cookie.txt`.
    #[serde(default)]
    pub cookie_path: PathBuf,

    /// Directory for raw failure bodies (`debug_<timestamp>.json`). Empty disables them.
    /// TOML: `basic.logs_dir`. Default: `logs`.
    #[serde(default)]
    pub logs_dir: PathBuf,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            cookie_path: PathBuf::from("cookie.txt"),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl BasicConfig {
    pub fn debug_artifacts(&self) -> DebugArtifacts {
        if self.logs_dir.as_os_str().is_empty() {
            DebugArtifacts::disabled()
        } else {
            DebugArtifacts::new(self.logs_dir.clone())
        }
    }
}
