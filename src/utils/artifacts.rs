//! Debug artifacts: raw upstream bodies written to disk when a response fails
//! or has an unexpected shape. Purely diagnostic; write failures are logged
//! and otherwise ignored.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct DebugArtifacts {
    dir: Option<PathBuf>,
}

impl DebugArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Write `body` to `<dir>/debug_<YYYYMMDD_HHMMSS>.json`.
    pub async fn write(&self, body: &[u8]) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        let path = dir.join(format!("debug_{}.json", Utc::now().format("%Y%m%d_%H%M%S")));

        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!(dir = %dir.display(), error = %e, "Couldn't create debug artifact directory");
            return None;
        }
        match tokio::fs::write(&path, body).await {
            Ok(()) => {
                debug!(path = %path.display(), bytes = body.len(), "Wrote debug artifact");
                Some(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Couldn't write debug artifact");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_sink_writes_nothing() {
        assert!(DebugArtifacts::disabled().write(b"{}").await.is_none());
    }

    #[tokio::test]
    async fn writes_timestamped_file() {
        let dir = std::env::temp_dir().join(format!("leonai-artifacts-{}", std::process::id()));
        let sink = DebugArtifacts::new(&dir);

        let path = sink.write(br#"{"errors":[]}"#).await.expect("artifact written");
        let name = path.file_name().and_then(|n| n.to_str()).expect("file name");
        assert!(name.starts_with("debug_") && name.ends_with(".json"));
        assert_eq!(
            std::fs::read(&path).expect("read back"),
            br#"{"errors":[]}"#.to_vec()
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
