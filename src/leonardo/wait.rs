use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::LeonardoError;

/// Sleep for `duration` unless `cancel` fires first.
pub(crate) async fn sleep_or_cancel(
    duration: Duration,
    cancel: &CancellationToken,
) -> Result<(), LeonardoError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(LeonardoError::Cancelled),
        () = tokio::time::sleep(duration) => Ok(()),
    }
}
