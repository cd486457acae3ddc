//! Cancellable waits between attempts.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The wait was interrupted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitCancelled;

/// Sleep for `delay` unless `cancel` fires first.
///
/// A token that is already cancelled returns immediately, even for a zero delay.
pub async fn cancellable_sleep(
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<(), WaitCancelled> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(WaitCancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
