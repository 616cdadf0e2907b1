//! Timeout and cancellation wrapper for blocking protocol steps.

use std::{future::Future, time::Duration};

use tokio::sync::watch;

use crate::error::{HandshakeError, Stage, StageError};

/// Run one protocol step under the configured timeout and the cancellation
/// signal.
///
/// Resolution order when multiple events race is cancellation, then
/// timeout, then the step result; a cancelled handshake reports
/// [`HandshakeError::Cancelled`] even if the step would also have timed
/// out.
pub(crate) async fn guarded<T, F>(
    stage: Stage,
    timeout: Duration,
    cancel: &mut watch::Receiver<bool>,
    step: F,
) -> Result<T, HandshakeError>
where
    F: Future<Output = Result<T, StageError>>,
{
    tokio::select! {
        biased;

        () = cancelled(cancel) => Err(HandshakeError::Cancelled { stage }),

        outcome = tokio::time::timeout(timeout, step) => match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(HandshakeError::Failed { stage, source }),
            Err(_) => Err(HandshakeError::Timeout { stage, elapsed: timeout }),
        },
    }
}

/// Resolve when the cancellation signal fires.
///
/// A dropped sender means the caller cannot cancel anymore; the handshake
/// then runs to completion under its timeouts alone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
