use std::{future::Future, time::Duration};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("pending operation was cancelled")]
pub struct Cancelled;

/// Waits for `delay` unless `token` fires first.
pub async fn delay(delay: Duration, token: &CancellationToken) -> Result<(), Cancelled> {
    if delay.is_zero() {
        return if token.is_cancelled() { Err(Cancelled) } else { Ok(()) };
    }
    tokio::select! {
        _ = token.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

/// Runs `work` after `after` on a child of `parent`; cancelling the parent
/// before the delay elapses skips the work.
pub fn schedule<T, F, Fut>(parent: &CancellationToken, after: Duration, work: F) -> JoinHandle<Result<T, Cancelled>>
where
    T: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    let token = parent.child_token();
    tokio::spawn(async move {
        delay(after, &token).await?;
        Ok(work().await)
    })
}
