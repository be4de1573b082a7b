use std::time::Duration;
use tokio::sync::mpsc;

/// Wait for the next burst of events.
///
/// Blocks until one event arrives, then keeps collecting until `quiet`
/// passes without a new one. Returns `None` once the channel is closed and
/// drained.
pub async fn next_batch<T>(rx: &mut mpsc::UnboundedReceiver<T>, quiet: Duration) -> Option<Vec<T>> {
    let first = rx.recv().await?;
    let mut batch = vec![first];

    loop {
        match tokio::time::timeout(quiet, rx.recv()).await {
            Ok(Some(event)) => batch.push(event),
            // Closed or quiet period elapsed
            Ok(None) | Err(_) => break,
        }
    }

    Some(batch)
}
