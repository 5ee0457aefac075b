//! Small helpers shared by the loader and the CLI.

use tokio::sync::mpsc;

/// Send a value through a channel, logging a warning if the receiver is gone.
///
/// A superseded load keeps running after the driver dropped its receiver;
/// its sends fail here and are only logged.
pub async fn send_or_log<T>(tx: &mpsc::Sender<T>, value: T, context: &str) {
    if let Err(e) = tx.send(value).await {
        tracing::warn!("Failed to send {}: {}", context, e);
    }
}

/// Cut `text` to at most `max` characters, marking the cut with `…`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
