//! Subscription to wallet notifications.

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use crate::domain::ProviderEvent;

/// Live subscription to `accountsChanged` / `chainChanged`. Dropping it
/// unsubscribes.
pub struct EventSubscription {
    receiver: broadcast::Receiver<ProviderEvent>,
}

impl EventSubscription {
    #[must_use]
    pub fn new(receiver: broadcast::Receiver<ProviderEvent>) -> Self {
        Self { receiver }
    }

    /// Next notification, or `None` once the wallet side has gone away.
    /// Notifications missed while lagging are skipped; only the newest
    /// state matters to the widget.
    pub async fn next(&mut self) -> Option<ProviderEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Wallet event subscription lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
