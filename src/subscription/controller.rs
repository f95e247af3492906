use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::{ChannelEvent, FeedEvent};

use super::loop_worker::subscription_loop;

/// Wraps a live query against the remote store and pushes mapped batches
/// to a single subscriber.
///
/// One channel instance serves one subscription: after `cancel()` the
/// instance is spent and a fresh cancel/restart cycle needs a new one.
pub struct SubscriptionChannel {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SubscriptionChannel {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    /// Begins listening on the remote change feed. Every incoming batch is
    /// mapped through the record mapper and pushed on `batch_tx` as one
    /// unit. Errors if the channel was already started.
    pub fn start(
        &mut self,
        feed_rx: mpsc::Receiver<FeedEvent>,
        batch_tx: mpsc::Sender<ChannelEvent>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("subscription already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(subscription_loop(feed_rx, batch_tx, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Releases the remote listener. Idempotent, and safe to call before
    /// `start()`. When this returns, no further push can occur.
    pub async fn cancel(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("subscription loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for SubscriptionChannel {
    fn default() -> Self {
        Self::new()
    }
}
