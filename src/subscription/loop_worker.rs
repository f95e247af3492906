use log::{error, info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::mapper::map_document;
use crate::models::{ChannelEvent, FeedEvent, ResultRecord};

/// Receives change batches from the remote feed, maps each one through the
/// record mapper and pushes the mapped batch as a single unit.
///
/// The loop terminates on cancellation, on feed close, or on the first
/// terminal error. A batch that entered the mapping stage is always pushed
/// (or dropped) whole; subscribers never observe a partial batch.
pub async fn subscription_loop(
    mut feed_rx: mpsc::Receiver<FeedEvent>,
    batch_tx: mpsc::Sender<ChannelEvent>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            event = feed_rx.recv() => {
                match event {
                    Some(FeedEvent::Changes(documents)) => {
                        let mut records: Vec<ResultRecord> = Vec::with_capacity(documents.len());
                        let mut corrupt = false;

                        for document in documents {
                            match map_document(document) {
                                Ok(record) => records.push(record),
                                Err(err) => {
                                    // A document without an id means the feed
                                    // itself is broken, not just one record.
                                    error!("change feed is corrupt: {err}");
                                    corrupt = true;
                                    break;
                                }
                            }
                        }

                        if corrupt {
                            let _ = batch_tx
                                .send(ChannelEvent::Error(
                                    crate::error::TransportError::MalformedFeed(
                                        "document change without identifier".to_string(),
                                    ),
                                ))
                                .await;
                            break;
                        }

                        if batch_tx.send(ChannelEvent::Batch(records)).await.is_err() {
                            warn!("batch subscriber dropped; stopping subscription loop");
                            break;
                        }
                    }
                    Some(FeedEvent::Error(err)) => {
                        error!("remote stream failed: {err}");
                        let _ = batch_tx.send(ChannelEvent::Error(err)).await;
                        break;
                    }
                    None => {
                        info!("remote change feed closed");
                        break;
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("subscription loop shutting down");
                break;
            }
        }
    }
}
