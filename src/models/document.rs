use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// One changed document as delivered by the remote change feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    pub id: String,
    pub data: Value,
}

/// One mapped remote record: remote identifier plus its opaque payload.
///
/// Immutable once constructed; the id is guaranteed non-empty by the
/// record mapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub id: String,
    pub payload: Value,
}

/// Events emitted by the remote store's live query.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A batch of document changes, in remote order.
    Changes(Vec<RawDocument>),
    /// Terminal transport failure; no further changes follow.
    Error(TransportError),
}

/// Events pushed by the subscription channel to its subscribers.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// One fully mapped batch, pushed as a unit.
    Batch(Vec<ResultRecord>),
    /// Terminal error; the channel stops after sending this.
    Error(TransportError),
}
