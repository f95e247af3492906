use thiserror::Error;

/// Terminal failures of the remote document stream.
///
/// These are the only errors that cross the engine boundary; everything
/// else (decode failures, stale UI actions) is absorbed internally. The
/// engine never retries — reconnection policy belongs to whoever owns the
/// connection lifecycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("remote stream disconnected: {0}")]
    Disconnected(String),
    #[error("remote store denied access: {0}")]
    PermissionDenied(String),
    #[error("malformed change feed: {0}")]
    MalformedFeed(String),
}
