pub mod engine;
pub mod error;
pub mod mapper;
pub mod models;
pub mod subscription;
pub mod ui;

pub use engine::{DashboardEngine, EngineConfig, OverlaySnapshot};
pub use error::TransportError;
pub use models::{
    ActivityBounds, ActivityMetadataEnvelope, BikeActivity, BoundingBox, ChannelEvent, FeedEvent,
    RawDocument, ResultRecord,
};
pub use subscription::SubscriptionChannel;

/// Name of the remote collection holding recorded activity documents.
pub const MEASUREMENTS_COLLECTION: &str = "measurements";
