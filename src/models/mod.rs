pub mod activity;
pub mod bounding_box;
pub mod document;
pub mod place;

pub use activity::{ActivityBounds, ActivityMetadataEnvelope, ActivityTime, BikeActivity};
pub use bounding_box::BoundingBox;
pub use document::{ChannelEvent, FeedEvent, RawDocument, ResultRecord};
pub use place::{place_by_name, Place, NAMED_PLACES};
