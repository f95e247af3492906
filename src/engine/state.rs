use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::models::{ActivityMetadataEnvelope, BoundingBox, ResultRecord};

use super::projector::project;

/// Opacity of the focused overlay.
pub const FOCUS_OPACITY: f64 = 100.0;

/// A non-focused overlay is dimmed to this fraction of the initial opacity.
const DIM_DIVISOR: f64 = 5.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EnginePhase {
    Idle,
    Subscribed,
    Cancelled,
}

impl Default for EnginePhase {
    fn default() -> Self {
        EnginePhase::Idle
    }
}

/// Immutable per-update view of the derived visual state.
///
/// Every mutation of the engine state publishes a freshly built snapshot,
/// so consumers can rely on reference identity for change detection and
/// safely hold on to older snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySnapshot {
    pub overlay_ids: Vec<String>,
    pub opacities: BTreeMap<String, f64>,
    pub fly_to: Option<BoundingBox>,
}

#[derive(Debug, Clone, Default)]
pub struct EngineState {
    pub phase: EnginePhase,
    /// id -> envelope; grows monotonically for the session, last write wins.
    pub activities: BTreeMap<String, ActivityMetadataEnvelope>,
    /// Allow-list of activity ids; empty means no filtering.
    pub filter_ids: Vec<String>,
    pub overlay_ids: Vec<String>,
    pub opacities: BTreeMap<String, f64>,
    pub fly_to: Option<BoundingBox>,
    pub transport_error: Option<TransportError>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_subscription(&mut self) {
        self.phase = EnginePhase::Subscribed;
    }

    /// Freezes the engine. The store is retained but no mutation is
    /// accepted afterwards.
    pub fn cancel(&mut self) {
        self.phase = EnginePhase::Cancelled;
    }

    /// Applies one mapped batch in sequence order, then re-projects once.
    ///
    /// A record whose payload fails to decode is skipped and reported; the
    /// rest of the batch still lands. The remote document id overwrites any
    /// uid embedded in the payload.
    pub fn ingest(&mut self, batch: Vec<ResultRecord>, initial_opacity: f64) {
        for record in batch {
            let mut envelope: ActivityMetadataEnvelope =
                match serde_json::from_value(record.payload) {
                    Ok(envelope) => envelope,
                    Err(err) => {
                        warn!("skipping undecodable activity {}: {err}", record.id);
                        continue;
                    }
                };

            envelope.bike_activity.uid = record.id.clone();
            self.activities.insert(record.id, envelope);
        }

        self.reproject(initial_opacity);
    }

    pub fn set_filter(&mut self, filter_ids: Vec<String>, initial_opacity: f64) {
        self.filter_ids = filter_ids;
        self.reproject(initial_opacity);
    }

    fn reproject(&mut self, initial_opacity: f64) {
        let (overlay_ids, opacities) =
            project(&self.activities, &self.filter_ids, initial_opacity);
        self.overlay_ids = overlay_ids;
        self.opacities = opacities;
    }

    /// Focuses one activity: frames its bounds, dims everything else and
    /// highlights the selection. Unknown ids are a no-op, since the UI may
    /// race a click against store changes.
    ///
    /// Focus does not re-project, so filter membership stays as it was; a
    /// currently-hidden id can still be focused and is raised to full
    /// opacity until the next re-projection.
    pub fn focus(&mut self, uid: &str, initial_opacity: f64) -> Option<BoundingBox> {
        let envelope = self.activities.get(uid)?;
        let bbox = BoundingBox::from(envelope.bike_activity_bounds);

        for opacity in self.opacities.values_mut() {
            *opacity = initial_opacity / DIM_DIVISOR;
        }
        self.opacities.insert(uid.to_string(), FOCUS_OPACITY);
        self.fly_to = Some(bbox);

        Some(bbox)
    }

    pub fn record_transport_error(&mut self, error: TransportError) {
        self.transport_error = Some(error);
    }

    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            overlay_ids: self.overlay_ids.clone(),
            opacities: self.opacities.clone(),
            fly_to: self.fly_to,
        }
    }
}
