use std::collections::BTreeMap;

use crate::models::ActivityMetadataEnvelope;

/// Derives the overlay id sequence and the per-overlay opacity map from
/// the current activity store and the user's allow-list filter.
///
/// Pure and deterministic: the same store state and filter always produce
/// the same pair. An empty filter means "show all"; a filtered-out id keeps
/// its overlay entry at opacity 0 — filtering hides, it does not remove.
pub fn project(
    store: &BTreeMap<String, ActivityMetadataEnvelope>,
    filter_ids: &[String],
    initial_opacity: f64,
) -> (Vec<String>, BTreeMap<String, f64>) {
    let mut overlay_ids = Vec::with_capacity(store.len());
    let mut opacities = BTreeMap::new();

    for uid in store.keys() {
        overlay_ids.push(uid.clone());

        let visible = filter_ids.is_empty() || filter_ids.iter().any(|id| id == uid);
        let opacity = if visible { initial_opacity } else { 0.0 };
        opacities.insert(uid.clone(), opacity);
    }

    (overlay_ids, opacities)
}
