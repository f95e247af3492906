use anyhow::Result;
use log::info;
use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

use velomap::models::{place_by_name, RawDocument};
use velomap::ui::format::{date_long, date_short};
use velomap::{DashboardEngine, EngineConfig, FeedEvent, MEASUREMENTS_COLLECTION};

/// Builds one activity document anchored at a named place.
fn activity_document(place_name: &str, start: i64, end: i64) -> RawDocument {
    let place = place_by_name(place_name).expect("unknown place");

    RawDocument {
        id: Uuid::new_v4().to_string(),
        data: json!({
            "bikeActivity": {
                "startTime": { "epochSecond": start },
                "endTime": { "epochSecond": end }
            },
            "bikeActivityBounds": {
                "lonWest": place.lon - 0.05,
                "lonEast": place.lon + 0.05,
                "latNorth": place.lat + 0.03,
                "latSouth": place.lat - 0.03
            }
        }),
    }
}

/// Runs the engine against an in-memory change feed, standing in for the
/// remote document store.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("velomap starting up, collection '{MEASUREMENTS_COLLECTION}'");

    let engine = DashboardEngine::new(EngineConfig::default());
    let mut snapshots = engine.subscribe();
    let (feed_tx, feed_rx) = mpsc::channel(32);

    engine.start(feed_rx).await?;

    feed_tx
        .send(FeedEvent::Changes(vec![
            activity_document("Brandenburger Tor", 1633092000, 1633095600),
            activity_document("Canico", 1633178400, 1633180200),
        ]))
        .await?;

    snapshots.changed().await?;
    let snapshot = snapshots.borrow_and_update().clone();
    for uid in &snapshot.overlay_ids {
        info!(
            "overlay {uid} at opacity {}",
            snapshot.opacities.get(uid).copied().unwrap_or_default()
        );
    }

    if let Some(first) = snapshot.overlay_ids.first().cloned() {
        engine.on_activity_selected(&first).await;
        let focused = engine.snapshot().await;
        if let Some(bbox) = focused.fly_to {
            info!("flying to {:?} for {first}", bbox.to_lnglat_array());
        }
    }

    info!(
        "first ride: {} - {}",
        date_long(1633092000),
        date_short(1633095600)
    );

    engine.cancel().await?;
    info!("velomap shut down");
    Ok(())
}
