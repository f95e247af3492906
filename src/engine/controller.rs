use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{error, info};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::error::TransportError;
use crate::models::{ChannelEvent, FeedEvent};
use crate::subscription::SubscriptionChannel;

use super::config::EngineConfig;
use super::state::{EnginePhase, EngineState, OverlaySnapshot};

/// Reactive state-synchronization engine behind the map dashboard.
///
/// Owns the activity store and the derived visual state, feeds the store
/// from a subscription channel and publishes immutable `OverlaySnapshot`
/// values on a watch channel. One instance serves one session: after
/// `cancel()` the engine is frozen and a new session needs a new instance.
#[derive(Clone)]
pub struct DashboardEngine {
    state: Arc<Mutex<EngineState>>,
    config: EngineConfig,
    channel: Arc<Mutex<SubscriptionChannel>>,
    ingest_worker: Arc<Mutex<Option<JoinHandle<()>>>>,
    snapshot_tx: Arc<watch::Sender<OverlaySnapshot>>,
}

impl DashboardEngine {
    pub fn new(config: EngineConfig) -> Self {
        let (snapshot_tx, _snapshot_rx) = watch::channel(OverlaySnapshot::default());

        Self {
            state: Arc::new(Mutex::new(EngineState::new())),
            config,
            channel: Arc::new(Mutex::new(SubscriptionChannel::new())),
            ingest_worker: Arc::new(Mutex::new(None)),
            snapshot_tx: Arc::new(snapshot_tx),
        }
    }

    /// Begins synchronizing from the given remote change feed.
    pub async fn start(&self, feed_rx: mpsc::Receiver<FeedEvent>) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            match state.phase {
                EnginePhase::Idle => state.begin_subscription(),
                EnginePhase::Subscribed => bail!("engine already subscribed"),
                EnginePhase::Cancelled => {
                    bail!("engine is cancelled; a new session needs a new engine")
                }
            }
        }

        let (batch_tx, batch_rx) = mpsc::channel(self.config.batch_buffer);
        self.channel.lock().await.start(feed_rx, batch_tx)?;
        self.spawn_ingest_worker(batch_rx).await;

        info!("dashboard engine subscribed");
        Ok(())
    }

    /// Tears down the subscription. Idempotent; when this returns, no
    /// further snapshot is published and later calls are no-ops. A batch
    /// already under ingestion completes first; batches still queued behind
    /// it are discarded whole.
    pub async fn cancel(&self) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if state.phase == EnginePhase::Cancelled {
                return Ok(());
            }
            state.cancel();
        }

        self.channel.lock().await.cancel().await?;

        if let Some(handle) = self.ingest_worker.lock().await.take() {
            handle
                .await
                .context("ingest worker task failed to join")?;
        }

        let activity_count = self.state.lock().await.activities.len();
        info!("dashboard engine cancelled; store frozen with {activity_count} activities");
        Ok(())
    }

    /// Handles a user click on an activity: frames its bounds and shifts
    /// the opacity distribution to highlight it. Unknown ids and clicks
    /// arriving after teardown are silently ignored.
    pub async fn on_activity_selected(&self, uid: &str) {
        let mut state = self.state.lock().await;
        if state.phase == EnginePhase::Cancelled {
            return;
        }

        if state.focus(uid, self.config.initial_opacity).is_some() {
            self.snapshot_tx.send_replace(state.snapshot());
        }
    }

    /// Replaces the allow-list filter and re-projects. An empty list shows
    /// every activity.
    pub async fn on_filter_changed(&self, filter_ids: Vec<String>) {
        let mut state = self.state.lock().await;
        if state.phase == EnginePhase::Cancelled {
            return;
        }

        state.set_filter(filter_ids, self.config.initial_opacity);
        self.snapshot_tx.send_replace(state.snapshot());
    }

    /// Subscribes to derived-state updates. Each update carries a freshly
    /// built snapshot value.
    pub fn subscribe(&self) -> watch::Receiver<OverlaySnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub async fn snapshot(&self) -> OverlaySnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn phase(&self) -> EnginePhase {
        self.state.lock().await.phase
    }

    /// Terminal failure of the remote stream, if one occurred. The engine
    /// never retries on its own.
    pub async fn transport_error(&self) -> Option<TransportError> {
        self.state.lock().await.transport_error.clone()
    }

    async fn spawn_ingest_worker(&self, mut batch_rx: mpsc::Receiver<ChannelEvent>) {
        let mut worker_guard = self.ingest_worker.lock().await;
        if let Some(handle) = worker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let snapshot_tx = self.snapshot_tx.clone();
        let initial_opacity = self.config.initial_opacity;

        let handle = tokio::spawn(async move {
            while let Some(event) = batch_rx.recv().await {
                match event {
                    ChannelEvent::Batch(records) => {
                        let mut guard = state.lock().await;
                        if guard.phase != EnginePhase::Subscribed {
                            // Batch raced teardown; drop it whole.
                            continue;
                        }

                        guard.ingest(records, initial_opacity);
                        snapshot_tx.send_replace(guard.snapshot());
                    }
                    ChannelEvent::Error(err) => {
                        error!("remote subscription failed: {err}");
                        state.lock().await.record_transport_error(err);
                        break;
                    }
                }
            }
        });

        *worker_guard = Some(handle);
    }
}

impl Default for DashboardEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawDocument;
    use serde_json::json;
    use tokio::time::{sleep, Duration};

    fn document(id: &str, lon_west: f64, lon_east: f64, lat_north: f64, lat_south: f64) -> RawDocument {
        RawDocument {
            id: id.to_string(),
            data: json!({
                "bikeActivity": {
                    "startTime": { "epochSecond": 1633024800 },
                    "endTime": { "epochSecond": 1633028400 }
                },
                "bikeActivityBounds": {
                    "lonWest": lon_west,
                    "lonEast": lon_east,
                    "latNorth": lat_north,
                    "latSouth": lat_south
                }
            }),
        }
    }

    #[tokio::test]
    async fn ingest_focus_reingest_scenario() {
        let engine = DashboardEngine::new(EngineConfig::default());
        let mut snapshots = engine.subscribe();
        let (feed_tx, feed_rx) = mpsc::channel(8);

        engine.start(feed_rx).await.unwrap();

        feed_tx
            .send(FeedEvent::Changes(vec![document("a", -1.0, 1.0, 2.0, -2.0)]))
            .await
            .unwrap();
        snapshots.changed().await.unwrap();
        let snap = snapshots.borrow_and_update().clone();
        assert_eq!(snap.overlay_ids, vec!["a"]);
        assert_eq!(snap.opacities["a"], 25.0);
        assert!(snap.fly_to.is_none());

        engine.on_activity_selected("a").await;
        snapshots.changed().await.unwrap();
        let snap = snapshots.borrow_and_update().clone();
        assert_eq!(snap.opacities["a"], 100.0);
        assert_eq!(snap.fly_to.unwrap().to_lnglat_array(), [-1.0, 2.0, 1.0, -2.0]);

        // A later batch re-projects; the dim/bright split resets.
        feed_tx
            .send(FeedEvent::Changes(vec![document("b", 0.0, 1.0, 1.0, 0.0)]))
            .await
            .unwrap();
        snapshots.changed().await.unwrap();
        let snap = snapshots.borrow_and_update().clone();
        assert_eq!(snap.overlay_ids, vec!["a", "b"]);
        assert_eq!(snap.opacities["a"], 25.0);
        assert_eq!(snap.opacities["b"], 25.0);

        engine.cancel().await.unwrap();
    }

    #[tokio::test]
    async fn filter_change_reprojects() {
        let engine = DashboardEngine::new(EngineConfig::default());
        let mut snapshots = engine.subscribe();
        let (feed_tx, feed_rx) = mpsc::channel(8);

        engine.start(feed_rx).await.unwrap();
        feed_tx
            .send(FeedEvent::Changes(vec![
                document("a", 0.0, 1.0, 1.0, 0.0),
                document("b", 0.0, 1.0, 1.0, 0.0),
            ]))
            .await
            .unwrap();
        snapshots.changed().await.unwrap();
        snapshots.borrow_and_update();

        engine.on_filter_changed(vec!["b".to_string()]).await;
        let snap = engine.snapshot().await;
        assert_eq!(snap.overlay_ids, vec!["a", "b"]);
        assert_eq!(snap.opacities["a"], 0.0);
        assert_eq!(snap.opacities["b"], 25.0);

        // Back to "show all".
        engine.on_filter_changed(Vec::new()).await;
        let snap = engine.snapshot().await;
        assert_eq!(snap.opacities["a"], 25.0);

        engine.cancel().await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_engine_ignores_everything() {
        let engine = DashboardEngine::new(EngineConfig::default());
        let mut snapshots = engine.subscribe();
        let (feed_tx, feed_rx) = mpsc::channel(8);

        engine.start(feed_rx).await.unwrap();
        feed_tx
            .send(FeedEvent::Changes(vec![document("a", -1.0, 1.0, 2.0, -2.0)]))
            .await
            .unwrap();
        snapshots.changed().await.unwrap();
        snapshots.borrow_and_update();

        engine.cancel().await.unwrap();
        engine.cancel().await.unwrap();
        assert_eq!(engine.phase().await, EnginePhase::Cancelled);

        let before = engine.snapshot().await;

        // Late UI events and feed pushes after teardown change nothing.
        let _ = feed_tx
            .send(FeedEvent::Changes(vec![document("late", 0.0, 1.0, 1.0, 0.0)]))
            .await;
        engine.on_activity_selected("a").await;
        engine.on_filter_changed(vec!["a".to_string()]).await;
        sleep(Duration::from_millis(50)).await;

        assert_eq!(engine.snapshot().await, before);
        assert!(!snapshots.has_changed().unwrap_or(false));
    }

    #[tokio::test]
    async fn start_after_cancel_fails() {
        let engine = DashboardEngine::new(EngineConfig::default());
        engine.cancel().await.unwrap();

        let (_feed_tx, feed_rx) = mpsc::channel(8);
        assert!(engine.start(feed_rx).await.is_err());
    }

    #[tokio::test]
    async fn start_twice_fails() {
        let engine = DashboardEngine::new(EngineConfig::default());
        let (_feed_tx, feed_rx) = mpsc::channel(8);
        let (_feed_tx2, feed_rx2) = mpsc::channel(8);

        engine.start(feed_rx).await.unwrap();
        assert!(engine.start(feed_rx2).await.is_err());

        engine.cancel().await.unwrap();
    }

    #[tokio::test]
    async fn transport_error_is_recorded_and_terminal() {
        let engine = DashboardEngine::new(EngineConfig::default());
        let (feed_tx, feed_rx) = mpsc::channel(8);

        engine.start(feed_rx).await.unwrap();
        feed_tx
            .send(FeedEvent::Error(TransportError::PermissionDenied(
                "revoked".to_string(),
            )))
            .await
            .unwrap();

        let mut recorded = None;
        for _ in 0..50 {
            recorded = engine.transport_error().await;
            if recorded.is_some() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(
            recorded,
            Some(TransportError::PermissionDenied("revoked".to_string()))
        );

        // The store is retained and teardown still works.
        engine.cancel().await.unwrap();
    }

    #[tokio::test]
    async fn decode_error_isolation_end_to_end() {
        let engine = DashboardEngine::new(EngineConfig::default());
        let mut snapshots = engine.subscribe();
        let (feed_tx, feed_rx) = mpsc::channel(8);

        engine.start(feed_rx).await.unwrap();

        let broken = RawDocument {
            id: "broken".to_string(),
            data: json!({ "not": "an envelope" }),
        };
        feed_tx
            .send(FeedEvent::Changes(vec![
                document("first", 0.0, 1.0, 1.0, 0.0),
                broken,
                document("third", 0.0, 1.0, 1.0, 0.0),
            ]))
            .await
            .unwrap();

        snapshots.changed().await.unwrap();
        let snap = snapshots.borrow_and_update().clone();
        assert_eq!(snap.overlay_ids, vec!["first", "third"]);

        engine.cancel().await.unwrap();
    }
}
