/// Configuration for the dashboard engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Opacity assigned to an overlay that is visible but not focused.
    /// Focused overlays get 100, filtered-out overlays get 0 and a
    /// non-focused overlay is dimmed to a fifth of this value.
    pub initial_opacity: f64,

    /// Buffer size of the mapped-batch channel between the subscription
    /// loop and the ingestion loop.
    pub batch_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_opacity: 25.0,
            batch_buffer: 32,
        }
    }
}
