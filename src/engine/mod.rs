pub mod config;
pub mod controller;
pub mod projector;
pub mod state;

pub use config::EngineConfig;
pub use controller::DashboardEngine;
pub use projector::project;
pub use state::{EnginePhase, EngineState, OverlaySnapshot};
