// src/lib.rs
// Public library surface for integration tests (and the binary).

pub mod api;
pub mod artifacts;
pub mod config;
pub mod dashboard;
pub mod metrics;
pub mod overview;
pub mod reconcile;
pub mod runner;
pub mod schema;
pub mod sections;
pub mod theme;
pub mod topics;
pub mod view;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::artifacts::{ArtifactLayout, ArtifactSet, Loaded};
pub use crate::config::DashboardConfig;
pub use crate::runner::{PipelineRunner, RunOutcome};
pub use crate::topics::Topic;
pub use crate::view::{build_view, ViewModel, ViewState};
