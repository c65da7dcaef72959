//! etude-daily: plugin registry, daily fetch pipeline and mock data for etude
//! modules.
//!
//! The crate is organised leaf to root:
//!
//! - [`schema`]: recursive shape descriptions of resource data.
//! - [`fetcher`]: the [`fetcher::Fetcher`] trait and its static, URL and
//!   transforming implementations.
//! - [`etude`] and [`registry`]: etude identity/behaviour and the ordered set
//!   of etudes for a run; [`etudes`] holds the built-in catalog.
//! - [`daily`]: the daily fetch orchestrator and the run result artifact.
//! - [`mock_data`]: schema-driven synthetic artifacts with failure scenarios.
//! - [`load_config`] and [`cli`]: YAML configuration and the command-line glue.
//!
//! Rendering of etude pages consumes the [`daily::RunResultSet`] artifact and
//! the registry order; it lives outside this crate.

pub mod cli;
pub mod daily;
pub mod etude;
pub mod etudes;
pub mod fetcher;
pub mod load_config;
pub mod mock_data;
pub mod registry;
pub mod schema;

pub use daily::{execute_daily_tasks, DailyStatus, EtudeRunResult, RunResultSet};
pub use etude::{DailyResource, Etude, EtudeDescriptor, EtudeError, Metrics};
pub use fetcher::{FetchOutcome, Fetcher, StaticFetcher, TransformingFetcher, UrlFetcher};
pub use mock_data::{generate_mock_data, Scenario};
pub use registry::{CatalogEntry, EtudeRegistry};
pub use schema::Schema;

use std::any::Any;

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
