//! Daily fetch orchestration: per-resource outcomes → per-etude status.
//!
//! [`execute_daily_tasks`] walks the registry in order, fetches every declared
//! resource of every etude one at a time, and records an [`EtudeRunResult`]
//! per etude. Nothing here fails the run: a broken resource list downgrades
//! only its own etude to [`DailyStatus::Failed`], and a failed or panicking
//! fetch only nulls its own resource.
//!
//! The resulting [`RunResultSet`] is the daily artifact. It serializes to a
//! JSON object keyed by etude name, in registry order, where each value has
//! exactly `status`, `data` and `actions_log`.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::panic::AssertUnwindSafe;
use std::path::Path;

use futures::FutureExt;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::etude::{Etude, EtudeError};
use crate::registry::EtudeRegistry;

/// Log entry for an etude that declares no daily resources.
pub const NO_RESOURCES_MESSAGE: &str = "No daily resources defined for this etude.";

/// Outcome of an etude's daily run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DailyStatus {
    /// Every resource was fetched.
    Ok,
    /// No resource was fetched, or the resource list itself was unavailable.
    Failed,
    PartialSuccess,
    /// The etude declares no resources.
    NoOp,
    /// Only produced by mock data: no data release exists for the etude.
    NotFound,
}

impl DailyStatus {
    /// Status for an etude whose resources were all attempted.
    pub fn from_counts(succeeded: usize, failed: usize) -> Self {
        match (succeeded, failed) {
            (0, 0) => DailyStatus::NoOp,
            (_, 0) => DailyStatus::Ok,
            (0, _) => DailyStatus::Failed,
            _ => DailyStatus::PartialSuccess,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DailyStatus::Ok => "OK",
            DailyStatus::Failed => "FAILED",
            DailyStatus::PartialSuccess => "PARTIAL_SUCCESS",
            DailyStatus::NoOp => "NO_OP",
            DailyStatus::NotFound => "NOT_FOUND",
        }
    }
}

impl fmt::Display for DailyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated daily outcome for one etude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtudeRunResult {
    pub status: DailyStatus,
    /// Resource name → fetched value (`null` for failures); `None` when no
    /// fetch was attempted.
    pub data: Option<Map<String, Value>>,
    pub actions_log: Vec<String>,
}

impl EtudeRunResult {
    pub fn no_op() -> Self {
        Self {
            status: DailyStatus::NoOp,
            data: None,
            actions_log: vec![NO_RESOURCES_MESSAGE.to_string()],
        }
    }

    pub fn resource_list_failed(error: &EtudeError) -> Self {
        Self {
            status: DailyStatus::Failed,
            data: None,
            actions_log: vec![format!("Failed to retrieve resource list: {error}")],
        }
    }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to write artifact to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize artifact: {0}")]
    Json(#[from] serde_json::Error),
}

/// Etude name → result, kept in the order the etudes were processed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResultSet {
    entries: Vec<(String, EtudeRunResult)>,
}

impl RunResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result, replacing any earlier result for the same etude.
    pub fn insert(&mut self, name: impl Into<String>, result: EtudeRunResult) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = result,
            None => self.entries.push((name, result)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&EtudeRunResult> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, result)| result)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EtudeRunResult)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the set as pretty-printed JSON, replacing any existing file.
    pub fn write_json(&self, path: &Path) -> Result<(), ArtifactError> {
        let io_err = |source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        info!(path = %path.display(), etudes = self.len(), "Wrote run result artifact");
        Ok(())
    }
}

impl Serialize for RunResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RunResultSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = RunResultSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of etude names to run results")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RunResultSet, A::Error> {
                let mut set = RunResultSet::new();
                while let Some((name, result)) = access.next_entry::<String, EtudeRunResult>()? {
                    set.insert(name, result);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

/// Runs the daily fetch for every registered etude, in registry order.
pub async fn execute_daily_tasks(registry: &EtudeRegistry) -> RunResultSet {
    let mut results = RunResultSet::new();
    let etudes = registry.all();
    if etudes.is_empty() {
        warn!("[DAILY] No etudes registered. Nothing to do for daily tasks.");
        return results;
    }

    info!(etudes = etudes.len(), "[DAILY] Executing daily tasks");
    for etude in etudes {
        info!(etude = etude.name(), "[DAILY] Processing daily resources");
        let result = run_etude(etude).await;
        info!(
            etude = etude.name(),
            status = %result.status,
            "[DAILY] Finished processing etude"
        );
        results.insert(etude.name(), result);
    }
    results
}

async fn run_etude(etude: &dyn Etude) -> EtudeRunResult {
    let resources = match etude.daily_resources() {
        Ok(resources) => resources,
        Err(e) => {
            error!(etude = etude.name(), error = %e, "[DAILY][ERROR] Could not get daily resources");
            return EtudeRunResult::resource_list_failed(&e);
        }
    };
    if resources.is_empty() {
        info!(etude = etude.name(), "[DAILY] No daily resources to fetch");
        return EtudeRunResult::no_op();
    }

    let mut data = Map::new();
    let mut actions_log = Vec::with_capacity(resources.len());
    let (mut succeeded, mut failed) = (0usize, 0usize);

    for (name, fetcher) in &resources {
        debug!(etude = etude.name(), resource = %name, "[DAILY] Fetching resource");
        match AssertUnwindSafe(async { fetcher.fetch().await })
            .catch_unwind()
            .await
        {
            Ok(outcome) if outcome.success => {
                data.insert(name.clone(), outcome.value);
                actions_log.push(format!("Successfully fetched resource '{name}'."));
                succeeded += 1;
            }
            Ok(outcome) => {
                let message = outcome.error.unwrap_or_else(|| "unknown error".to_string());
                warn!(etude = etude.name(), resource = %name, error = %message, "[DAILY] Resource fetch failed");
                data.insert(name.clone(), Value::Null);
                actions_log.push(format!("Failed to fetch resource '{name}': {message}"));
                failed += 1;
            }
            Err(payload) => {
                let reason = crate::panic_message(payload.as_ref());
                error!(etude = etude.name(), resource = %name, reason = %reason, "[DAILY][ERROR] Unexpected error during fetch");
                data.insert(name.clone(), Value::Null);
                actions_log.push(format!("Unexpected error fetching resource '{name}': {reason}"));
                failed += 1;
            }
        }
    }

    EtudeRunResult {
        status: DailyStatus::from_counts(succeeded, failed),
        data: (!data.is_empty()).then_some(data),
        actions_log,
    }
}
