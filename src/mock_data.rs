//! Schema-driven mock data for the daily artifact.
//!
//! Produces a [`RunResultSet`] with the same shape as a real daily run without
//! touching the network: every resource value is synthesized from the
//! fetcher's declared [`Schema`]. A [`Scenario`] selects which failure
//! pattern, if any, is injected.
//!
//! - [`Scenario::Success`]: every resource gets generated data.
//! - [`Scenario::PartialFailure`]: like `Success`, but the first resource of
//!   the first etude (in registry order) that declares any resources is nulled
//!   and that etude is marked `PARTIAL_SUCCESS`. Exactly one failure per run.
//! - [`Scenario::NoData`]: every etude is `NOT_FOUND` with no data.
//!
//! Generated values are random. Pass a seeded RNG to
//! [`generate_mock_data_with_rng`] for reproducible output.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::daily::{ArtifactError, DailyStatus, EtudeRunResult, RunResultSet};
use crate::etude::DailyResource;
use crate::registry::EtudeRegistry;
use crate::schema::Schema;

const SENTENCE_WORDS: usize = 5;

const WORDS: &[&str] = &[
    "alpha", "amber", "answer", "bright", "canvas", "circle", "daily", "delta", "echo", "field",
    "forest", "garden", "harbor", "index", "journey", "kernel", "lantern", "ledger", "meadow",
    "motion", "north", "orbit", "paper", "quiet", "river", "signal", "silver", "stone", "table",
    "theory", "timber", "union", "valley", "window", "winter", "yellow",
];

#[derive(Debug, Error)]
pub enum MockDataError {
    #[error("unknown scenario '{0}', expected one of: success, partial_failure, no_data")]
    UnknownScenario(String),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Failure pattern injected into generated mock data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[default]
    Success,
    PartialFailure,
    NoData,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Success => "success",
            Scenario::PartialFailure => "partial_failure",
            Scenario::NoData => "no_data",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = MockDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Scenario::Success),
            "partial_failure" => Ok(Scenario::PartialFailure),
            "no_data" => Ok(Scenario::NoData),
            other => Err(MockDataError::UnknownScenario(other.to_string())),
        }
    }
}

/// Generates one arbitrary value conforming to `schema`.
pub fn generate_from_schema<R: Rng + ?Sized>(schema: &Schema, rng: &mut R) -> Value {
    match schema {
        Schema::Object { properties } => Value::Object(
            properties
                .iter()
                .map(|(name, child)| (name.clone(), generate_from_schema(child, &mut *rng)))
                .collect(),
        ),
        Schema::Array { items: Some(items) } => {
            let count = rng.gen_range(1..=3);
            Value::Array((0..count).map(|_| generate_from_schema(items, &mut *rng)).collect())
        }
        Schema::Array { items: None } => Value::Array(Vec::new()),
        Schema::String => Value::String(sentence(rng)),
        Schema::Integer => Value::from(rng.gen_range(0..=1000u64)),
        // Positive, at most three integer digits and two decimals.
        Schema::Number => Value::from(rng.gen_range(1..=99_999u32) as f64 / 100.0),
        Schema::Boolean => Value::Bool(rng.gen()),
        Schema::Unknown => Value::Null,
    }
}

fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let words: Vec<&str> = (0..SENTENCE_WORDS)
        .filter_map(|_| WORDS.choose(&mut *rng).copied())
        .collect();
    let mut text = words.join(" ");
    if let Some(first) = text.get(0..1) {
        let upper = first.to_uppercase();
        text.replace_range(0..1, &upper);
    }
    text.push('.');
    text
}

/// Generates mock data for every registered etude using the thread RNG.
pub fn generate_mock_data(scenario: Scenario, registry: &EtudeRegistry) -> RunResultSet {
    generate_mock_data_with_rng(scenario, registry, &mut rand::thread_rng())
}

pub fn generate_mock_data_with_rng<R: Rng + ?Sized>(
    scenario: Scenario,
    registry: &EtudeRegistry,
    rng: &mut R,
) -> RunResultSet {
    info!(scenario = %scenario, etudes = registry.len(), "[MOCK] Generating mock data");
    let mut results = RunResultSet::new();

    if scenario == Scenario::NoData {
        for etude in registry.all() {
            results.insert(
                etude.name(),
                EtudeRunResult {
                    status: DailyStatus::NotFound,
                    data: None,
                    actions_log: vec![format!(
                        "Mock scenario 'no_data': No data release found for {}.",
                        etude.name()
                    )],
                },
            );
        }
        return results;
    }

    let mut failure_pending = scenario == Scenario::PartialFailure;

    for etude in registry.all() {
        let resources = match etude.daily_resources() {
            Ok(resources) => resources,
            Err(e) => {
                warn!(etude = etude.name(), error = %e, "[MOCK] Could not get daily resources");
                results.insert(etude.name(), EtudeRunResult::resource_list_failed(&e));
                continue;
            }
        };
        if resources.is_empty() {
            results.insert(etude.name(), EtudeRunResult::no_op());
            continue;
        }

        let inject_failure = failure_pending;
        failure_pending = false;

        let result = mock_etude_result(&resources, inject_failure, |schema| {
            generate_from_schema(schema, &mut *rng)
        });
        results.insert(etude.name(), result);
    }

    results
}

/// Folds one etude's resources into a mock result.
///
/// `generate` supplies the value for each resource schema. With
/// `inject_failure`, the first resource is nulled instead and the etude is
/// marked `PARTIAL_SUCCESS`.
pub fn mock_etude_result<F>(
    resources: &[DailyResource],
    inject_failure: bool,
    mut generate: F,
) -> EtudeRunResult
where
    F: FnMut(&Schema) -> Value,
{
    let mut data = Map::new();
    let mut actions_log = Vec::with_capacity(resources.len());
    for (index, (name, fetcher)) in resources.iter().enumerate() {
        if inject_failure && index == 0 {
            debug!(resource = %name, "[MOCK] Injecting failure");
            data.insert(name.clone(), Value::Null);
            actions_log.push(format!(
                "Mock scenario 'partial_failure': Failed to fetch '{name}'."
            ));
            continue;
        }

        let schema = fetcher.schema();
        let value = generate(&schema);
        let (value, entry) = mock_resource(name, &schema, value);
        data.insert(name.clone(), value);
        actions_log.push(entry);
    }

    // A validation failure nulls the resource but leaves the status alone.
    let status = if inject_failure {
        DailyStatus::PartialSuccess
    } else {
        DailyStatus::Ok
    };
    EtudeRunResult {
        status,
        data: Some(data),
        actions_log,
    }
}

/// Checks a generated value against its schema.
///
/// Returns the value to store (`null` on a violation) and the log entry.
pub fn mock_resource(name: &str, schema: &Schema, value: Value) -> (Value, String) {
    match schema.validate(&value) {
        Ok(()) => (
            value,
            format!("Mock scenario 'success': Generated data for '{name}'."),
        ),
        Err(e) => {
            warn!(resource = %name, error = %e, "[MOCK] Generated data failed validation");
            (
                Value::Null,
                format!("Mock data validation failed for '{name}': {e}"),
            )
        }
    }
}

/// Generates mock data and writes it to `path` as pretty JSON.
pub fn write_mock_data(
    scenario: Scenario,
    registry: &EtudeRegistry,
    path: &Path,
) -> Result<RunResultSet, MockDataError> {
    let results = generate_mock_data(scenario, registry);
    results.write_json(path)?;
    Ok(results)
}
