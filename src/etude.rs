//! Etude identity and behaviour.
//!
//! An etude is an independent content-bearing module. Its identity is a plain
//! [`EtudeDescriptor`] value; its behaviour is the [`Etude`] trait, which the
//! registry, the daily runner and the mock data generator consume.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::fetcher::Fetcher;
use crate::registry::EtudeRegistry;

/// A named resource and the fetcher that acquires it.
pub type DailyResource = (String, Box<dyn Fetcher>);

/// Display metrics reported by an etude, keyed by label.
pub type Metrics = BTreeMap<String, Value>;

#[derive(Debug, Error)]
pub enum EtudeError {
    #[error("etude name must be a non-empty string")]
    EmptyName,

    /// The etude could not produce its list of daily resources.
    #[error("{0}")]
    Resources(String),

    /// A catalog factory failed to build its etude.
    #[error("failed to instantiate etude '{key}': {reason}")]
    Instantiation { key: String, reason: String },
}

/// Name and description of an etude.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtudeDescriptor {
    name: String,
    description: String,
}

impl EtudeDescriptor {
    /// Fails with [`EtudeError::EmptyName`] if `name` is empty or whitespace.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Result<Self, EtudeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EtudeError::EmptyName);
        }
        Ok(Self {
            name,
            description: description.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Behaviour every registered etude provides.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
pub trait Etude: Send + Sync {
    fn descriptor(&self) -> &EtudeDescriptor;

    /// Resources to fetch daily, in the order they should be processed.
    ///
    /// The default declares none.
    fn daily_resources(&self) -> Result<Vec<DailyResource>, EtudeError> {
        Ok(Vec::new())
    }

    /// Metrics shown on the etude's page; may inspect the other etudes.
    fn metrics(&self, registry: &EtudeRegistry) -> Metrics;
}

impl<'a> dyn Etude + 'a {
    pub fn name(&self) -> &str {
        self.descriptor().name()
    }

    pub fn description(&self) -> &str {
        self.descriptor().description()
    }
}
