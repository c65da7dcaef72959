use serde_json::json;

use crate::etude::{Etude, EtudeDescriptor, EtudeError, Metrics};
use crate::registry::EtudeRegistry;

/// Project overview: reports on every registered etude.
#[derive(Debug)]
pub struct EtudeZero {
    descriptor: EtudeDescriptor,
}

impl EtudeZero {
    pub const NAME: &'static str = "zero";
    pub const DESCRIPTION: &'static str = "Project Overview and Metrics. This etude provides meta-information about the project and all registered etudes.";

    pub fn new() -> Result<Self, EtudeError> {
        Ok(Self {
            descriptor: EtudeDescriptor::new(Self::NAME, Self::DESCRIPTION)?,
        })
    }
}

impl Etude for EtudeZero {
    fn descriptor(&self) -> &EtudeDescriptor {
        &self.descriptor
    }

    fn metrics(&self, registry: &EtudeRegistry) -> Metrics {
        let mut metrics = Metrics::new();
        metrics.insert("Total Etudes Registered".into(), json!(registry.len()));
        metrics.insert("Etude Names".into(), json!(registry.names()));
        metrics
    }
}
