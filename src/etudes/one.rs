use serde_json::json;

use crate::etude::{DailyResource, Etude, EtudeDescriptor, EtudeError, Metrics};
use crate::fetcher::{Fetcher, StaticFetcher};
use crate::registry::EtudeRegistry;

/// Placeholder etude demonstrating a daily resource.
#[derive(Debug)]
pub struct EtudeOne {
    descriptor: EtudeDescriptor,
}

impl EtudeOne {
    pub const NAME: &'static str = "one";
    pub const DESCRIPTION: &'static str =
        "Placeholder Etude One. This is a sample etude to demonstrate the system.";
    const VERSION: &'static str = "0.1-alpha";

    pub fn new() -> Result<Self, EtudeError> {
        Ok(Self {
            descriptor: EtudeDescriptor::new(Self::NAME, Self::DESCRIPTION)?,
        })
    }
}

impl Etude for EtudeOne {
    fn descriptor(&self) -> &EtudeDescriptor {
        &self.descriptor
    }

    fn daily_resources(&self) -> Result<Vec<DailyResource>, EtudeError> {
        let status: Box<dyn Fetcher> = Box::new(StaticFetcher::new(json!({
            "status": "Pending Implementation",
            "version": Self::VERSION,
        })));
        Ok(vec![("status".to_string(), status)])
    }

    fn metrics(&self, _registry: &EtudeRegistry) -> Metrics {
        let mut metrics = Metrics::new();
        metrics.insert("Status".into(), json!("Pending Implementation"));
        metrics.insert("Items Processed".into(), json!(0));
        metrics.insert("Version".into(), json!(Self::VERSION));
        metrics
    }
}
