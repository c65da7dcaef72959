//! Built-in etudes and the catalog used for discovery.

mod one;
mod zero;

pub use one::EtudeOne;
pub use zero::EtudeZero;

use crate::etude::{Etude, EtudeError};
use crate::registry::CatalogEntry;

fn build_zero() -> Result<Box<dyn Etude>, EtudeError> {
    Ok(Box::new(EtudeZero::new()?))
}

fn build_one() -> Result<Box<dyn Etude>, EtudeError> {
    Ok(Box::new(EtudeOne::new()?))
}

/// Every etude compiled into this crate, keyed like its page directory.
pub fn catalog() -> &'static [CatalogEntry] {
    const CATALOG: &[CatalogEntry] = &[
        CatalogEntry {
            key: "one",
            build: build_one,
        },
        CatalogEntry {
            key: "zero",
            build: build_zero,
        },
    ];
    CATALOG
}

/// Registry populated from [`catalog`], skipping the excluded keys.
pub fn discover_builtin(exclude: &[String]) -> crate::registry::EtudeRegistry {
    let mut registry = crate::registry::EtudeRegistry::new();
    registry.discover(catalog(), exclude);
    registry
}
