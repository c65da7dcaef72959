//! # registry: the set of etudes for one run
//!
//! [`EtudeRegistry`] maps etude names to instances. It is populated once,
//! either by explicit [`EtudeRegistry::register`] calls or by
//! [`EtudeRegistry::discover`] over a compile-time catalog of constructors,
//! and is read-only afterwards.
//!
//! ## Ordering
//! [`EtudeRegistry::all`] returns the overview etude (`"zero"`) first and the
//! rest in byte-wise lexicographic order of their names, regardless of the
//! order they were registered in. Every consumer (daily runner, mock data,
//! rendering) iterates in this order.
//!
//! ## Discovery
//! Each [`CatalogEntry`] pairs a key with a factory. Keys starting with `_` and
//! keys in the caller's exclusion list are skipped. A factory that fails or
//! panics is logged and skipped; discovery itself never fails.

use std::collections::BTreeMap;
use std::fmt;
use std::panic;

use tracing::{debug, error, info, warn};

use crate::etude::{Etude, EtudeError};

/// Name of the etude that always sorts first.
pub const OVERVIEW_ETUDE: &str = "zero";

/// Zero-argument constructor for a catalog etude.
pub type EtudeFactory = fn() -> Result<Box<dyn Etude>, EtudeError>;

/// A discoverable etude: the key it is known by and how to build it.
#[derive(Clone, Copy)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub build: EtudeFactory,
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEntry").field("key", &self.key).finish()
    }
}

#[derive(Default)]
pub struct EtudeRegistry {
    etudes: BTreeMap<String, Box<dyn Etude>>,
}

impl fmt::Debug for EtudeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EtudeRegistry")
            .field("etudes", &self.names())
            .finish()
    }
}

impl EtudeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `etude` under its name, replacing (with a warning) any etude
    /// already registered under that name.
    pub fn register(&mut self, etude: Box<dyn Etude>) {
        let name = etude.name().to_string();
        if self.etudes.contains_key(&name) {
            warn!(etude = %name, "[REGISTRY] Re-registering etude, replacing the previous instance");
        }
        debug!(etude = %name, "[REGISTRY] Registered etude");
        self.etudes.insert(name, etude);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Etude> {
        self.etudes.get(name).map(|e| e.as_ref())
    }

    /// All etudes, overview first, then by name.
    pub fn all(&self) -> Vec<&dyn Etude> {
        let overview = self.etudes.get(OVERVIEW_ETUDE).map(|e| e.as_ref());
        overview
            .into_iter()
            .chain(
                self.etudes
                    .iter()
                    .filter(|(name, _)| name.as_str() != OVERVIEW_ETUDE)
                    .map(|(_, e)| e.as_ref()),
            )
            .collect()
    }

    /// Etude names in [`EtudeRegistry::all`] order.
    pub fn names(&self) -> Vec<&str> {
        self.all().into_iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.etudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.etudes.is_empty()
    }

    /// Builds and registers every catalog etude that is not excluded.
    ///
    /// Returns the number of etudes registered by this call.
    pub fn discover(&mut self, catalog: &[CatalogEntry], exclude: &[String]) -> usize {
        info!(candidates = catalog.len(), "[REGISTRY] Discovering etudes");
        let mut registered = 0;
        for entry in catalog {
            if entry.key.starts_with('_') || exclude.iter().any(|x| x == entry.key) {
                debug!(key = entry.key, "[REGISTRY] Skipping excluded catalog entry");
                continue;
            }
            match panic::catch_unwind(entry.build) {
                Ok(Ok(etude)) => {
                    info!(key = entry.key, etude = etude.name(), "[REGISTRY] Discovered etude");
                    self.register(etude);
                    registered += 1;
                }
                Ok(Err(e)) => {
                    error!(key = entry.key, error = %e, "[REGISTRY] Could not instantiate etude, skipping");
                }
                Err(payload) => {
                    let reason = crate::panic_message(payload.as_ref());
                    error!(key = entry.key, reason = %reason, "[REGISTRY] Etude constructor panicked, skipping");
                }
            }
        }
        info!(registered, total = self.len(), "[REGISTRY] Discovery finished");
        registered
    }
}
