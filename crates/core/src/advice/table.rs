//! The authored advice table

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::types::AdviceEntry;
use crate::error::{Error, Result};

const BUILTIN_TABLE: &str = include_str!("../../data/advice.json");

static BUILTIN: Lazy<Arc<AdviceTable>> =
    Lazy::new(|| match AdviceTable::from_json_str(BUILTIN_TABLE) {
        Ok(table) => Arc::new(table),
        Err(e) => {
            tracing::error!(error = %e, "built-in advice table is unreadable");
            Arc::new(AdviceTable::default())
        }
    });

/// Situation key to advice text. Loaded once and only ever read afterwards,
/// so a shared reference can be used from any number of threads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdviceTable {
    pub version: String,
    entries: HashMap<String, AdviceEntry>,
}

impl AdviceTable {
    /// The table shipped with the crate.
    pub fn builtin() -> &'static AdviceTable {
        &BUILTIN
    }

    /// Another handle on the built-in table; the entries are never copied.
    pub fn shared_builtin() -> Arc<AdviceTable> {
        Arc::clone(&*BUILTIN)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: AdviceTable = serde_json::from_str(json)?;
        if table.version.trim().is_empty() {
            return Err(Error::Config("advice table has no version".to_string()));
        }
        Ok(table)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn lookup(&self, key: &str) -> Option<&AdviceEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
