use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use super::error::FetchError;
use super::model::has_column;

/// Versioned synonym table: alternate column spelling → canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameMap {
    pub version: u32,
    pub renames: BTreeMap<String, String>,
}

impl RenameMap {
    pub fn new(version: u32, pairs: &[(&str, &str)]) -> Self {
        Self {
            version,
            renames: pairs
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// A canonical name must never itself be a synonym, otherwise renames
    /// would chain and a second pass would change the result.
    pub fn validate(&self) -> Result<(), FetchError> {
        for (from, to) in &self.renames {
            if self.renames.contains_key(to) {
                return Err(FetchError::schema(format!(
                    "rename map v{} chains '{from}' -> '{to}' -> '{}'",
                    self.version, self.renames[to]
                )));
            }
        }
        Ok(())
    }

    /// Rename synonym columns of `frame` to their canonical names.
    ///
    /// Fails when a table carries both a synonym and its canonical column:
    /// the two cannot be merged without guessing which one wins.
    pub fn apply(&self, frame: &mut DataFrame) -> Result<(), FetchError> {
        self.validate()?;
        for (from, to) in &self.renames {
            if !has_column(frame, from) {
                continue;
            }
            if has_column(frame, to) {
                return Err(FetchError::schema(format!(
                    "table has both '{from}' and its canonical name '{to}'"
                )));
            }
            log::debug!("renaming column '{from}' -> '{to}'");
            frame
                .rename(from, to)
                .map_err(|e| FetchError::schema(format!("renaming '{from}': {e}")))?;
        }
        Ok(())
    }
}
