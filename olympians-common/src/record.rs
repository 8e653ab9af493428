use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::GamesEdition;

pub const ATHLETE_ID: &str = "athlete_id";
pub const USED_NAME: &str = "Used name";
pub const BORN: &str = "Born";
pub const NOC: &str = "NOC";
pub const GAMES: &str = "Games";
pub const ROLES: &str = "Roles";

/// One athlete row, carried through the pipeline as an opaque set of named
/// fields. Column order lives with the table headers, not the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AthleteRecord {
    fields: HashMap<String, String>,
}

impl AthleteRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Field value, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn athlete_id(&self) -> &str {
        self.get(ATHLETE_ID).trim()
    }

    pub fn used_name(&self) -> &str {
        self.get(USED_NAME)
    }

    pub fn born(&self) -> &str {
        self.get(BORN)
    }

    pub fn noc(&self) -> &str {
        self.get(NOC)
    }

    /// Derived copy with the resolved editions stored in the `Games` column.
    pub fn with_games(&self, editions: &[GamesEdition]) -> Self {
        let mut out = self.clone();
        out.set(GAMES, GamesEdition::join(editions));
        out
    }
}
