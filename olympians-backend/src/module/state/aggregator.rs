//! Birth-state parsing and grouping

use olympians_common::AthleteRecord;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const UNKNOWN_STATE: &str = "Unknown";

/// `", <place> (<CODE>)"` at the end of a `Born` value.
static BORN_PLACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([^,]+?)\s*\(([A-Z]+)\)\s*$").expect("Invalid born place regex"));

/// Place and country code from a `Born` value such as
/// `"12 May 1990 in Helena, Montana (USA)"`.
pub fn parse_birthplace(born: &str) -> Option<(&str, &str)> {
    let caps = BORN_PLACE.captures(born)?;
    Some((caps.get(1)?.as_str().trim(), caps.get(2)?.as_str()))
}

/// Grouping key for a record: the birth place, or `"Unknown"`.
pub fn born_state(born: &str) -> &str {
    parse_birthplace(born).map_or(UNKNOWN_STATE, |(place, _)| place)
}

/// File name used for a state's table.
pub fn state_file_name(state: &str) -> String {
    format!("{}.csv", state.replace('/', "-"))
}

/// Records grouped by state, over a fixed list of recognised states.
#[derive(Debug, Clone, Default)]
pub struct StateGroups {
    states: Vec<String>,
    groups: HashMap<String, Vec<AthleteRecord>>,
}

impl StateGroups {
    /// `states` is sorted here; every later listing follows that order.
    pub fn new(states: &[String]) -> Self {
        let mut states = states.to_vec();
        states.sort();
        states.dedup();
        Self {
            states,
            groups: HashMap::new(),
        }
    }

    /// Group records by their parsed birth state. Records keyed to a name
    /// outside the state list are kept but never listed.
    pub fn by_born_state(states: &[String], records: impl IntoIterator<Item = AthleteRecord>) -> Self {
        let mut groups = Self::new(states);
        for record in records {
            let state = born_state(record.born()).to_string();
            groups.push(state, record);
        }
        groups
    }

    pub fn push(&mut self, state: impl Into<String>, record: AthleteRecord) {
        self.groups.entry(state.into()).or_default().push(record);
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn rows(&self, state: &str) -> &[AthleteRecord] {
        self.groups.get(state).map(Vec::as_slice).unwrap_or_default()
    }

    /// Recognised states with at least one record, in order, with counts.
    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.states
            .iter()
            .map(|state| (state.as_str(), self.rows(state).len()))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    /// Every recognised state's records, concatenated in state order.
    pub fn all_states(&self) -> Vec<AthleteRecord> {
        self.states
            .iter()
            .flat_map(|state| self.rows(state).iter().cloned())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.counts().iter().map(|(_, n)| n).sum()
    }
}
