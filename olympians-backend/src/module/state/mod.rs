//! Birth-state grouping
//!
//! - `aggregator`: `Born` parsing and per-state grouping
//! - `report`: count, per-state, all-states, born-elsewhere and no-match tables
//! - `roster`: bios split feeding the season pipeline

mod aggregator;
pub use aggregator::{StateGroups, UNKNOWN_STATE, born_state, parse_birthplace, state_file_name};

mod report;
pub use report::StateReport;

mod roster;
pub use roster::{RosterRules, merge_bios, run_roster_split};

pub const COUNT_FILE: &str = "count.csv";
pub const BY_STATE_DIR: &str = "by-state";
pub const ALL_STATES_FILE: &str = "all-states.csv";
pub const BORN_ELSEWHERE_FILE: &str = "us-born-elsewhere.csv";
pub const NO_MATCH_FILE: &str = "no-match.csv";
