//! Grouped output tables for one directory
//!
//! Used both for the roster split and for each season's resolved output.

use anyhow::Result;
use olympians_common::AthleteRecord;
use std::path::Path;

use super::aggregator::{StateGroups, state_file_name};
use super::{ALL_STATES_FILE, BORN_ELSEWHERE_FILE, BY_STATE_DIR, COUNT_FILE, NO_MATCH_FILE};
use crate::module::table::{write_records, write_rows};

#[derive(Debug, Clone, Default)]
pub struct StateReport {
    pub groups: StateGroups,
    pub born_elsewhere: Vec<AthleteRecord>,
    /// Only season output has a no-match table.
    pub no_match: Option<Vec<AthleteRecord>>,
}

impl StateReport {
    /// Write every table into `dir`. State tables, the all-states table and
    /// the no-match table use `headers`; the born-elsewhere table uses
    /// `elsewhere_headers`.
    pub async fn write(&self, dir: &Path, headers: &[String], elsewhere_headers: &[String]) -> Result<()> {
        let count_path = dir.join(COUNT_FILE);
        write_rows(
            &count_path,
            ["state", "number"],
            self.groups
                .counts()
                .into_iter()
                .map(|(state, n)| vec![state.to_string(), n.to_string()]),
        )
        .await?;
        tracing::info!("✓ Wrote {:?}", count_path);

        for (state, n) in self.groups.counts() {
            let path = dir.join(BY_STATE_DIR).join(state_file_name(state));
            write_records(&path, headers, self.groups.rows(state)).await?;
            tracing::debug!("Wrote {:?} ({} athletes)", path, n);
        }

        let all = self.groups.all_states();
        let all_path = dir.join(ALL_STATES_FILE);
        write_records(&all_path, headers, &all).await?;
        tracing::info!("✓ Wrote {:?} ({} athletes)", all_path, all.len());

        let elsewhere_path = dir.join(BORN_ELSEWHERE_FILE);
        write_records(&elsewhere_path, elsewhere_headers, &self.born_elsewhere).await?;
        tracing::info!("✓ Wrote {:?} ({} athletes)", elsewhere_path, self.born_elsewhere.len());

        if let Some(no_match) = &self.no_match {
            let no_match_path = dir.join(NO_MATCH_FILE);
            write_records(&no_match_path, headers, no_match).await?;
            tracing::info!("✓ Wrote {:?} ({} athletes)", no_match_path, no_match.len());
        }

        Ok(())
    }

    /// `label` names the population, e.g. "winter" or "state-born".
    pub fn log_summary(&self, title: &str, label: &str) {
        let counts = self.groups.counts();

        tracing::info!("--- {} Summary ---", title);
        tracing::info!("States with ≥1 {} athlete : {}", label, counts.len());
        tracing::info!("Total {} / state-born : {}", label, self.groups.total());
        tracing::info!("US NOC / born elsewhere : {}", self.born_elsewhere.len());
        if let Some(no_match) = &self.no_match {
            tracing::info!("No-match (lookup failed) : {}", no_match.len());
        }
        for (state, n) in counts {
            tracing::info!("  {:<20} {}", state, n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, born: &str) -> AthleteRecord {
        AthleteRecord::from_pairs([("athlete_id", id), ("Born", born), ("Games", "2022 Winter Olympics")])
    }

    #[tokio::test]
    async fn test_write_season_tables() {
        let dir = TempDir::new().unwrap();
        let states = vec!["Montana".to_string(), "Wyoming".to_string(), "Idaho".to_string()];
        let report = StateReport {
            groups: StateGroups::by_born_state(
                &states,
                [
                    record("2", "in Cody, Wyoming (USA)"),
                    record("1", "in Helena, Montana (USA)"),
                ],
            ),
            born_elsewhere: vec![record("3", "in Paris (FRA)")],
            no_match: Some(vec![]),
        };
        let headers = vec!["Games".to_string(), "athlete_id".to_string()];

        report.write(dir.path(), &headers, &headers).await.unwrap();

        let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read(COUNT_FILE), "state,number\nMontana,1\nWyoming,1\n");
        assert_eq!(
            read(ALL_STATES_FILE),
            "Games,athlete_id\n2022 Winter Olympics,1\n2022 Winter Olympics,2\n"
        );
        assert_eq!(read("by-state/Wyoming.csv"), "Games,athlete_id\n2022 Winter Olympics,2\n");
        assert!(!dir.path().join("by-state/Idaho.csv").exists());
        assert_eq!(read(BORN_ELSEWHERE_FILE), "Games,athlete_id\n2022 Winter Olympics,3\n");
        assert_eq!(read(NO_MATCH_FILE), "Games,athlete_id\n");
    }

    #[tokio::test]
    async fn test_roster_report_has_no_no_match_table() {
        let dir = TempDir::new().unwrap();
        let report = StateReport::default();
        let headers = vec!["athlete_id".to_string()];

        report.write(dir.path(), &headers, &headers).await.unwrap();
        assert!(dir.path().join(COUNT_FILE).exists());
        assert!(!dir.path().join(NO_MATCH_FILE).exists());
    }
}
