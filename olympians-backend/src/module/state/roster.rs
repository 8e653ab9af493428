//! Roster split: bios tables into state-born and born-elsewhere athletes
//!
//! The split tables are the athlete input of the season pipeline.

use anyhow::{Context, Result};
use olympians_common::AthleteRecord;
use std::collections::HashSet;

use super::aggregator::{StateGroups, parse_birthplace};
use super::report::StateReport;
use crate::config::PipelineConfig;
use crate::module::table::{Table, read_lines};

/// Append `extra` to `bios`: new columns go at the end, rows whose id is
/// empty or already present are dropped. Returns the number of rows added.
pub fn merge_bios(bios: &mut Table, extra: Table) -> usize {
    for column in extra.headers {
        if !bios.headers.contains(&column) {
            bios.headers.push(column);
        }
    }

    let mut seen: HashSet<String> = bios.rows.iter().map(|r| r.athlete_id().to_string()).collect();
    let mut added = 0;
    for row in extra.rows {
        let athlete_id = row.athlete_id().to_string();
        if !athlete_id.is_empty() && seen.insert(athlete_id) {
            bios.rows.push(row);
            added += 1;
        }
    }
    added
}

/// Rules deciding which athletes belong to the target country.
#[derive(Debug, Clone)]
pub struct RosterRules {
    pub states: Vec<String>,
    pub country_code: String,
    pub nationality: String,
}

impl RosterRules {
    pub fn from_config(config: &PipelineConfig, states: Vec<String>) -> Self {
        Self {
            states,
            country_code: config.pipeline.country_code.clone(),
            nationality: config.pipeline.nationality.clone(),
        }
    }

    /// The recognised state an athlete was born in, if any.
    pub fn home_state<'r>(&self, record: &'r AthleteRecord) -> Option<&'r str> {
        let (place, code) = parse_birthplace(record.born())?;
        (code == self.country_code && self.states.iter().any(|s| s == place)).then_some(place)
    }

    /// `NOC` may list several nations; any mention of the nationality counts.
    pub fn is_national(&self, record: &AthleteRecord) -> bool {
        record.noc().contains(self.nationality.as_str())
    }

    pub fn split(&self, athletes: Vec<AthleteRecord>) -> StateReport {
        let mut report = StateReport {
            groups: StateGroups::new(&self.states),
            ..StateReport::default()
        };

        for athlete in athletes {
            match self.home_state(&athlete).map(str::to_string) {
                Some(state) => report.groups.push(state, athlete),
                None if self.is_national(&athlete) => report.born_elsewhere.push(athlete),
                None => {}
            }
        }
        report
    }
}

/// Load bios, split them and write the roster tables.
pub async fn run_roster_split(config: &PipelineConfig) -> Result<StateReport> {
    let paths = &config.paths;

    let states = read_lines(paths.states_path())
        .await
        .context("Failed to load states list")?;
    let mut bios = Table::read(paths.bios_path())
        .await
        .context("Failed to load bios table")?;

    let extra_path = paths.extra_bios_path();
    if let Some(extra) = Table::read_optional(&extra_path).await? {
        let rows = extra.rows.len();
        let added = merge_bios(&mut bios, extra);
        tracing::info!("Loaded {:?}: {} rows, {} new athletes merged", extra_path, rows, added);
    }

    let headers = bios.headers.clone();
    let report = RosterRules::from_config(config, states).split(bios.rows);
    report.write(&paths.roster_dir, &headers, &headers).await?;
    report.log_summary("Roster", "state-born");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rules() -> RosterRules {
        RosterRules {
            states: vec!["Montana".to_string(), "Georgia".to_string()],
            country_code: "USA".to_string(),
            nationality: "United States".to_string(),
        }
    }

    fn athlete(id: &str, born: &str, noc: &str) -> AthleteRecord {
        AthleteRecord::from_pairs([("athlete_id", id), ("Born", born), ("NOC", noc)])
    }

    #[test]
    fn test_merge_bios_appends_new_columns_and_ids() {
        let mut bios = Table::parse("athlete_id,Used name\n1,A\n2,B\n").unwrap();
        let extra = Table::parse("athlete_id,Used name,Roles\n2,B2,x\n3,C,y\n,D,z\n").unwrap();

        assert_eq!(merge_bios(&mut bios, extra), 1);
        assert_eq!(bios.headers, vec!["athlete_id", "Used name", "Roles"]);
        assert_eq!(bios.rows.len(), 3);
        assert_eq!(bios.rows[1].used_name(), "B");
        assert_eq!(bios.rows[2].athlete_id(), "3");
    }

    #[test]
    fn test_split_state_born_and_born_elsewhere() {
        let report = rules().split(vec![
            athlete("1", "in Helena, Montana (USA)", "United States"),
            athlete("2", "in Tbilisi, Georgia (GEO)", "United States"),
            athlete("3", "in Paris (FRA)", "France"),
            athlete("4", "in Toronto, Ontario (CAN)", "Canada United States"),
            athlete("5", "in Atlanta, Georgia (USA)", "Canada"),
        ]);

        assert_eq!(report.groups.counts(), vec![("Georgia", 1), ("Montana", 1)]);
        assert_eq!(report.groups.rows("Georgia")[0].athlete_id(), "5");
        let elsewhere: Vec<_> = report.born_elsewhere.iter().map(|r| r.athlete_id()).collect();
        assert_eq!(elsewhere, vec!["2", "4"]);
        assert!(report.no_match.is_none());
    }

    #[tokio::test]
    async fn test_run_roster_split_writes_tables() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input-data");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("states-list.txt"), "Montana\nWyoming\n").unwrap();
        std::fs::write(
            input.join("bios.csv"),
            "athlete_id,Used name,Born,NOC\n1,A•ONE,\"in Helena, Montana (USA)\",United States\n",
        )
        .unwrap();
        std::fs::write(
            input.join("2024-2026-us-bios.csv"),
            "athlete_id,Used name,Born,NOC\n9,Z•NINE,\"in Cody, Wyoming (USA)\",United States\n",
        )
        .unwrap();

        let mut config = PipelineConfig::default();
        config.paths.input_dir = input;
        config.paths.roster_dir = dir.path().join("output-data");

        let report = run_roster_split(&config).await.unwrap();
        assert_eq!(report.groups.total(), 2);

        let count = std::fs::read_to_string(dir.path().join("output-data/count.csv")).unwrap();
        assert_eq!(count, "state,number\nMontana,1\nWyoming,1\n");
        assert!(dir.path().join("output-data/by-state/Wyoming.csv").exists());
    }
}
