//! Medal tally for one state's athletes

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Columns copied from the known-results tables into the events table.
pub const EVENT_FIELDS: [&str; 10] = [
    "Games",
    "Event",
    "Team",
    "Pos",
    "Medal",
    "As",
    "athlete_id",
    "NOC",
    "Discipline",
    "Nationality",
];

pub const MEDALS: [&str; 3] = ["Gold", "Silver", "Bronze"];

type Row = HashMap<String, String>;

fn field<'r>(row: &'r Row, name: &str) -> &'r str {
    row.get(name).map(String::as_str).unwrap_or("")
}

pub fn athlete_ids(roster: &Path) -> Result<HashSet<String>> {
    let mut reader =
        csv::Reader::from_path(roster).with_context(|| format!("Failed to open state roster {:?}", roster))?;
    let mut ids = HashSet::new();
    for result in reader.deserialize::<Row>() {
        match result {
            Ok(row) => {
                let id = field(&row, "athlete_id").trim();
                if !id.is_empty() {
                    ids.insert(id.to_string());
                }
            }
            Err(e) => tracing::warn!("Error parsing roster row in {:?}: {}", roster, e),
        }
    }
    Ok(ids)
}

/// Every results row belonging to `ids`, across `tables` in order.
/// Missing tables are skipped with a warning.
pub fn collect_events(ids: &HashSet<String>, tables: &[PathBuf]) -> Result<Vec<Row>> {
    let mut events = Vec::new();
    for path in tables {
        if !path.exists() {
            tracing::warn!("Not found, skipping: {:?}", path);
            continue;
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open {:?}", path))?;
        for result in reader.deserialize::<Row>() {
            match result {
                Ok(row) if ids.contains(field(&row, "athlete_id").trim()) => events.push(row),
                Ok(_) => {}
                Err(e) => tracing::warn!("Error parsing results row in {:?}: {}", path, e),
            }
        }
        tracing::info!("Scanned {:?}", path);
    }
    Ok(events)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedalTally {
    /// Gold, silver, bronze.
    pub totals: [usize; 3],
    /// Per `As` name, sorted by name.
    pub athletes: BTreeMap<String, [usize; 3]>,
}

impl MedalTally {
    pub fn count(events: &[Row]) -> Self {
        let mut tally = Self::default();
        for row in events {
            let medal = field(row, "Medal").trim();
            let Some(slot) = MEDALS.iter().position(|m| *m == medal) else {
                continue;
            };
            tally.totals[slot] += 1;
            tally.athletes.entry(field(row, "As").to_string()).or_default()[slot] += 1;
        }
        tally
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        let mut w = csv::Writer::from_path(dir.join("medal-counts.csv"))?;
        w.write_record(["medal", "number"])?;
        for (medal, n) in MEDALS.iter().zip(self.totals) {
            w.write_record([medal.to_lowercase(), n.to_string()])?;
        }
        w.flush()?;

        let mut w = csv::Writer::from_path(dir.join("athlete-medals.csv"))?;
        w.write_record(["name", "gold", "silver", "bronze"])?;
        for (name, [gold, silver, bronze]) in &self.athletes {
            w.write_record([name.clone(), gold.to_string(), silver.to_string(), bronze.to_string()])?;
        }
        w.flush()?;
        Ok(())
    }
}

pub fn events_file_name(state: &str) -> String {
    format!("{}-events.csv", state.to_lowercase().replace([' ', '/'], "-"))
}

fn write_events(path: &Path, events: &[Row]) -> Result<()> {
    let mut w = csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    w.write_record(EVENT_FIELDS)?;
    for row in events {
        w.write_record(EVENT_FIELDS.iter().map(|f| field(row, f)))?;
    }
    w.flush()?;
    Ok(())
}

pub fn run(config: &Config, state: &str) -> Result<MedalTally> {
    let ids = athlete_ids(&config.state_roster_path(state))?;
    tracing::info!("{} athlete ids loaded for {}", ids.len(), state);

    let events = collect_events(&ids, &config.results_paths())?;
    tracing::info!("Total matching rows: {}", events.len());

    fs::create_dir_all(&config.extra_dir).with_context(|| format!("Failed to create {:?}", config.extra_dir))?;
    write_events(&config.extra_dir.join(events_file_name(state)), &events)?;

    let tally = MedalTally::count(&events);
    tally.write(&config.extra_dir)?;
    tracing::info!(
        "✓ {}: {} gold, {} silver, {} bronze across {} athletes",
        state,
        tally.totals[0],
        tally.totals[1],
        tally.totals[2],
        tally.athletes.len()
    );
    Ok(tally)
}
