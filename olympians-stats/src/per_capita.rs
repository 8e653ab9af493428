//! Olympians per 100k residents, by state and season

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::config::Config;

pub const NATIONAL_ROW: &str = "United States";
const TOP_N: usize = 10;

#[derive(Debug, Deserialize)]
struct CensusRow {
    state: String,
    population: u64,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    state: String,
    number: u64,
}

pub fn load_census(path: &Path) -> Result<BTreeMap<String, u64>> {
    let mut reader = csv::Reader::from_path(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut census = BTreeMap::new();
    for result in reader.deserialize::<CensusRow>() {
        let row = result.with_context(|| format!("Bad census row in {:?}", path))?;
        census.insert(row.state, row.population);
    }
    Ok(census)
}

pub fn load_counts(path: &Path) -> Result<BTreeMap<String, u64>> {
    let mut reader = csv::Reader::from_path(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut counts = BTreeMap::new();
    for result in reader.deserialize::<CountRow>() {
        let row = result.with_context(|| format!("Bad count row in {:?}", path))?;
        counts.insert(row.state, row.number);
    }
    Ok(counts)
}

/// `count / population × 100 000`, rounded to four decimals.
pub fn per_100k(count: u64, population: u64) -> f64 {
    if population == 0 {
        return 0.0;
    }
    (count as f64 / population as f64 * 100_000.0 * 10_000.0).round() / 10_000.0
}

/// Shortest round-trip rendering, always with a fractional part.
pub fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{:.1}", rate)
    } else {
        rate.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateRate {
    pub state: String,
    pub winter: f64,
    pub summer: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerCapitaTables {
    pub winter: Vec<(String, f64)>,
    pub summer: Vec<(String, f64)>,
    /// Every state with census data, alphabetical.
    pub combined: Vec<StateRate>,
    pub national: Option<StateRate>,
}

impl PerCapitaTables {
    pub fn compute(
        census: &BTreeMap<String, u64>,
        winter: &BTreeMap<String, u64>,
        summer: &BTreeMap<String, u64>,
    ) -> Self {
        let states: BTreeSet<&String> = winter.keys().chain(summer.keys()).collect();
        let mut tables = Self {
            winter: Vec::new(),
            summer: Vec::new(),
            combined: Vec::new(),
            national: None,
        };

        for state in states {
            let Some(&population) = census.get(state) else {
                tracing::warn!("No census data for '{}', skipping", state);
                continue;
            };
            let w = winter.get(state).copied();
            let s = summer.get(state).copied();

            if let Some(n) = w {
                tables.winter.push((state.clone(), per_100k(n, population)));
            }
            if let Some(n) = s {
                tables.summer.push((state.clone(), per_100k(n, population)));
            }
            let (w, s) = (w.unwrap_or(0), s.unwrap_or(0));
            tables.combined.push(StateRate {
                state: state.clone(),
                winter: per_100k(w, population),
                summer: per_100k(s, population),
                overall: per_100k(w + s, population),
            });
        }

        let population: u64 = census.values().sum();
        if population > 0 {
            let w: u64 = winter.values().sum();
            let s: u64 = summer.values().sum();
            tables.national = Some(StateRate {
                state: NATIONAL_ROW.to_string(),
                winter: per_100k(w, population),
                summer: per_100k(s, population),
                overall: per_100k(w + s, population),
            });
        }

        tables
    }

    /// Highest overall rates, descending; ties keep alphabetical order.
    pub fn top(&self, n: usize) -> Vec<&StateRate> {
        let mut rows: Vec<&StateRate> = self.combined.iter().collect();
        rows.sort_by(|a, b| b.overall.total_cmp(&a.overall));
        rows.truncate(n);
        rows
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
        let national = self.national.as_ref();

        let mut w = writer(dir, "winter-count.csv")?;
        w.write_record(["state", "per100kResidents"])?;
        for (state, rate) in &self.winter {
            w.write_record([state.clone(), format_rate(*rate)])?;
        }
        if let Some(us) = national {
            w.write_record([us.state.clone(), format_rate(us.winter)])?;
        }
        w.flush()?;

        let mut w = writer(dir, "summer-count.csv")?;
        w.write_record(["state", "per100kResidents"])?;
        for (state, rate) in &self.summer {
            w.write_record([state.clone(), format_rate(*rate)])?;
        }
        if let Some(us) = national {
            w.write_record([us.state.clone(), format_rate(us.summer)])?;
        }
        w.flush()?;

        let mut w = writer(dir, "combined-count.csv")?;
        w.write_record(["state", "winterPer100kResidents", "summerPer100kResidents"])?;
        for row in self.combined.iter().chain(national) {
            w.write_record([row.state.clone(), format_rate(row.winter), format_rate(row.summer)])?;
        }
        w.flush()?;

        let mut w = writer(dir, "overall-count.csv")?;
        w.write_record(["state", "per100kResidents"])?;
        for row in self.combined.iter().chain(national) {
            w.write_record([row.state.clone(), format_rate(row.overall)])?;
        }
        w.flush()?;

        let zero = StateRate {
            state: NATIONAL_ROW.to_string(),
            winter: 0.0,
            summer: 0.0,
            overall: 0.0,
        };
        let mut w = writer(dir, "mergedTop10.csv")?;
        w.write_record([
            "state",
            "winterPer100kResidents",
            "summerPer100kResidents",
            "per100kResidents",
        ])?;
        for row in self.top(TOP_N).into_iter().chain([national.unwrap_or(&zero)]) {
            w.write_record([
                row.state.clone(),
                format_rate(row.winter),
                format_rate(row.summer),
                format_rate(row.overall),
            ])?;
        }
        w.flush()?;

        Ok(())
    }
}

fn writer(dir: &Path, name: &str) -> Result<csv::Writer<fs::File>> {
    let path = dir.join(name);
    csv::Writer::from_path(&path).with_context(|| format!("Failed to create {:?}", path))
}

pub fn run(config: &Config) -> Result<PerCapitaTables> {
    let census = load_census(&config.census_path())?;
    let winter = load_counts(&config.winter_dir.join("count.csv"))?;
    let summer = load_counts(&config.summer_dir.join("count.csv"))?;

    let tables = PerCapitaTables::compute(&census, &winter, &summer);
    tables.write(&config.per_capita_dir)?;
    tracing::info!(
        "✓ Wrote {} states to {:?}",
        tables.combined.len(),
        config.per_capita_dir
    );
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_per_100k_rounds_to_four_places() {
        assert_eq!(per_100k(1, 3), 33333.3333);
        assert_eq!(per_100k(5, 1_000_000), 0.5);
        assert_eq!(per_100k(3, 0), 0.0);
        assert_eq!(format_rate(5.0), "5.0");
        assert_eq!(format_rate(0.5), "0.5");
    }

    #[test]
    fn test_compute_skips_states_without_census() {
        let census = map(&[("Montana", 1_000_000), ("Wyoming", 500_000)]);
        let winter = map(&[("Montana", 10), ("Atlantis", 3)]);
        let summer = map(&[("Wyoming", 5)]);

        let tables = PerCapitaTables::compute(&census, &winter, &summer);
        assert_eq!(tables.winter, vec![("Montana".to_string(), 1.0)]);
        assert_eq!(tables.summer, vec![("Wyoming".to_string(), 1.0)]);
        assert_eq!(tables.combined.len(), 2);
        assert_eq!(tables.combined[0].summer, 0.0);

        let us = tables.national.unwrap();
        // National rate counts every athlete, census match or not.
        assert_eq!(us.winter, per_100k(13, 1_500_000));
        assert_eq!(us.overall, per_100k(18, 1_500_000));
    }

    #[test]
    fn test_top_is_descending_and_written_with_national_row() {
        let census = map(&[("A", 100_000), ("B", 100_000), ("C", 100_000)]);
        let winter = map(&[("A", 1), ("B", 3), ("C", 2)]);
        let tables = PerCapitaTables::compute(&census, &winter, &BTreeMap::new());

        let top: Vec<_> = tables.top(2).iter().map(|r| r.state.as_str()).collect();
        assert_eq!(top, vec!["B", "C"]);

        let dir = tempfile::TempDir::new().unwrap();
        tables.write(dir.path()).unwrap();
        let merged = fs::read_to_string(dir.path().join("mergedTop10.csv")).unwrap();
        assert_eq!(
            merged.lines().last(),
            Some("United States,2.0,0.0,2.0")
        );
        let winter_csv = fs::read_to_string(dir.path().join("winter-count.csv")).unwrap();
        assert_eq!(
            winter_csv,
            "state,per100kResidents\nA,1.0\nB,3.0\nC,2.0\nUnited States,2.0\n"
        );
    }
}
