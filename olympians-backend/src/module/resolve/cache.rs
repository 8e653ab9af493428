//! Cross-run output cache
//!
//! Built from the matched tables earlier runs wrote into each season's
//! output directory. Only positive answers are cached: an athlete is either
//! listed with editions or unseen. Failed lookups (the no-match table) are
//! never read, so they are retried on every run.
//!
//! Cached Games values are filtered to the directory's season; tokens from
//! another season or that do not parse as an edition are dropped with a warning.

use anyhow::Result;
use olympians_common::record::GAMES;
use olympians_common::{GamesEdition, ResolutionState, Season};
use std::collections::HashMap;
use std::path::Path;

use crate::config::PathsConfig;
use crate::module::state::{ALL_STATES_FILE, BORN_ELSEWHERE_FILE};
use crate::module::table::Table;

/// Tables in a season directory that list athletes who did compete.
pub const MATCHED_FILES: [&str; 2] = [ALL_STATES_FILE, BORN_ELSEWHERE_FILE];

#[derive(Debug, Clone, Default)]
pub struct OutputCache {
    entries: HashMap<Season, HashMap<String, ResolutionState>>,
}

impl OutputCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every season's matched tables. Missing directories and files
    /// leave the cache empty for that season.
    pub async fn load(paths: &PathsConfig) -> Result<Self> {
        let mut cache = Self::new();
        for season in Season::ALL {
            cache.load_season_dir(season, paths.season_dir(season)).await?;
        }
        tracing::debug!(
            "Output cache: {} winter, {} summer athletes",
            cache.len(Season::Winter),
            cache.len(Season::Summer)
        );
        Ok(cache)
    }

    pub async fn load_season_dir(&mut self, season: Season, dir: &Path) -> Result<()> {
        for file in MATCHED_FILES {
            if let Some(table) = Table::read_optional(dir.join(file)).await? {
                self.add_table(season, &table);
            }
        }
        Ok(())
    }

    /// Merge one matched table. Rows without an id or without any readable
    /// edition of `season` are ignored.
    pub fn add_table(&mut self, season: Season, table: &Table) {
        for row in &table.rows {
            let athlete_id = row.athlete_id();
            if athlete_id.is_empty() {
                continue;
            }
            let editions = parse_games(row.get(GAMES), season);
            self.insert(athlete_id, season, editions);
        }
    }

    pub fn insert(&mut self, athlete_id: &str, season: Season, editions: Vec<GamesEdition>) {
        if editions.is_empty() {
            return;
        }
        let entry = self
            .entries
            .entry(season)
            .or_default()
            .entry(athlete_id.to_string())
            .or_default();
        *entry = std::mem::take(entry).merge(editions);
    }

    /// `ResolvedNonEmpty` for cached athletes, `Unseen` otherwise.
    pub fn state(&self, athlete_id: &str, season: Season) -> ResolutionState {
        self.entries
            .get(&season)
            .and_then(|athletes| athletes.get(athlete_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self, season: Season) -> usize {
        self.entries.get(&season).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(HashMap::is_empty)
    }
}

/// Editions of `season` in a `"; "`-joined Games value.
fn parse_games(value: &str, season: Season) -> Vec<GamesEdition> {
    value
        .split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match GamesEdition::parse(token) {
            Some(edition) if edition.season() == season => Some(edition),
            Some(_) => {
                tracing::warn!("Dropping cached {:?} from the {} output", token, season);
                None
            }
            None => {
                tracing::warn!("Dropping unreadable cached edition {:?}", token);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::state::NO_MATCH_FILE;
    use tempfile::TempDir;

    fn games(editions: &[(u16, Season)]) -> Vec<GamesEdition> {
        editions.iter().map(|&(y, s)| GamesEdition::new(y, s)).collect()
    }

    #[test]
    fn test_tables_merge_by_union() {
        let first = Table::parse("Games,athlete_id\n2018 Winter Olympics,1\n,2\n").unwrap();
        let second =
            Table::parse("Games,athlete_id\n2014 Winter Olympics; 2018 Winter Olympics,1\n").unwrap();

        let mut cache = OutputCache::new();
        cache.add_table(Season::Winter, &first);
        cache.add_table(Season::Winter, &second);

        assert_eq!(
            cache.state("1", Season::Winter),
            ResolutionState::ResolvedNonEmpty(games(&[(2014, Season::Winter), (2018, Season::Winter)]))
        );
        // Empty Games is not a negative answer.
        assert_eq!(cache.state("2", Season::Winter), ResolutionState::Unseen);
        assert_eq!(cache.state("1", Season::Summer), ResolutionState::Unseen);
    }

    #[test]
    fn test_games_keep_only_readable_editions_of_the_season() {
        assert_eq!(
            parse_games("2018 Winter Olympics; 2016 Summer Olympics;; Winter 2022 ;2022 Winter Olympics", Season::Winter),
            games(&[(2018, Season::Winter), (2022, Season::Winter)])
        );

        let table = Table::parse("Games,athlete_id
2016 Summer Olympics,3
").unwrap();
        let mut cache = OutputCache::new();
        cache.add_table(Season::Winter, &table);
        assert_eq!(cache.state("3", Season::Winter), ResolutionState::Unseen);
        assert_eq!(cache.len(Season::Winter), 0);
    }

    #[tokio::test]
    async fn test_missing_directories_are_empty() {
        let dir = TempDir::new().unwrap();
        let paths = PathsConfig {
            winter_dir: dir.path().join("nope-winter"),
            summer_dir: dir.path().join("nope-summer"),
            ..PathsConfig::default()
        };
        let cache = OutputCache::load(&paths).await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_no_match_table_is_never_loaded() {
        let dir = TempDir::new().unwrap();
        let winter = dir.path().join("winter");
        std::fs::create_dir_all(&winter).unwrap();
        std::fs::write(winter.join(ALL_STATES_FILE), "Games,athlete_id\n2022 Winter Olympics,10\n").unwrap();
        std::fs::write(
            winter.join(BORN_ELSEWHERE_FILE),
            "Games,athlete_id\n2010 Winter Olympics,11\n",
        )
        .unwrap();
        std::fs::write(winter.join(NO_MATCH_FILE), "Games,athlete_id\n,12\n").unwrap();

        let paths = PathsConfig {
            winter_dir: winter,
            summer_dir: dir.path().join("summer"),
            ..PathsConfig::default()
        };
        let cache = OutputCache::load(&paths).await.unwrap();

        assert!(cache.state("10", Season::Winter).is_resolved());
        assert!(cache.state("11", Season::Winter).is_resolved());
        assert_eq!(cache.state("12", Season::Winter), ResolutionState::Unseen);
        assert_eq!(cache.len(Season::Winter), 2);
    }
}
