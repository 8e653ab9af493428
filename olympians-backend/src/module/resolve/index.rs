//! Known-results lookup index for one season

use olympians_common::{GamesEdition, ResolutionState, Season};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::module::table::ResultRow;

/// Athlete id → editions of one season, built from known-results tables.
///
/// `seen` holds every id that appears in any table, season regardless, so an
/// id with no entry in `editions` is known to have zero editions this season.
#[derive(Debug, Clone)]
pub struct SeasonLookupIndex {
    season: Season,
    min_year: u16,
    editions: HashMap<String, BTreeSet<GamesEdition>>,
    seen: HashSet<String>,
}

impl SeasonLookupIndex {
    pub fn new(season: Season, min_year: u16) -> Self {
        Self {
            season,
            min_year,
            editions: HashMap::new(),
            seen: HashSet::new(),
        }
    }

    /// Build from several tables; later tables merge into earlier ones.
    pub fn build<'a, T>(tables: T, season: Season, min_year: u16) -> Self
    where
        T: IntoIterator<Item = &'a [ResultRow]>,
    {
        let mut index = Self::new(season, min_year);
        for rows in tables {
            index.extend(rows);
        }
        index
    }

    /// Add one table's rows. Rows without an id are skipped.
    pub fn extend(&mut self, rows: &[ResultRow]) {
        for row in rows {
            let athlete_id = row.athlete_id.trim();
            if athlete_id.is_empty() {
                continue;
            }
            self.seen.insert(athlete_id.to_string());

            let Some(edition) = GamesEdition::parse(row.games.trim()) else {
                continue;
            };
            if edition.season() != self.season || edition.year() < self.min_year {
                continue;
            }
            self.editions
                .entry(athlete_id.to_string())
                .or_default()
                .insert(edition);
        }
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn is_known(&self, athlete_id: &str) -> bool {
        self.seen.contains(athlete_id)
    }

    /// Sorted editions for a known athlete; empty for unknown ones.
    pub fn editions(&self, athlete_id: &str) -> Vec<GamesEdition> {
        self.editions
            .get(athlete_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn state(&self, athlete_id: &str) -> ResolutionState {
        if !self.is_known(athlete_id) {
            return ResolutionState::Unseen;
        }
        ResolutionState::from_editions(self.editions(athlete_id))
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Athletes with at least one edition of this season.
    pub fn matched_count(&self) -> usize {
        self.editions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(athlete_id: &str, games: &str) -> ResultRow {
        ResultRow {
            athlete_id: athlete_id.to_string(),
            games: games.to_string(),
        }
    }

    #[test]
    fn test_only_exact_editions_from_min_year() {
        let rows = vec![
            row("1", "1920 Winter Olympics"),
            row("1", "1924 Winter Olympics"),
            row("1", "1924 Winter Youth Olympics"),
            row("1", "1924 Winter Olympics"),
        ];
        let index = SeasonLookupIndex::build([rows.as_slice()], Season::Winter, 1924);
        assert_eq!(index.editions("1"), vec![GamesEdition::new(1924, Season::Winter)]);
    }

    #[test]
    fn test_seen_without_season_match_is_resolved_empty() {
        let rows = vec![row("7", "2020 Summer Olympics"), row("", "2022 Winter Olympics")];
        let index = SeasonLookupIndex::build([rows.as_slice()], Season::Winter, 1924);

        assert!(index.is_known("7"));
        assert_eq!(index.state("7"), ResolutionState::ResolvedEmpty);
        assert_eq!(index.state("8"), ResolutionState::Unseen);
        assert_eq!(index.seen_count(), 1);
        assert_eq!(index.matched_count(), 0);
    }

    #[test]
    fn test_tables_merge_additively_and_sort() {
        let first = vec![row("3", "2018 Winter Olympics"), row("4", "2016 Summer Olympics")];
        let second = vec![row("3", "2006 Winter Olympics"), row(" 5 ", "2026 Winter Olympics")];
        let index = SeasonLookupIndex::build([first.as_slice(), second.as_slice()], Season::Winter, 1924);

        assert_eq!(
            index.state("3"),
            ResolutionState::ResolvedNonEmpty(vec![
                GamesEdition::new(2006, Season::Winter),
                GamesEdition::new(2018, Season::Winter),
            ])
        );
        assert!(index.is_known("4"));
        assert!(index.is_known("5"));
        assert_eq!(index.matched_count(), 2);
    }
}
