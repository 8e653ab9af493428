//! Per-athlete season resolution
//!
//! Each athlete is resolved once per season, first match wins:
//! the known-results index, then the output cache, then a live lookup on
//! olympedia.org. Athletes are processed strictly in input order.

use olympians_common::{AthleteRecord, GamesEdition, ResolutionState, Season};

use super::cache::OutputCache;
use super::index::SeasonLookupIndex;
use crate::module::olympedia::{LookupError, OlympediaClient};

/// Where an athlete's answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Known,
    Cached,
    Scraped,
}

#[derive(Debug)]
pub enum Outcome {
    Resolved { tier: Tier, state: ResolutionState },
    /// The live lookup failed; the athlete goes to the no-match table.
    Failed(LookupError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub known: usize,
    pub cached: usize,
    pub scraped: usize,
    pub matched: usize,
    pub failed: usize,
}

impl ResolveStats {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Resolved { tier, state } => {
                match tier {
                    Tier::Known => self.known += 1,
                    Tier::Cached => self.cached += 1,
                    Tier::Scraped => self.scraped += 1,
                }
                if !state.editions().is_empty() {
                    self.matched += 1;
                }
            }
            Outcome::Failed(_) => {
                self.scraped += 1;
                self.failed += 1;
            }
        }
    }
}

/// Output of resolving one roster table for one season.
#[derive(Debug, Default)]
pub struct SeasonResolution {
    /// Athletes with at least one edition, `Games` filled in, input order.
    pub matched: Vec<AthleteRecord>,
    /// Athletes whose live lookup failed, `Games` left empty.
    pub no_match: Vec<AthleteRecord>,
    pub stats: ResolveStats,
}

pub struct AthleteSeasonResolver<'a> {
    index: &'a SeasonLookupIndex,
    cache: &'a OutputCache,
    client: &'a mut OlympediaClient,
    season: Season,
    min_year: u16,
}

impl<'a> AthleteSeasonResolver<'a> {
    pub fn new(
        index: &'a SeasonLookupIndex,
        cache: &'a OutputCache,
        client: &'a mut OlympediaClient,
        min_year: u16,
    ) -> Self {
        Self {
            index,
            cache,
            client,
            season: index.season(),
            min_year,
        }
    }

    /// Answer from the index or the cache, without touching the network.
    pub fn offline_state(&self, athlete_id: &str) -> Option<(Tier, ResolutionState)> {
        if self.index.is_known(athlete_id) {
            return Some((Tier::Known, self.index.state(athlete_id)));
        }
        match self.cache.state(athlete_id, self.season) {
            ResolutionState::Unseen => None,
            state => Some((Tier::Cached, state)),
        }
    }

    pub async fn resolve(&mut self, record: &AthleteRecord) -> Outcome {
        if let Some((tier, state)) = self.offline_state(record.athlete_id()) {
            return Outcome::Resolved { tier, state };
        }

        match self.scrape(record).await {
            Ok(editions) => Outcome::Resolved {
                tier: Tier::Scraped,
                state: ResolutionState::from_editions(editions),
            },
            Err(e) => Outcome::Failed(e),
        }
    }

    async fn scrape(&mut self, record: &AthleteRecord) -> Result<Vec<GamesEdition>, LookupError> {
        let athlete_id = record.athlete_id();
        if athlete_id.is_empty() {
            self.client
                .search_athlete_editions(record.used_name(), self.season, self.min_year)
                .await
        } else {
            Ok(self
                .client
                .athlete_editions(athlete_id, self.season, self.min_year)
                .await?)
        }
    }

    /// Resolve every record in order. One athlete's failure never stops the
    /// others.
    pub async fn resolve_all(&mut self, records: &[AthleteRecord]) -> SeasonResolution {
        let to_scrape = records
            .iter()
            .filter(|record| self.offline_state(record.athlete_id()).is_none())
            .count();
        let label = self.season.as_str().to_lowercase();

        if to_scrape > 0 {
            tracing::info!("{} athletes need a live {} lookup on olympedia.org", to_scrape, label);
        } else {
            tracing::info!("No athletes required a live lookup for {}", self.season);
        }

        let mut resolution = SeasonResolution::default();
        let mut scraped = 0;

        for record in records {
            let outcome = self.resolve(record).await;
            resolution.stats.record(&outcome);

            match outcome {
                Outcome::Resolved { tier, state } => {
                    if tier == Tier::Scraped {
                        scraped += 1;
                        match state.editions() {
                            [] => tracing::info!(
                                "[{}/{}] {} ({}): not {}",
                                scraped,
                                to_scrape,
                                record.athlete_id(),
                                record.used_name(),
                                label
                            ),
                            editions => tracing::info!(
                                "[{}/{}] {} ({}): {}: {}",
                                scraped,
                                to_scrape,
                                record.athlete_id(),
                                record.used_name(),
                                self.season.as_str().to_uppercase(),
                                GamesEdition::join(editions)
                            ),
                        }
                    }
                    if !state.editions().is_empty() {
                        resolution.matched.push(record.with_games(state.editions()));
                    }
                }
                Outcome::Failed(e) => {
                    scraped += 1;
                    tracing::warn!(
                        "[{}/{}] {} ({}): FAILED, adding to no-match: {}",
                        scraped,
                        to_scrape,
                        record.athlete_id(),
                        record.used_name(),
                        e
                    );
                    resolution.no_match.push(record.with_games(&[]));
                }
            }
        }

        if resolution.stats.cached > 0 {
            tracing::info!(
                "{} athletes resolved from output cache (no API call)",
                resolution.stats.cached
            );
        }
        resolution
    }
}
