//! Season pipeline: resolve the roster tables and write per-season output

use anyhow::{Context, Result};
use olympians_common::Season;

use super::cache::OutputCache;
use super::index::SeasonLookupIndex;
use super::resolver::{AthleteSeasonResolver, ResolveStats};
use crate::config::PipelineConfig;
use crate::module::olympedia::OlympediaClient;
use crate::module::state::{ALL_STATES_FILE, BORN_ELSEWHERE_FILE, StateGroups, StateReport};
use crate::module::table::{ResultRow, Table, read_lines, read_optional_results, read_results, season_headers};

/// Inputs shared by every season of one run.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub states: Vec<String>,
    pub results: Vec<Vec<ResultRow>>,
    pub state_born: Table,
    pub born_elsewhere: Table,
    pub cache: OutputCache,
}

impl PipelineInputs {
    /// Load mandatory and optional inputs and build the output cache once,
    /// before any season writes to its directory.
    pub async fn load(config: &PipelineConfig) -> Result<Self> {
        let paths = &config.paths;

        let states = read_lines(paths.states_path())
            .await
            .context("Failed to load states list")?;

        let mut results = vec![
            read_results(paths.results_path())
                .await
                .context("Failed to load known results")?,
        ];
        match read_optional_results(paths.extra_results_path()).await? {
            Some(extra) => {
                tracing::info!("Merged {:?}: {} rows", paths.extra_results_path(), extra.len());
                results.push(extra);
            }
            None => tracing::info!("Using {:?} only", paths.results_path()),
        }

        let state_born = Table::read(paths.roster_dir.join(ALL_STATES_FILE))
            .await
            .context("Failed to load state-born roster; run the roster split first")?;
        let born_elsewhere = Table::read(paths.roster_dir.join(BORN_ELSEWHERE_FILE))
            .await
            .context("Failed to load born-elsewhere roster; run the roster split first")?;

        tracing::info!("Building output cache from previous runs...");
        let cache = OutputCache::load(paths).await?;
        tracing::info!(
            "✓ {} winter and {} summer athletes found in existing output (will skip API)",
            cache.len(Season::Winter),
            cache.len(Season::Summer)
        );

        Ok(Self {
            states,
            results,
            state_born,
            born_elsewhere,
            cache,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SeasonSummary {
    pub season: Season,
    pub state_counts: Vec<(String, usize)>,
    pub state_born: usize,
    pub born_elsewhere: usize,
    pub no_match: usize,
    pub stats: ResolveStats,
}

/// Resolve and write one season.
pub async fn run_season(
    config: &PipelineConfig,
    inputs: &PipelineInputs,
    client: &mut OlympediaClient,
    season: Season,
) -> Result<SeasonSummary> {
    let min_year = config.pipeline.min_year;

    let index = SeasonLookupIndex::build(inputs.results.iter().map(Vec::as_slice), season, min_year);
    tracing::info!(
        "{} index: {} athlete ids seen, {} with ≥1 {} entry",
        season,
        index.seen_count(),
        index.matched_count(),
        season
    );

    let mut resolver = AthleteSeasonResolver::new(&index, &inputs.cache, client, min_year);

    tracing::info!("Classifying {}: state-born athletes...", season);
    let state_born = resolver.resolve_all(&inputs.state_born.rows).await;

    tracing::info!("Classifying {}: born-elsewhere athletes...", season);
    let born_elsewhere = resolver.resolve_all(&inputs.born_elsewhere.rows).await;

    let mut stats = state_born.stats;
    stats.known += born_elsewhere.stats.known;
    stats.cached += born_elsewhere.stats.cached;
    stats.scraped += born_elsewhere.stats.scraped;
    stats.matched += born_elsewhere.stats.matched;
    stats.failed += born_elsewhere.stats.failed;

    let mut no_match = state_born.no_match;
    no_match.extend(born_elsewhere.no_match);

    let report = StateReport {
        groups: StateGroups::by_born_state(&inputs.states, state_born.matched),
        born_elsewhere: born_elsewhere.matched,
        no_match: Some(no_match),
    };

    let dir = config.paths.season_dir(season);
    tracing::info!("Writing {} output to {:?}", season, dir);
    report
        .write(
            dir,
            &season_headers(&inputs.state_born.headers),
            &season_headers(&inputs.born_elsewhere.headers),
        )
        .await
        .with_context(|| format!("Failed to write {} output", season))?;

    report.log_summary(season.as_str(), &season.as_str().to_lowercase());

    Ok(SeasonSummary {
        season,
        state_counts: report
            .groups
            .counts()
            .into_iter()
            .map(|(state, n)| (state.to_string(), n))
            .collect(),
        state_born: report.groups.total(),
        born_elsewhere: report.born_elsewhere.len(),
        no_match: report.no_match.as_ref().map_or(0, Vec::len),
        stats,
    })
}

/// Run `seasons` in order with one client, so every lookup shares one
/// back-off delay.
pub async fn run_seasons_with_client(
    config: &PipelineConfig,
    client: &mut OlympediaClient,
    seasons: &[Season],
) -> Result<Vec<SeasonSummary>> {
    let inputs = PipelineInputs::load(config).await?;

    let mut summaries = Vec::with_capacity(seasons.len());
    for &season in seasons {
        summaries.push(run_season(config, &inputs, client, season).await?);
    }
    Ok(summaries)
}

pub async fn run_seasons(config: &PipelineConfig, seasons: &[Season]) -> Result<Vec<SeasonSummary>> {
    let mut client = OlympediaClient::from_config(config)?;
    run_seasons_with_client(config, &mut client, seasons).await
}

pub async fn run_winter_only(config: &PipelineConfig) -> Result<Vec<SeasonSummary>> {
    run_seasons(config, &[Season::Winter]).await
}

/// Every season listed in the configuration, Winter first by default.
pub async fn run_all_seasons(config: &PipelineConfig) -> Result<Vec<SeasonSummary>> {
    run_seasons(config, &config.pipeline.seasons).await
}
