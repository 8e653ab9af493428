//! Athlete-season resolution
//!
//! - `SeasonLookupIndex`: editions per athlete from known-results tables
//! - `OutputCache`: positive answers from earlier runs' output
//! - `AthleteSeasonResolver`: index, then cache, then live lookup
//! - `pipeline`: per-season orchestration and output

mod cache;
pub use cache::{MATCHED_FILES, OutputCache};

mod index;
pub use index::SeasonLookupIndex;

mod resolver;
pub use resolver::{AthleteSeasonResolver, Outcome, ResolveStats, SeasonResolution, Tier};

pub mod pipeline;
pub use pipeline::{
    PipelineInputs, SeasonSummary, run_all_seasons, run_season, run_seasons, run_seasons_with_client,
    run_winter_only,
};
