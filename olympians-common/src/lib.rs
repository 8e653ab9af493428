pub mod record;
pub mod types;

pub use record::AthleteRecord;
pub use types::{GamesEdition, ParseSeasonError, ResolutionState, Season};
