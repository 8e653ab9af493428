use serde::{Deserialize, Serialize};

/// Olympic season, resolved independently of each other.
///
/// Variant order matches the lexicographic order of the edition labels, so
/// derived orderings agree with sorting the label strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    pub const ALL: [Season; 2] = [Season::Winter, Season::Summer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Winter => "Winter",
        }
    }

    /// Exact, case-sensitive match against the label used in edition names.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Summer" => Some(Season::Summer),
            "Winter" => Some(Season::Winter),
            _ => None,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown season: {0}")]
pub struct ParseSeasonError(pub String);

impl std::str::FromStr for Season {
    type Err = ParseSeasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summer" => Ok(Season::Summer),
            "winter" => Ok(Season::Winter),
            _ => Err(ParseSeasonError(s.to_string())),
        }
    }
}

/// One edition of the Games, rendered as `"<year> <Season> Olympics"`.
///
/// Ordering is chronological, which for four-digit years is the same as
/// ordering the rendered labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GamesEdition {
    year: u16,
    season: Season,
}

impl GamesEdition {
    pub fn new(year: u16, season: Season) -> Self {
        Self { year, season }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn season(&self) -> Season {
        self.season
    }

    /// Parse a full edition label. Anything other than exactly
    /// `"<4 digits> <Winter|Summer> Olympics"` is rejected, including
    /// derivative editions such as `"1924 Winter Youth Olympics"`.
    pub fn parse(label: &str) -> Option<Self> {
        let (edition, rest) = Self::parse_prefix(label)?;
        rest.is_empty().then_some(edition)
    }

    /// Parse an edition label at the start of `text`, returning the edition
    /// and whatever follows it (e.g. a host city in parentheses).
    pub fn parse_prefix(text: &str) -> Option<(Self, &str)> {
        let year_str = text.get(..4)?;
        if !year_str.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: u16 = year_str.parse().ok()?;

        let rest = text[4..].strip_prefix(' ')?;
        let (label, rest) = rest.split_once(' ')?;
        let season = Season::from_label(label)?;
        let rest = rest.strip_prefix("Olympics")?;

        Some((Self { year, season }, rest))
    }

    /// Join editions the way the output tables store them.
    pub fn join(editions: &[GamesEdition]) -> String {
        editions
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl std::fmt::Display for GamesEdition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} Olympics", self.year, self.season)
    }
}

/// Per-athlete, per-season answer to "which editions did they compete in".
///
/// `Unseen` must be resolved (cache or live lookup). The two resolved
/// variants are terminal and must never trigger another lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolutionState {
    #[default]
    Unseen,
    ResolvedEmpty,
    ResolvedNonEmpty(Vec<GamesEdition>),
}

impl ResolutionState {
    /// Build a resolved state from a list of editions, sorted and deduplicated.
    pub fn from_editions(mut editions: Vec<GamesEdition>) -> Self {
        editions.sort();
        editions.dedup();
        if editions.is_empty() {
            ResolutionState::ResolvedEmpty
        } else {
            ResolutionState::ResolvedNonEmpty(editions)
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, ResolutionState::Unseen)
    }

    pub fn editions(&self) -> &[GamesEdition] {
        match self {
            ResolutionState::ResolvedNonEmpty(editions) => editions,
            _ => &[],
        }
    }

    /// Union with more editions. Merging into `Unseen` resolves the state.
    pub fn merge(self, more: impl IntoIterator<Item = GamesEdition>) -> Self {
        let mut editions = match self {
            ResolutionState::ResolvedNonEmpty(editions) => editions,
            _ => Vec::new(),
        };
        editions.extend(more);
        Self::from_editions(editions)
    }
}
