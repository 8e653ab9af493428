//! olympedia.org client: athlete profile and quick-search lookups

use olympians_common::{GamesEdition, Season};

use super::fetcher::{FetchError, RateLimitedFetcher};
use super::parser::{editions_from_links, extract_links, profile_ids_from_links, search_query};
use crate::config::PipelineConfig;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Name {0:?} is empty once normalised")]
    EmptyName(String),

    #[error("None of {candidates} profile link(s) for {query:?} could be read")]
    NoCandidate { query: String, candidates: usize },
}

pub struct OlympediaClient {
    fetcher: RateLimitedFetcher,
    base_url: String,
}

impl OlympediaClient {
    pub fn new(fetcher: RateLimitedFetcher, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    pub fn from_config(config: &PipelineConfig) -> anyhow::Result<Self> {
        let fetcher = RateLimitedFetcher::from_config(&config.olympedia, config.backoff.policy())?;
        Ok(Self::new(fetcher, config.olympedia.base_url.clone()))
    }

    pub fn fetcher(&self) -> &RateLimitedFetcher {
        &self.fetcher
    }

    pub fn athlete_url(&self, athlete_id: &str) -> String {
        format!("{}/athletes/{}", self.base_url, athlete_id)
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/athletes/quick_search?query={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    /// Editions of `season` listed on an athlete's profile page.
    pub async fn athlete_editions(
        &mut self,
        athlete_id: &str,
        season: Season,
        min_year: u16,
    ) -> Result<Vec<GamesEdition>, FetchError> {
        let url = self.athlete_url(athlete_id);
        let html = self.fetcher.fetch(&url).await?;
        let links = extract_links(&html);
        Ok(editions_from_links(&links, season, min_year))
    }

    /// Search by display name and read editions from the first profile link
    /// whose page can be fetched. Fails when the search page itself fails or
    /// no candidate profile can be read.
    pub async fn search_athlete_editions(
        &mut self,
        used_name: &str,
        season: Season,
        min_year: u16,
    ) -> Result<Vec<GamesEdition>, LookupError> {
        let query = search_query(used_name).ok_or_else(|| LookupError::EmptyName(used_name.to_string()))?;

        let url = self.search_url(&query);
        let html = self.fetcher.fetch(&url).await?;
        let candidates = profile_ids_from_links(&extract_links(&html));
        tracing::debug!("Search {:?} returned {} profile link(s)", query, candidates.len());

        for athlete_id in &candidates {
            match self.athlete_editions(athlete_id, season, min_year).await {
                Ok(editions) => return Ok(editions),
                Err(e) => tracing::warn!("Candidate {} for {:?} unreadable: {}", athlete_id, query, e),
            }
        }

        Err(LookupError::NoCandidate {
            query,
            candidates: candidates.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::olympedia::testing::{ScriptedTransport, scripted_fetcher};

    const BASE: &str = "https://olympedia.test";

    fn client(transport: &ScriptedTransport) -> OlympediaClient {
        OlympediaClient::new(scripted_fetcher(transport), format!("{}/", BASE))
    }

    #[test]
    fn test_urls() {
        let client = client(&ScriptedTransport::new());
        assert_eq!(client.athlete_url("42"), "https://olympedia.test/athletes/42");
        assert_eq!(
            client.search_url("Jessie Diggins"),
            "https://olympedia.test/athletes/quick_search?query=Jessie%20Diggins"
        );
    }

    #[tokio::test]
    async fn test_athlete_editions_from_profile() {
        let transport = ScriptedTransport::new();
        transport.respond(
            "https://olympedia.test/athletes/42",
            200,
            r#"<a href="/editions/60">2022 Winter Olympics</a><a href="/editions/59">2020 Summer Olympics</a>"#,
        );

        let editions = client(&transport)
            .athlete_editions("42", Season::Winter, 1924)
            .await
            .unwrap();
        assert_eq!(editions, vec![GamesEdition::new(2022, Season::Winter)]);
    }

    #[tokio::test]
    async fn test_search_skips_unreadable_candidates() {
        let transport = ScriptedTransport::new();
        transport.respond(
            "https://olympedia.test/athletes/quick_search?query=Jane%20Doe",
            200,
            r#"<a href="/athletes/1">Jane Doe</a><a href="/athletes/2">Jane Doe</a><a href="/athletes/3">Jane Doe</a>"#,
        );
        transport.respond("https://olympedia.test/athletes/1", 500, "boom");
        transport.respond(
            "https://olympedia.test/athletes/2",
            200,
            r#"<a href="/editions/60">2022 Winter Olympics</a>"#,
        );

        let editions = client(&transport)
            .search_athlete_editions("Jane•Doe", Season::Winter, 1924)
            .await
            .unwrap();
        assert_eq!(editions, vec![GamesEdition::new(2022, Season::Winter)]);
        // The third candidate is never visited.
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_search_first_readable_candidate_wins_even_if_empty() {
        let transport = ScriptedTransport::new();
        transport.respond(
            "https://olympedia.test/athletes/quick_search?query=John%20Roe",
            200,
            r#"<a href="/athletes/7">John Roe</a><a href="/athletes/8">John Roe</a>"#,
        );
        transport.respond(
            "https://olympedia.test/athletes/7",
            200,
            r#"<a href="/editions/61">2021 Summer Olympics</a>"#,
        );

        let editions = client(&transport)
            .search_athlete_editions("John Roe", Season::Winter, 1924)
            .await
            .unwrap();
        assert!(editions.is_empty());
    }

    #[tokio::test]
    async fn test_search_without_readable_candidate_is_failure() {
        let transport = ScriptedTransport::new();
        transport.respond(
            "https://olympedia.test/athletes/quick_search?query=Nobody",
            200,
            "<p>No athletes found</p>",
        );

        let err = client(&transport)
            .search_athlete_editions("Nobody", Season::Winter, 1924)
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::NoCandidate { candidates: 0, .. }));
    }

    #[tokio::test]
    async fn test_search_empty_name_never_fetches() {
        let transport = ScriptedTransport::new();
        let err = client(&transport)
            .search_athlete_editions("  ", Season::Winter, 1924)
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::EmptyName(_)));
        assert_eq!(transport.calls(), 0);
    }
}
