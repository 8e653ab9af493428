//! olympedia.org page parser
//!
//! Only anchors matter here: edition links on athlete profiles and profile
//! links on quick-search result pages.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, CharacterTokens, EndTag, StartTag, TagToken, Token, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};
use olympians_common::{GamesEdition, Season};
use regex::Regex;
use std::cell::RefCell;
use std::sync::LazyLock;

use super::types::PageLink;

const EDITION_HREF_PREFIX: &str = "/editions/";

static PROFILE_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/athletes/(\d+)$").expect("Invalid profile href regex"));

/// Collects anchors from the token stream. A link is only emitted on its
/// `</a>`; a nested `<a>` discards the open one.
#[derive(Default)]
struct LinkSink {
    links: RefCell<Vec<PageLink>>,
    open: RefCell<Option<PageLink>>,
}

impl TokenSink for LinkSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            TagToken(tag) if &*tag.name == "a" => match tag.kind {
                StartTag => {
                    let href = tag
                        .attrs
                        .iter()
                        .find(|attr| &*attr.name.local == "href")
                        .map(|attr| attr.value.to_string())
                        .unwrap_or_default();
                    *self.open.borrow_mut() = Some(PageLink { href, text: String::new() });
                }
                EndTag => {
                    if let Some(mut link) = self.open.borrow_mut().take() {
                        link.text = link.text.trim().to_string();
                        self.links.borrow_mut().push(link);
                    }
                }
            },
            CharacterTokens(text) => {
                if let Some(link) = self.open.borrow_mut().as_mut() {
                    link.text.push_str(&text);
                }
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

/// Every closed anchor in `html` as (href, text), in document order.
///
/// Text is the concatenation of all text inside the anchor, nested markup
/// ignored, trimmed. Anchors without `href` yield an empty href. An anchor
/// still open at end of input is never emitted, and an `<a>` inside an open
/// anchor replaces it. Malformed markup never fails.
pub fn extract_links(html: &str) -> Vec<PageLink> {
    let tokenizer = Tokenizer::new(LinkSink::default(), TokenizerOpts::default());
    let input = BufferQueue::default();
    input.push_back(StrTendril::from(html));

    // The sink never asks for a script pause, so one feed drains the queue.
    let _ = tokenizer.feed(&input);
    tokenizer.end();

    tokenizer.sink.links.take()
}

/// Distinct editions of `season` (year ≥ `min_year`) linked from a profile page,
/// sorted ascending. An empty result is a valid "no editions" answer.
pub fn editions_from_links(links: &[PageLink], season: Season, min_year: u16) -> Vec<GamesEdition> {
    let mut editions: Vec<GamesEdition> = links
        .iter()
        .filter(|link| link.href.starts_with(EDITION_HREF_PREFIX))
        .filter_map(|link| GamesEdition::parse_prefix(&link.text))
        .map(|(edition, _)| edition)
        .filter(|edition| edition.season() == season && edition.year() >= min_year)
        .collect();

    editions.sort();
    editions.dedup();
    editions
}

/// Athlete ids of every profile link, in page order.
pub fn profile_ids_from_links(links: &[PageLink]) -> Vec<String> {
    links
        .iter()
        .filter_map(|link| PROFILE_HREF.captures(&link.href))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Normalise a display name into a search query: the bullet separator used
/// between name parts becomes a space and whitespace is collapsed.
/// Returns `None` when nothing is left to search for.
pub fn search_query(used_name: &str) -> Option<String> {
    let query = used_name
        .replace('•', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    (!query.is_empty()).then_some(query)
}
