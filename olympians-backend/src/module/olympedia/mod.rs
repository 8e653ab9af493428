//! olympedia.org access
//!
//! - `RateLimitedFetcher`: throttled GET with shared exponential back-off
//! - `parser`: anchor extraction and edition / profile-link recognition
//! - `OlympediaClient`: profile and name-search lookups built on both

mod client;
mod fetcher;
pub mod parser;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{LookupError, OlympediaClient};
pub use fetcher::{
    BackoffPolicy, FetchError, HttpTransport, PageResponse, PageTransport, RateLimitedFetcher,
    Sleeper, TokioSleeper,
};
pub use types::PageLink;
