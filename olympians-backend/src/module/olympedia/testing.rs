//! In-memory transport and sleeper for tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::fetcher::{BackoffPolicy, PageResponse, PageTransport, RateLimitedFetcher, Sleeper};

#[derive(Clone)]
enum Scripted {
    Response(u16, String),
    Failure(String),
}

#[derive(Default)]
struct ScriptState {
    queued: HashMap<String, VecDeque<Scripted>>,
    always: HashMap<String, Scripted>,
    calls: Vec<String>,
}

/// Transport answering from per-URL scripts. Queued answers are consumed in
/// order; `respond_always` answers are used once the queue for a URL is empty.
/// Unscripted URLs fail like a connection error.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.push(url, Scripted::Response(status, body.to_string()));
    }

    pub fn fail(&self, url: &str, reason: &str) {
        self.push(url, Scripted::Failure(reason.to_string()));
    }

    pub fn respond_always(&self, url: &str, status: u16, body: &str) {
        self.state
            .lock()
            .unwrap()
            .always
            .insert(url.to_string(), Scripted::Response(status, body.to_string()));
    }

    fn push(&self, url: &str, scripted: Scripted) {
        self.state
            .lock()
            .unwrap()
            .queued
            .entry(url.to_string())
            .or_default()
            .push_back(scripted);
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl PageTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> anyhow::Result<PageResponse> {
        let scripted = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(url.to_string());
            let queued = state.queued.get_mut(url).and_then(VecDeque::pop_front);
            queued.or_else(|| state.always.get(url).cloned())
        };

        match scripted {
            Some(Scripted::Response(status, body)) => Ok(PageResponse { status, body }),
            Some(Scripted::Failure(reason)) => Err(anyhow::anyhow!(reason)),
            None => Err(anyhow::anyhow!("no scripted response for {}", url)),
        }
    }
}

/// Sleeper that returns immediately and remembers every requested delay.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Fetcher over a scripted transport with millisecond delays.
pub fn scripted_fetcher(transport: &ScriptedTransport) -> RateLimitedFetcher {
    RateLimitedFetcher::new(
        Box::new(transport.clone()),
        Box::new(RecordingSleeper::new()),
        BackoffPolicy {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(8),
            max_attempts: 3,
        },
    )
}
