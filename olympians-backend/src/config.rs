use anyhow::Context;
use olympians_common::Season;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use crate::module::olympedia::BackoffPolicy;

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const CONFIG_PATH_ENV: &str = "OLYMPIANS_CONFIG";
const SESSION_COOKIE_ENV: &str = "OLYMPEDIA_SESSION";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub olympedia: OlympediaConfig,

    #[serde(default)]
    pub backoff: BackoffConfig,

    #[serde(default)]
    pub pipeline: SeasonConfig,

    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    /// Where the roster split writes the tables the resolver reads.
    pub roster_dir: PathBuf,
    pub winter_dir: PathBuf,
    pub summer_dir: PathBuf,
    pub results_file: String,
    pub extra_results_file: String,
    pub bios_file: String,
    pub extra_bios_file: String,
    pub states_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OlympediaConfig {
    pub base_url: String,
    pub session_cookie: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonConfig {
    pub min_year: u16,
    pub seasons: Vec<Season>,
    /// Country code expected in parentheses at the end of `Born`.
    pub country_code: String,
    /// Substring of `NOC` marking an athlete as a national.
    pub nationality: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input-data"),
            roster_dir: PathBuf::from("output-data"),
            winter_dir: PathBuf::from("winter-output-data"),
            summer_dir: PathBuf::from("summer-output-data"),
            results_file: "results.csv".to_string(),
            extra_results_file: "2024-2026-us-results.csv".to_string(),
            bios_file: "bios.csv".to_string(),
            extra_bios_file: "2024-2026-us-bios.csv".to_string(),
            states_file: "states-list.txt".to_string(),
        }
    }
}

impl Default for OlympediaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.olympedia.org".to_string(),
            session_cookie: String::new(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                AppleWebKit/537.36 (KHTML, like Gecko) Chrome/145.0.0.0 Safari/537.36"
                .to_string(),
            request_timeout_secs: 20,
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 4_000,
            max_delay_ms: 60_000,
            max_attempts: 6,
        }
    }
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            min_year: 1924,
            seasons: vec![Season::Winter, Season::Summer],
            country_code: "USA".to_string(),
            nationality: "United States".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            paths: PathsConfig::default(),
            olympedia: OlympediaConfig::default(),
            backoff: BackoffConfig::default(),
            pipeline: SeasonConfig::default(),
            source: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config file {:?}", path))?;
        let mut config: PipelineConfig =
            toml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Read `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

impl PathsConfig {
    pub fn results_path(&self) -> PathBuf {
        self.input_dir.join(&self.results_file)
    }

    pub fn extra_results_path(&self) -> PathBuf {
        self.input_dir.join(&self.extra_results_file)
    }

    pub fn bios_path(&self) -> PathBuf {
        self.input_dir.join(&self.bios_file)
    }

    pub fn extra_bios_path(&self) -> PathBuf {
        self.input_dir.join(&self.extra_bios_file)
    }

    pub fn states_path(&self) -> PathBuf {
        self.input_dir.join(&self.states_file)
    }

    pub fn season_dir(&self, season: Season) -> &Path {
        match season {
            Season::Winter => &self.winter_dir,
            Season::Summer => &self.summer_dir,
        }
    }
}

impl OlympediaConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl BackoffConfig {
    pub fn policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_attempts: self.max_attempts.max(1),
        }
    }
}

pub static CONFIG: OnceLock<PipelineConfig> = OnceLock::new();

/// Load the process configuration once.
///
/// The file path comes from `OLYMPIANS_CONFIG`, defaulting to `config.toml`.
/// A missing file yields defaults; a file that fails to parse is an error.
/// `OLYMPEDIA_SESSION` overrides the session cookie from the file.
pub fn read_config() -> anyhow::Result<&'static PipelineConfig> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }

    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = PipelineConfig::load_or_default(&path)
        .with_context(|| format!("Failed to load configuration from {}", path))?;

    if let Ok(cookie) = std::env::var(SESSION_COOKIE_ENV) {
        if !cookie.trim().is_empty() {
            config.olympedia.session_cookie = cookie.trim().to_string();
        }
    }

    Ok(CONFIG.get_or_init(|| config))
}
