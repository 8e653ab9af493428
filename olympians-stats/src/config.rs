use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the census and known-results tables
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_census_file")]
    pub census_file: String,

    /// Roster split output (`by-state/<State>.csv`)
    #[serde(default = "default_roster_dir")]
    pub roster_dir: PathBuf,

    #[serde(default = "default_winter_dir")]
    pub winter_dir: PathBuf,

    #[serde(default = "default_summer_dir")]
    pub summer_dir: PathBuf,

    #[serde(default = "default_per_capita_dir")]
    pub per_capita_dir: PathBuf,

    #[serde(default = "default_extra_dir")]
    pub extra_dir: PathBuf,

    /// Known-results tables scanned for medal rows, in order
    #[serde(default = "default_results_files")]
    pub results_files: Vec<String>,

    /// State whose medals are tallied when none is given on the command line
    #[serde(default = "default_medal_state")]
    pub medal_state: String,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("input-data")
}

fn default_census_file() -> String {
    "census-2020.csv".to_string()
}

fn default_roster_dir() -> PathBuf {
    PathBuf::from("output-data")
}

fn default_winter_dir() -> PathBuf {
    PathBuf::from("winter-output-data")
}

fn default_summer_dir() -> PathBuf {
    PathBuf::from("summer-output-data")
}

fn default_per_capita_dir() -> PathBuf {
    PathBuf::from("per-capita")
}

fn default_extra_dir() -> PathBuf {
    PathBuf::from("extra-data")
}

fn default_results_files() -> Vec<String> {
    vec!["results.csv".to_string(), "2024-2026-us-results.csv".to_string()]
}

fn default_medal_state() -> String {
    "Montana".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            census_file: default_census_file(),
            roster_dir: default_roster_dir(),
            winter_dir: default_winter_dir(),
            summer_dir: default_summer_dir(),
            per_capita_dir: default_per_capita_dir(),
            extra_dir: default_extra_dir(),
            results_files: default_results_files(),
            medal_state: default_medal_state(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;

        Ok(config)
    }

    pub fn census_path(&self) -> PathBuf {
        self.input_dir.join(&self.census_file)
    }

    pub fn results_paths(&self) -> Vec<PathBuf> {
        self.results_files.iter().map(|f| self.input_dir.join(f)).collect()
    }

    pub fn state_roster_path(&self, state: &str) -> PathBuf {
        self.roster_dir
            .join("by-state")
            .join(format!("{}.csv", state.replace('/', "-")))
    }
}
