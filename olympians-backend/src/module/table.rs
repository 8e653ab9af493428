//! CSV table loading and writing
//!
//! Tables are read whole into memory; malformed rows are skipped with a
//! warning. Writers create parent directories as needed and emit columns in
//! header order, missing fields written empty.

use anyhow::{Context, Result};
use olympians_common::AthleteRecord;
use olympians_common::record::{GAMES, ROLES};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// Header row plus records keyed by those headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<AthleteRecord>,
}

/// One row of a known-results table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultRow {
    #[serde(default)]
    pub athlete_id: String,
    #[serde(rename = "Games", default)]
    pub games: String,
}

impl Table {
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read CSV file: {:?}", path))?;

        let table = Self::parse(&content).with_context(|| format!("Failed to parse CSV file: {:?}", path))?;
        tracing::debug!("Loaded {} rows from {:?}", table.rows.len(), path);
        Ok(table)
    }

    /// Like [`Table::read`], but a missing file yields `None`.
    pub async fn read_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !fs::try_exists(path).await.unwrap_or(false) {
            tracing::info!("{:?} not found, skipping", path);
            return Ok(None);
        }
        Self::read(path).await.map(Some)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .context("Failed to read CSV header row")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            match result {
                Ok(record) => rows.push(AthleteRecord::from_pairs(
                    headers.iter().cloned().zip(record.iter().map(str::to_string)),
                )),
                Err(e) => tracing::warn!("Error parsing CSV row {}: {}", index + 1, e),
            }
        }

        Ok(Self { headers, rows })
    }

    pub async fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        write_records(path, &self.headers, &self.rows).await
    }
}

/// Output headers for season tables: `Roles` becomes `Games`, or `Games` is
/// prepended when neither column exists.
pub fn season_headers(headers: &[String]) -> Vec<String> {
    let mut out = headers.to_vec();
    if out.iter().any(|h| h == GAMES) {
        return out;
    }
    match out.iter().position(|h| h == ROLES) {
        Some(index) => out[index] = GAMES.to_string(),
        None => out.insert(0, GAMES.to_string()),
    }
    out
}

pub async fn read_results(path: impl AsRef<Path>) -> Result<Vec<ResultRow>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read results file: {:?}", path))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<ResultRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!("Error parsing results row {} in {:?}: {}", index + 1, path, e),
        }
    }

    tracing::debug!("Loaded {} result rows from {:?}", rows.len(), path);
    Ok(rows)
}

pub async fn read_optional_results(path: impl AsRef<Path>) -> Result<Option<Vec<ResultRow>>> {
    let path = path.as_ref();
    if !fs::try_exists(path).await.unwrap_or(false) {
        tracing::info!("{:?} not found, skipping", path);
        return Ok(None);
    }
    read_results(path).await.map(Some)
}

/// Non-empty, trimmed lines of a text file.
pub async fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub async fn write_records(path: impl AsRef<Path>, headers: &[String], rows: &[AthleteRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(headers.iter().map(|h| row.get(h)))?;
    }
    write_bytes(path, writer).await
}

pub async fn write_rows<H, R, F>(path: impl AsRef<Path>, headers: H, rows: R) -> Result<()>
where
    H: IntoIterator,
    H::Item: AsRef<[u8]>,
    R: IntoIterator<Item = Vec<F>>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    write_bytes(path, writer).await
}

async fn write_bytes(path: impl AsRef<Path>, writer: csv::Writer<Vec<u8>>) -> Result<()> {
    let path = path.as_ref();
    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_keeps_header_order() {
        let table = Table::parse("athlete_id,Used name,Born\n1,Jane•DOE,\"1 May 1990 in Helena, Montana (USA)\"\n").unwrap();
        assert_eq!(table.headers, vec!["athlete_id", "Used name", "Born"]);
        assert_eq!(table.rows[0].athlete_id(), "1");
        assert_eq!(table.rows[0].born(), "1 May 1990 in Helena, Montana (USA)");
    }

    #[test]
    fn test_season_headers() {
        let h = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        assert_eq!(season_headers(&h(&["Roles", "Sex"])), h(&["Games", "Sex"]));
        assert_eq!(season_headers(&h(&["Sex"])), h(&["Games", "Sex"]));
        assert_eq!(season_headers(&h(&["Sex", "Games"])), h(&["Sex", "Games"]));
    }

    #[tokio::test]
    async fn test_write_records_in_header_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.csv");
        let headers = vec!["athlete_id".to_string(), "Games".to_string()];
        let rows = vec![AthleteRecord::from_pairs([("athlete_id", "9"), ("Extra", "dropped")])];

        write_records(&path, &headers, &rows).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "athlete_id,Games\n9,\n");
    }

    #[tokio::test]
    async fn test_read_results_and_optional_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        std::fs::write(
            &path,
            "Games,Event,athlete_id\n2022 Winter Olympics,Slalom,5\n2020 Summer Olympics,100 m,\n",
        )
        .unwrap();

        let rows = read_results(&path).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].athlete_id, "5");
        assert_eq!(rows[0].games, "2022 Winter Olympics");
        assert_eq!(rows[1].athlete_id, "");

        assert!(read_optional_results(dir.path().join("absent.csv")).await.unwrap().is_none());
        assert!(Table::read_optional(dir.path().join("absent.csv")).await.unwrap().is_none());
        assert!(Table::read(dir.path().join("absent.csv")).await.is_err());
    }

    #[tokio::test]
    async fn test_read_lines_skips_blanks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("states.txt");
        std::fs::write(&path, "Montana\n\n  Wyoming  \n").unwrap();
        assert_eq!(read_lines(&path).await.unwrap(), vec!["Montana", "Wyoming"]);
    }
}
