//! CSV bar file adapter.
//!
//! Expected columns: timestamp,open,high,low,close,volume with timestamps in
//! `YYYY-MM-DD HH:MM:SS` (UTC). Rows are sorted oldest-first on load.

use crate::domain::bar::PriceBar;
use crate::domain::error::TraderError;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvBarAdapter {
    path: PathBuf,
}

impl CsvBarAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load_bars(&self) -> Result<Vec<PriceBar>, TraderError> {
        let content = fs::read_to_string(&self.path).map_err(|e| TraderError::BarData {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Vec<PriceBar>, TraderError> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TraderError::BarData {
                reason: format!("CSV parse error: {}", e),
            })?;

            let timestamp_str = field(&record, 0, "timestamp")?;
            let timestamp = NaiveDateTime::parse_from_str(timestamp_str, "%Y-%m-%d %H:%M:%S")
                .map_err(|e| TraderError::BarData {
                    reason: format!("invalid timestamp {:?}: {}", timestamp_str, e),
                })?
                .and_utc();

            bars.push(PriceBar {
                timestamp,
                open: parse_f64(&record, 1, "open")?,
                high: parse_f64(&record, 2, "high")?,
                low: parse_f64(&record, 3, "low")?,
                close: parse_f64(&record, 4, "close")?,
                volume: field(&record, 5, "volume")?.parse().map_err(|e| {
                    TraderError::BarData {
                        reason: format!("invalid volume value: {}", e),
                    }
                })?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, TraderError> {
    record.get(index).ok_or_else(|| TraderError::BarData {
        reason: format!("missing {} column", name),
    })
}

fn parse_f64(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, TraderError> {
    field(record, index, name)?
        .parse()
        .map_err(|e| TraderError::BarData {
            reason: format!("invalid {} value: {}", name, e),
        })
}
