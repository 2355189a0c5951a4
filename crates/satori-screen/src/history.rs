//! Rolling log of displayed snapshots.
//!
//! The log is the only state that survives the hourly restart, so it also
//! seeds the change detector's "last displayed" reading at boot.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;
use crate::store::{read_optional, write_replace, StoreError};

/// Ordered, append-only sequence of accepted snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<Snapshot>,
}

/// Min / max / mean of one series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl SeriesStats {
    fn from_values(values: impl Iterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        (count > 0).then(|| Self {
            min,
            max,
            avg: sum / count as f64,
        })
    }
}

/// Statistics over the whole log
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryStats {
    pub satori_balance: SeriesStats,
    /// `None` when no entry carried a price
    pub price: Option<SeriesStats>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Snapshot>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.push(snapshot);
    }

    /// Drop every entry with `timestamp < cutoff`, keeping order. Returns
    /// how many were removed.
    pub fn prune(&mut self, cutoff: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.timestamp >= cutoff);
        before - self.entries.len()
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn statistics(&self) -> Option<HistoryStats> {
        let satori_balance =
            SeriesStats::from_values(self.entries.iter().map(|e| e.asset_balances.satori))?;
        let price = SeriesStats::from_values(self.entries.iter().filter_map(|e| e.price));
        Some(HistoryStats {
            satori_balance,
            price,
        })
    }

    /// Percent change from the oldest priced entry at or after `since` to
    /// `current`.
    pub fn price_change_percent(&self, current: f64, since: u64) -> Option<f64> {
        let base = self
            .entries
            .iter()
            .filter(|e| e.timestamp >= since)
            .find_map(|e| e.price)?;
        if base == 0.0 {
            return None;
        }
        Some((current - base) / base * 100.0)
    }
}

/// Trait for history persistence
///
/// Implementations:
/// - `FileHistoryStore` for the device flash filesystem
/// - `MemoryHistoryStore` for tests
pub trait HistoryStore {
    /// Load the saved log; a missing file is an empty log
    fn load(&mut self) -> Result<HistoryLog, StoreError>;

    /// Replace the saved log
    fn save(&mut self, log: &HistoryLog) -> Result<(), StoreError>;
}

/// History kept as a JSON array in a single file
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&mut self) -> Result<HistoryLog, StoreError> {
        match read_optional(&self.path)? {
            Some(json) => {
                HistoryLog::from_json(&json).map_err(|err| StoreError::Corrupt(err.to_string()))
            }
            None => Ok(HistoryLog::new()),
        }
    }

    fn save(&mut self, log: &HistoryLog) -> Result<(), StoreError> {
        let json = log
            .to_json()
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        write_replace(&self.path, &json)
    }
}

/// In-memory history store
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    /// Serialized log as last saved
    pub json: Option<String>,
    pub saves: usize,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
            saves: 0,
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&mut self) -> Result<HistoryLog, StoreError> {
        match &self.json {
            Some(json) => {
                HistoryLog::from_json(json).map_err(|err| StoreError::Corrupt(err.to_string()))
            }
            None => Ok(HistoryLog::new()),
        }
    }

    fn save(&mut self, log: &HistoryLog) -> Result<(), StoreError> {
        self.json = Some(
            log.to_json()
                .map_err(|err| StoreError::Corrupt(err.to_string()))?,
        );
        self.saves += 1;
        Ok(())
    }
}
