//! Minimum interval between physical refreshes.
//!
//! The panel manufacturer forbids refreshing more often than every few
//! minutes. The timestamp of the last successful refresh is persisted so the
//! limit also holds across restarts.

use std::path::PathBuf;

use crate::store::{read_optional, write_replace, StoreError};

/// Manufacturer minimum between two refreshes
pub const DEFAULT_MIN_INTERVAL_SECS: u64 = 300;

/// Storage for the last-refresh timestamp
pub trait GateStore {
    fn load_last_refresh(&mut self) -> Result<Option<u64>, StoreError>;
    fn save_last_refresh(&mut self, timestamp: u64) -> Result<(), StoreError>;
}

/// Outcome of a gate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Open,
    Closed { remaining_secs: u64 },
}

pub struct RefreshGate<S> {
    store: S,
    min_interval_secs: u64,
}

impl<S: GateStore> RefreshGate<S> {
    pub fn new(store: S, min_interval_secs: u64) -> Self {
        Self {
            store,
            min_interval_secs,
        }
    }

    pub fn check(&mut self, now: u64) -> GateDecision {
        let last = match self.store.load_last_refresh() {
            Ok(Some(last)) => last,
            Ok(None) => return GateDecision::Open,
            Err(err) => {
                log::warn!("Last refresh time unreadable, allowing refresh: {}", err);
                return GateDecision::Open;
            }
        };

        // A stamp further ahead than one interval cannot come from this clock
        if last > now.saturating_add(self.min_interval_secs) {
            log::warn!("Last refresh time {} is in the future (now {})", last, now);
            return GateDecision::Open;
        }

        let elapsed = now.saturating_sub(last);
        if elapsed >= self.min_interval_secs {
            GateDecision::Open
        } else {
            GateDecision::Closed {
                remaining_secs: self.min_interval_secs - elapsed,
            }
        }
    }

    /// Record a successful refresh at `now`
    pub fn mark(&mut self, now: u64) -> Result<(), StoreError> {
        self.store.save_last_refresh(now)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Timestamp as plain decimal text in a single file
pub struct FileGateStore {
    path: PathBuf,
}

impl FileGateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GateStore for FileGateStore {
    fn load_last_refresh(&mut self) -> Result<Option<u64>, StoreError> {
        let Some(raw) = read_optional(&self.path)? else {
            return Ok(None);
        };
        parse_timestamp(&raw).map(Some)
    }

    fn save_last_refresh(&mut self, timestamp: u64) -> Result<(), StoreError> {
        write_replace(&self.path, &timestamp.to_string())
    }
}

/// Accepts integer or fractional seconds
fn parse_timestamp(raw: &str) -> Result<u64, StoreError> {
    let trimmed = raw.trim();
    if let Ok(secs) = trimmed.parse::<u64>() {
        return Ok(secs);
    }
    match trimmed.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs as u64),
        _ => Err(StoreError::Corrupt(format!("bad timestamp {:?}", trimmed))),
    }
}

/// In-memory gate store
#[derive(Debug, Default)]
pub struct MemoryGateStore {
    pub last_refresh: Option<u64>,
    pub saves: usize,
}

impl GateStore for MemoryGateStore {
    fn load_last_refresh(&mut self) -> Result<Option<u64>, StoreError> {
        Ok(self.last_refresh)
    }

    fn save_last_refresh(&mut self, timestamp: u64) -> Result<(), StoreError> {
        self.last_refresh = Some(timestamp);
        self.saves += 1;
        Ok(())
    }
}
