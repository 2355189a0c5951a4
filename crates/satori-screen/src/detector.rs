//! Decides whether a new snapshot is worth a physical refresh.

use crate::history::{HistoryLog, HistoryStore};
use crate::snapshot::Snapshot;
use crate::store::StoreError;
use crate::thresholds::ChangeThresholds;

/// History retention and pruning cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub retention_secs: u64,
    pub prune_interval_secs: u64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            retention_secs: 24 * 3600,
            prune_interval_secs: 3600,
        }
    }
}

pub struct ChangeDetector<H> {
    thresholds: ChangeThresholds,
    policy: RetentionPolicy,
    history: HistoryLog,
    store: H,
    previous: Option<Snapshot>,
    last_prune: u64,
}

impl<H: HistoryStore> ChangeDetector<H> {
    /// Load history from `store`. An unreadable log starts over empty.
    ///
    /// The newest entry becomes the last displayed snapshot, since the panel
    /// still shows it after a restart.
    pub fn load(mut store: H, thresholds: ChangeThresholds, policy: RetentionPolicy, now: u64) -> Self {
        let history = match store.load() {
            Ok(history) => {
                log::info!("Loaded {} history entries", history.len());
                history
            }
            Err(err) => {
                log::warn!("History unreadable, starting fresh: {}", err);
                HistoryLog::new()
            }
        };
        let previous = history.last().cloned();
        Self {
            thresholds,
            policy,
            history,
            store,
            previous,
            last_prune: now,
        }
    }

    /// Last snapshot that reached the panel
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn thresholds(&self) -> &ChangeThresholds {
        &self.thresholds
    }

    pub fn significant(&self, previous: Option<&Snapshot>, candidate: &Snapshot) -> bool {
        let Some(previous) = previous else {
            return true;
        };
        match self.thresholds.first_exceeded(previous, candidate) {
            Some(field) => {
                log::info!("Significant change in {}", field.name());
                true
            }
            None => false,
        }
    }

    /// Accept `candidate` as displayed: append and persist.
    ///
    /// The in-memory state is updated even when saving fails.
    pub fn record(&mut self, candidate: Snapshot) -> Result<(), StoreError> {
        self.history.push(candidate.clone());
        self.previous = Some(candidate);
        self.store.save(&self.history)
    }

    /// Remove entries older than the retention window. Returns the number
    /// removed.
    pub fn prune(&mut self, now: u64) -> Result<usize, StoreError> {
        let cutoff = now.saturating_sub(self.policy.retention_secs);
        let removed = self.history.prune(cutoff);
        self.last_prune = now;
        if removed > 0 {
            log::info!("Pruned {} history entries", removed);
            self.store.save(&self.history)?;
        }
        Ok(removed)
    }

    /// Prune when the cadence interval has elapsed; call every tick
    pub fn prune_if_due(&mut self, now: u64) -> Result<usize, StoreError> {
        if now.saturating_sub(self.last_prune) < self.policy.prune_interval_secs {
            return Ok(0);
        }
        self.prune(now)
    }

    pub fn store(&self) -> &H {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::snapshot::AssetBalances;

    fn base() -> Snapshot {
        Snapshot {
            timestamp: 1_000,
            balance: 100.0,
            asset_balances: AssetBalances {
                satori: 50.0,
                lollipop: 1.0,
            },
            price: Some(2.0),
            neuron_version: Some("0.3.1".into()),
            competing_neuron_count: Some(1200),
            stake_requirement: Some(10.0),
        }
    }

    fn detector() -> ChangeDetector<MemoryHistoryStore> {
        ChangeDetector::load(
            MemoryHistoryStore::new(),
            ChangeThresholds::default(),
            RetentionPolicy::default(),
            0,
        )
    }

    #[test]
    fn no_previous_is_significant() {
        assert!(detector().significant(None, &base()));
    }

    #[test]
    fn within_all_thresholds_is_not_significant() {
        let d = detector();
        let mut next = base();
        next.balance = 100.9;
        next.asset_balances.satori = 50.4;
        next.asset_balances.lollipop = 7.0;
        next.price = Some(2.0019);
        next.stake_requirement = Some(10.09);
        next.neuron_version = Some("0.4.0".into());
        assert!(!d.significant(Some(&base()), &next));
    }

    #[test]
    fn each_field_triggers_in_isolation() {
        let d = detector();
        let cases: [fn(&mut Snapshot); 5] = [
            |s| s.balance = 101.5,
            |s| s.asset_balances.satori = 50.6,
            |s| s.price = Some(2.003),
            |s| s.competing_neuron_count = Some(1201),
            |s| s.stake_requirement = Some(10.2),
        ];
        for mutate in cases {
            let mut next = base();
            mutate(&mut next);
            assert!(d.significant(Some(&base()), &next), "{:?}", next);
        }
    }

    #[test]
    fn zero_balance_regression() {
        let d = detector();
        let mut old = base();
        old.balance = 0.0;
        let mut same = old.clone();
        same.timestamp += 60;
        assert!(!d.significant(Some(&old), &same));

        let mut funded = old.clone();
        funded.balance = 0.01;
        assert!(d.significant(Some(&old), &funded));
    }

    #[test]
    fn missing_optional_fields_never_trigger() {
        let d = detector();
        let mut old = base();
        old.price = None;
        old.competing_neuron_count = None;
        let mut next = base();
        next.price = Some(99.0);
        next.competing_neuron_count = Some(1);
        next.stake_requirement = None;
        assert!(!d.significant(Some(&old), &next));
        assert!(!d.significant(Some(&next), &old));
    }

    #[test]
    fn record_persists_and_becomes_previous() {
        let mut d = detector();
        d.record(base()).unwrap();
        assert_eq!(d.previous(), Some(&base()));
        assert_eq!(d.store().saves, 1);
        assert_eq!(d.history().len(), 1);
    }

    #[test]
    fn restart_restores_previous_from_history() {
        let mut d = detector();
        let mut older = base();
        older.timestamp = 500;
        d.record(older).unwrap();
        d.record(base()).unwrap();
        let json = d.store().json.clone().unwrap();

        let restored = ChangeDetector::load(
            MemoryHistoryStore::with_json(json),
            ChangeThresholds::default(),
            RetentionPolicy::default(),
            2_000,
        );
        assert_eq!(restored.previous(), Some(&base()));
        assert_eq!(restored.history().len(), 2);
    }

    #[test]
    fn corrupt_history_starts_empty() {
        let d = ChangeDetector::load(
            MemoryHistoryStore::with_json("[{"),
            ChangeThresholds::default(),
            RetentionPolicy::default(),
            0,
        );
        assert!(d.history().is_empty());
        assert!(d.previous().is_none());
    }

    #[test]
    fn prune_removes_expired_entries_only() {
        let mut d = detector();
        for ts in [10, 3_600, 90_000, 100_000] {
            let mut s = base();
            s.timestamp = ts;
            d.record(s).unwrap();
        }
        let now = 100_000;
        assert_eq!(d.prune(now).unwrap(), 2);
        let kept: Vec<u64> = d.history().entries().iter().map(|e| e.timestamp).collect();
        assert_eq!(kept, vec![90_000, 100_000]);
        // previous is what the panel shows, pruning does not touch it
        assert_eq!(d.previous().map(|s| s.timestamp), Some(100_000));
    }

    #[test]
    fn prune_runs_on_cadence() {
        let mut d = detector();
        let mut s = base();
        s.timestamp = 0;
        d.record(s).unwrap();

        assert_eq!(d.prune_if_due(3_599).unwrap(), 0);
        assert_eq!(d.history().len(), 1);
        // Due, but nothing is older than 24 h yet
        assert_eq!(d.prune_if_due(3_600).unwrap(), 0);
        assert_eq!(d.prune_if_due(90_000).unwrap(), 1);
        assert!(d.history().is_empty());
    }
}
