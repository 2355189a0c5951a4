//! One refresh cycle: gate, aggregate, detect, render, present, persist.
//!
//! ```text
//! Idle -> Gate-check -> (skip | Aggregate -> Detect -> [Render + Present]) -> Idle
//! ```
//!
//! The caller ticks [`Orchestrator::run_cycle`] from its main loop. Nothing
//! touches the panel or the gate timestamp unless the new snapshot differs
//! significantly from the one on screen.

use embedded_hal::delay::DelayNs;
use ssd1680::{FrameBuffer, RefreshKind};

use crate::aggregator::Aggregator;
use crate::clock::format_timestamp;
use crate::detector::ChangeDetector;
use crate::eink::{PanelError, Presenter};
use crate::gate::{GateDecision, GateStore, RefreshGate, DEFAULT_MIN_INTERVAL_SECS};
use crate::history::HistoryStore;
use crate::keepalive::KeepAlive;
use crate::layout::{self, ScreenData};
use crate::settings::Settings;
use crate::snapshot::Snapshot;
use crate::sources::HttpClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub min_refresh_interval_secs: u64,
    /// Main loop period while idle
    pub tick_ms: u32,
    /// Leave the controller powered between refreshes so later frames can
    /// use the partial waveform
    pub keep_panel_awake: bool,
    /// Window for the price change line
    pub price_change_window_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_refresh_interval_secs: DEFAULT_MIN_INTERVAL_SECS,
            tick_ms: 500,
            keep_panel_awake: false,
            price_change_window_secs: 24 * 3600,
        }
    }
}

/// How a cycle ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Last refresh too recent; nothing fetched
    GateClosed { remaining_secs: u64 },
    /// Fetched, but not different enough to refresh
    Unchanged,
    Refreshed { kind: RefreshKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// Panel BUSY never released; the cycle was abandoned
    HardwareTimeout { waited_ms: u32 },
    Panel(PanelError),
}

impl core::fmt::Display for CycleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CycleError::HardwareTimeout { waited_ms } => {
                write!(f, "Panel timed out after {} ms", waited_ms)
            }
            CycleError::Panel(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CycleError {}

impl From<PanelError> for CycleError {
    fn from(err: PanelError) -> Self {
        match err {
            PanelError::Timeout { waited_ms } => CycleError::HardwareTimeout { waited_ms },
            other => CycleError::Panel(other),
        }
    }
}

pub struct Orchestrator<C, D, P, G, H> {
    aggregator: Aggregator<C, D>,
    detector: ChangeDetector<H>,
    gate: RefreshGate<G>,
    presenter: P,
    frame: FrameBuffer<Vec<u8>>,
    settings: Settings,
    config: OrchestratorConfig,
}

impl<C, D, P, G, H> Orchestrator<C, D, P, G, H>
where
    C: HttpClient,
    D: DelayNs,
    P: Presenter,
    G: GateStore,
    H: HistoryStore,
{
    pub fn new(
        aggregator: Aggregator<C, D>,
        detector: ChangeDetector<H>,
        gate: RefreshGate<G>,
        presenter: P,
        frame: FrameBuffer<Vec<u8>>,
        settings: Settings,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            aggregator,
            detector,
            gate,
            presenter,
            frame,
            settings,
            config,
        }
    }

    /// Run one tick at wall-clock time `now`
    pub fn run_cycle<K: KeepAlive>(
        &mut self,
        now: u64,
        keepalive: &mut K,
    ) -> Result<CycleOutcome, CycleError> {
        if let Err(err) = self.detector.prune_if_due(now) {
            log::warn!("History prune not saved: {}", err);
        }

        if let GateDecision::Closed { remaining_secs } = self.gate.check(now) {
            log::debug!("Refresh gate closed for {} s", remaining_secs);
            return Ok(CycleOutcome::GateClosed { remaining_secs });
        }

        keepalive.feed();
        let candidate = self
            .aggregator
            .aggregate(&self.settings.addresses, now, keepalive);

        if !self.detector.significant(self.detector.previous(), &candidate) {
            log::info!("No significant change");
            return Ok(CycleOutcome::Unchanged);
        }

        self.render(&candidate);

        keepalive.feed();
        let kind = match self.presenter.present(self.frame.as_bytes()) {
            Ok(kind) => kind,
            Err(err) => {
                log::error!("Presentation failed: {}", err);
                keepalive.feed();
                if let Err(sleep_err) = self.presenter.sleep() {
                    log::warn!("Panel sleep after failure also failed: {}", sleep_err);
                }
                return Err(err.into());
            }
        };

        if !self.config.keep_panel_awake {
            keepalive.feed();
            if let Err(err) = self.presenter.sleep() {
                log::warn!("Panel sleep failed: {}", err);
            }
        }

        if let Err(err) = self.gate.mark(now) {
            log::warn!("Refresh time not saved: {}", err);
        }
        if let Err(err) = self.detector.record(candidate) {
            log::warn!("History not saved: {}", err);
        }
        self.log_history_stats();
        Ok(CycleOutcome::Refreshed { kind })
    }

    /// Draw `snapshot` into the frame buffer
    fn render(&mut self, snapshot: &Snapshot) {
        let updated = format_timestamp(
            snapshot.timestamp,
            self.settings.utc_offset_secs(),
            self.settings.date_format,
        );
        let since = snapshot
            .timestamp
            .saturating_sub(self.config.price_change_window_secs);
        let price_change = snapshot
            .price
            .and_then(|price| self.detector.history().price_change_percent(price, since));

        let data = ScreenData {
            snapshot,
            updated: &updated,
            price_change,
        };
        layout::render(&mut self.frame, &data).unwrap_or_else(|never| match never {});
    }

    fn log_history_stats(&self) {
        let history = self.detector.history();
        let Some(stats) = history.statistics() else {
            return;
        };
        let satori = stats.satori_balance;
        log::info!(
            "History: {} entries, SATORI min {:.2} max {:.2} avg {:.2}",
            history.len(),
            satori.min,
            satori.max,
            satori.avg
        );
        if let Some(price) = stats.price {
            log::info!(
                "History: price min {} max {} avg {:.6}",
                price.min,
                price.max,
                price.avg
            );
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn detector(&self) -> &ChangeDetector<H> {
        &self.detector
    }

    pub fn gate(&self) -> &RefreshGate<G> {
        &self.gate
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn aggregator(&self) -> &Aggregator<C, D> {
        &self.aggregator
    }

    pub fn frame(&self) -> &FrameBuffer<Vec<u8>> {
        &self.frame
    }
}
