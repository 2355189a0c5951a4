//! Panel presentation on top of the SSD1680 driver.
//!
//! Chooses full or partial refresh per frame and flattens driver errors into
//! [`PanelError`] so the orchestrator does not carry the bus type around.

use embedded_hal::delay::DelayNs;
use ssd1680::{Display, DisplayInterface, FullUpdate, Phase, RefreshKind};

/// Partial refreshes allowed before a full one clears ghosting
pub const DEFAULT_FULL_REFRESH_EVERY: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    /// BUSY never released
    Timeout { waited_ms: u32 },
    /// SPI or GPIO failure
    Bus(String),
    /// Driver refused the operation in its current phase or buffer
    State(String),
}

impl core::fmt::Display for PanelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PanelError::Timeout { waited_ms } => {
                write!(f, "Panel busy for {} ms", waited_ms)
            }
            PanelError::Bus(msg) => write!(f, "Panel bus error: {}", msg),
            PanelError::State(msg) => write!(f, "Panel error: {}", msg),
        }
    }
}

impl std::error::Error for PanelError {}

impl<I: DisplayInterface> From<ssd1680::Error<I>> for PanelError {
    fn from(err: ssd1680::Error<I>) -> Self {
        match err {
            ssd1680::Error::Timeout { waited_ms } => PanelError::Timeout { waited_ms },
            ssd1680::Error::Interface(e) => PanelError::Bus(format!("{:?}", e)),
            other => PanelError::State(other.to_string()),
        }
    }
}

/// Puts rendered frames on a physical panel
pub trait Presenter {
    /// Show `frame`, returning the refresh kind that was used
    fn present(&mut self, frame: &[u8]) -> Result<RefreshKind, PanelError>;

    /// Deep sleep until the next presentation
    fn sleep(&mut self) -> Result<(), PanelError>;
}

pub struct PanelPresenter<I, D>
where
    I: DisplayInterface,
{
    display: Display<I>,
    delay: D,
    partials_since_full: u32,
    full_every: u32,
}

impl<I, D> PanelPresenter<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    pub fn new(display: Display<I>, delay: D) -> Self {
        Self {
            display,
            delay,
            partials_since_full: 0,
            full_every: DEFAULT_FULL_REFRESH_EVERY,
        }
    }

    /// Partial refreshes between full ones; 0 disables partial refresh
    pub fn with_full_refresh_every(mut self, count: u32) -> Self {
        self.full_every = count;
        self
    }

    /// Blank the panel to `color` with a full refresh
    pub fn clear(&mut self, color: ssd1680::Color) -> Result<(), PanelError> {
        self.wake()?;
        self.display.clear(color.fill_byte(), &mut self.delay)?;
        self.partials_since_full = 0;
        Ok(())
    }

    pub fn display(&self) -> &Display<I> {
        &self.display
    }

    /// Reset and program the controller unless it is already awake
    fn wake(&mut self) -> Result<(), PanelError> {
        match self.display.phase() {
            Phase::Initialized | Phase::Displaying(_) => Ok(()),
            _ => {
                log::debug!("Waking panel");
                self.display.init(&mut self.delay)?;
                Ok(())
            }
        }
    }

    fn partial_allowed(&self) -> bool {
        matches!(self.display.phase(), Phase::Displaying(_))
            && self.partials_since_full < self.full_every
    }
}

impl<I, D> Presenter for PanelPresenter<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    fn present(&mut self, frame: &[u8]) -> Result<RefreshKind, PanelError> {
        if self.partial_allowed() {
            self.display.write_partial_frame(frame, &mut self.delay)?;
            self.partials_since_full += 1;
            log::info!(
                "Partial refresh ({}/{})",
                self.partials_since_full,
                self.full_every
            );
            return Ok(RefreshKind::Partial);
        }

        self.wake()?;
        self.display
            .write_full_frame(frame, FullUpdate::Base, &mut self.delay)?;
        self.partials_since_full = 0;
        log::info!("Full refresh");
        Ok(RefreshKind::Full)
    }

    fn sleep(&mut self) -> Result<(), PanelError> {
        if !matches!(self.display.phase(), Phase::Uninitialized | Phase::Resetting) {
            self.display.sleep(&mut self.delay)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use ssd1680::command::{DEEP_SLEEP, SOFT_RESET, WRITE_RAM_BW, WRITE_RAM_RED};
    use ssd1680::{Builder, Dimensions, ResetPulse};

    #[derive(Debug, Default)]
    struct BusLog {
        commands: Vec<u8>,
        resets: Vec<ResetPulse>,
        stuck_busy: bool,
    }

    impl BusLog {
        fn count(&self, command: u8) -> usize {
            self.commands.iter().filter(|c| **c == command).count()
        }
    }

    impl DisplayInterface for BusLog {
        type Error = Infallible;

        fn send_command(&mut self, command: u8) -> Result<(), Infallible> {
            self.commands.push(command);
            Ok(())
        }

        fn send_data(&mut self, _data: &[u8]) -> Result<(), Infallible> {
            Ok(())
        }

        fn reset<D: DelayNs>(&mut self, _delay: &mut D, pulse: ResetPulse) -> Result<(), Infallible> {
            self.resets.push(pulse);
            Ok(())
        }

        fn hold_reset(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        fn is_busy(&mut self) -> Result<bool, Infallible> {
            Ok(self.stuck_busy)
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn presenter(bus: BusLog) -> PanelPresenter<BusLog, NoDelay> {
        let config = Builder::waveshare_2in9().build().unwrap();
        PanelPresenter::new(Display::new(bus, config), NoDelay)
    }

    fn bus(p: PanelPresenter<BusLog, NoDelay>) -> BusLog {
        p.display.release()
    }

    fn frame() -> Vec<u8> {
        vec![0xFF; Dimensions::PANEL_2IN9.buffer_size()]
    }

    #[test]
    fn first_frame_is_full_with_base_plane() {
        let mut p = presenter(BusLog::default());
        assert_eq!(p.present(&frame()), Ok(RefreshKind::Full));
        assert_eq!(p.display().phase(), Phase::Displaying(RefreshKind::Full));

        let bus = bus(p);
        assert_eq!(bus.resets, vec![ResetPulse::FULL]);
        assert_eq!(bus.count(SOFT_RESET), 1);
        assert_eq!(bus.count(WRITE_RAM_BW), 1);
        assert_eq!(bus.count(WRITE_RAM_RED), 1);
    }

    #[test]
    fn awake_panel_goes_partial_then_full_again() {
        let mut p = presenter(BusLog::default()).with_full_refresh_every(2);
        let frame = frame();
        let kinds: Vec<_> = (0..4).map(|_| p.present(&frame).unwrap()).collect();
        assert_eq!(
            kinds,
            vec![
                RefreshKind::Full,
                RefreshKind::Partial,
                RefreshKind::Partial,
                RefreshKind::Full
            ]
        );
    }

    #[test]
    fn sleeping_panel_is_reinitialized() {
        let mut p = presenter(BusLog::default());
        let frame = frame();
        p.present(&frame).unwrap();
        p.sleep().unwrap();
        assert_eq!(p.display().phase(), Phase::Sleeping);

        assert_eq!(p.present(&frame), Ok(RefreshKind::Full));
        let bus = bus(p);
        assert_eq!(bus.count(DEEP_SLEEP), 1);
        assert_eq!(bus.count(SOFT_RESET), 2);
    }

    #[test]
    fn sleep_before_any_frame_is_a_no_op() {
        let mut p = presenter(BusLog::default());
        assert_eq!(p.sleep(), Ok(()));
        assert!(bus(p).commands.is_empty());
    }

    #[test]
    fn stuck_busy_surfaces_timeout() {
        let mut p = presenter(BusLog {
            stuck_busy: true,
            ..BusLog::default()
        });
        match p.present(&frame()) {
            Err(PanelError::Timeout { waited_ms }) => assert!(waited_ms >= 5_000),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn clear_wakes_panel_and_resets_partial_count() {
        let mut p = presenter(BusLog::default()).with_full_refresh_every(1);
        let frame = frame();
        p.present(&frame).unwrap();
        assert_eq!(p.present(&frame), Ok(RefreshKind::Partial));

        p.clear(ssd1680::Color::White).unwrap();
        assert_eq!(p.present(&frame), Ok(RefreshKind::Partial));

        let bus = bus(p);
        assert_eq!(bus.count(SOFT_RESET), 1);
    }

    #[test]
    fn short_frame_is_a_state_error() {
        let mut p = presenter(BusLog::default());
        assert!(matches!(p.present(&[0u8; 10]), Err(PanelError::State(_))));
    }
}
