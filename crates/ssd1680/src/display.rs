//! Core display operations
//!
//! [`Display`] drives the SSD1680 through its refresh lifecycle:
//!
//! ```text
//! Uninitialized -> Resetting -> Initialized (full LUT)
//!     -> Displaying(Full | Partial) -> Sleeping
//! ```
//!
//! `Sleeping` is left only through another [`Display::reset`].

use embedded_hal::delay::DelayNs;

use crate::command::*;
use crate::config::Config;
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::lut::{self, Lut};

/// Panel lifecycle phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing sent since power-up
    Uninitialized,
    /// Hardware reset issued, registers not yet programmed
    Resetting,
    /// Registers programmed, full LUT loaded, nothing shown yet
    Initialized,
    /// A frame has been activated with the given refresh kind
    Displaying(RefreshKind),
    /// Deep sleep, reset line held low
    Sleeping,
}

/// Refresh waveform selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshKind {
    /// Full waveform: both RAM planes, flashes, clears ghosting
    Full,
    /// Partial waveform: new plane only, fast, accumulates ghosting
    Partial,
}

/// How a full frame is written to controller RAM
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FullUpdate {
    /// New-frame RAM only
    Single,
    /// New and old RAM planes, establishing a baseline for partial updates
    Base,
}

/// Controller power mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerMode {
    Active,
    Sleep,
}

/// RAM window in pixels, inclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub x_start: u16,
    pub y_start: u16,
    pub x_end: u16,
    pub y_end: u16,
}

/// Driver-side mirror of the controller state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelState {
    pub phase: Phase,
    /// LUT currently programmed into the controller
    pub lut: Option<RefreshKind>,
    /// Last RAM window, X already truncated to 8-pixel units
    pub window: Option<Window>,
    /// Last RAM address counter (X in bytes, Y in rows)
    pub cursor: Option<(u8, u16)>,
    pub power: PowerMode,
}

impl PanelState {
    const fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
            lut: None,
            window: None,
            cursor: None,
            power: PowerMode::Active,
        }
    }
}

/// Core display driver for SSD1680
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Controller state as last programmed
    state: PanelState,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            state: PanelState::new(),
        }
    }

    /// Hardware reset: RST high 50 ms, low 2 ms, high 50 ms
    ///
    /// Valid from any phase; this is the only way out of `Sleeping`.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        self.state = PanelState::new();
        self.state.phase = Phase::Resetting;
        self.interface
            .reset(delay, self.config.reset_pulse)
            .map_err(Error::Interface)
    }

    /// Software reset and register programming, ending with the full LUT
    pub fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        self.expect_phase("initialize", |phase| phase == Phase::Resetting)?;

        self.wait_until_idle(delay)?;
        self.send_command(SOFT_RESET)?;
        self.wait_until_idle(delay)?;

        let rows = self.config.dimensions.rows - 1;
        self.command_with_data(
            DRIVER_OUTPUT_CONTROL,
            &[(rows & 0xFF) as u8, (rows >> 8) as u8, self.config.gate_scanning],
            delay,
        )?;
        self.command_with_data(DATA_ENTRY_MODE, &[self.config.data_entry_mode], delay)?;

        self.set_full_window()?;
        self.wait_until_idle(delay)?;

        let ctrl1 = self.config.display_update_ctrl1;
        self.command_with_data(DISPLAY_UPDATE_CTRL1, &ctrl1, delay)?;

        self.set_cursor(0, 0, delay)?;

        self.load_lut(self.config.full_lut, delay)?;
        self.state.lut = Some(RefreshKind::Full);
        self.state.phase = Phase::Initialized;
        log::debug!("ssd1680: initialized");
        Ok(())
    }

    /// Convenience: [`reset`](Self::reset) followed by [`initialize`](Self::initialize)
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        self.reset(delay)?;
        self.initialize(delay)
    }

    /// Write a complete frame and run the full refresh waveform
    ///
    /// With [`FullUpdate::Base`] the frame goes to both RAM planes so later
    /// partial refreshes have a baseline to compare against.
    pub fn write_full_frame<D: DelayNs>(
        &mut self,
        frame: &[u8],
        mode: FullUpdate,
        delay: &mut D,
    ) -> Result<(), Error<I>> {
        self.expect_phase("write a full frame", is_awake)?;
        self.check_buffer(frame)?;

        if self.state.lut != Some(RefreshKind::Full) {
            self.load_lut(self.config.full_lut, delay)?;
            self.state.lut = Some(RefreshKind::Full);
            self.set_full_window()?;
            self.set_cursor(0, 0, delay)?;
        }

        self.send_command(WRITE_RAM_BW)?;
        self.send_frame(frame)?;
        if mode == FullUpdate::Base {
            self.send_command(WRITE_RAM_RED)?;
            self.send_frame(frame)?;
        }

        self.activate(self.config.full_activation, delay)?;
        self.state.phase = Phase::Displaying(RefreshKind::Full);
        Ok(())
    }

    /// Write a frame with the partial waveform
    ///
    /// Requires a frame already on the panel (the old RAM plane is the
    /// comparison baseline).
    pub fn write_partial_frame<D: DelayNs>(
        &mut self,
        frame: &[u8],
        delay: &mut D,
    ) -> Result<(), Error<I>> {
        self.expect_phase("write a partial frame", |phase| {
            matches!(phase, Phase::Displaying(_))
        })?;
        self.check_buffer(frame)?;

        self.interface
            .reset(delay, self.config.partial_reset_pulse)
            .map_err(Error::Interface)?;

        self.load_lut(self.config.partial_lut, delay)?;
        self.state.lut = Some(RefreshKind::Partial);

        // Display option: enable ping-pong RAM for partial mode
        self.send_command(WRITE_DISPLAY_OPTION)?;
        self.send_data(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x00])?;

        self.send_command(BORDER_WAVEFORM)?;
        self.send_data(&[self.config.partial_border_waveform])?;

        self.activate(self.config.partial_preload, delay)?;

        self.set_full_window()?;
        self.set_cursor(0, 0, delay)?;

        self.send_command(WRITE_RAM_BW)?;
        self.send_frame(frame)?;

        self.activate(self.config.partial_activation, delay)?;
        self.state.phase = Phase::Displaying(RefreshKind::Partial);
        Ok(())
    }

    /// Fill both RAM planes with `fill` and full-refresh
    pub fn clear<D: DelayNs>(&mut self, fill: u8, delay: &mut D) -> Result<(), Error<I>> {
        self.expect_phase("clear", is_awake)?;

        let band = [fill; 64];
        let size = self.config.dimensions.buffer_size();
        for command in [WRITE_RAM_BW, WRITE_RAM_RED] {
            self.send_command(command)?;
            let mut remaining = size;
            while remaining > 0 {
                let n = remaining.min(band.len());
                self.send_data(&band[..n])?;
                remaining -= n;
            }
        }

        self.activate(self.config.full_activation, delay)?;
        self.state.phase = Phase::Displaying(RefreshKind::Full);
        Ok(())
    }

    /// Enter deep sleep and drop the reset line
    ///
    /// The controller needs the settle delay to latch the sleep command
    /// before reset goes low.
    pub fn sleep<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        if self.state.phase == Phase::Sleeping {
            return Ok(());
        }
        self.expect_phase("sleep", |phase| {
            !matches!(phase, Phase::Uninitialized | Phase::Resetting)
        })?;

        self.send_command(DEEP_SLEEP)?;
        self.send_data(&[0x01])?;
        delay.delay_ms(self.config.sleep_settle_ms);
        self.interface.hold_reset().map_err(Error::Interface)?;

        self.state.phase = Phase::Sleeping;
        self.state.power = PowerMode::Sleep;
        log::debug!("ssd1680: deep sleep");
        Ok(())
    }

    /// Program the RAM window
    ///
    /// X is addressed in 8-pixel units: the low 3 bits of `x_start`/`x_end`
    /// are dropped by the controller, so unaligned regions clip silently.
    pub fn set_window(
        &mut self,
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
    ) -> Result<(), Error<I>> {
        if x_start % 8 != 0 || (x_end + 1) % 8 != 0 {
            log::debug!(
                "ssd1680: window x {}..={} not byte aligned, low bits dropped",
                x_start,
                x_end
            );
        }

        self.send_command(SET_RAM_X_RANGE)?;
        self.send_data(&[(x_start >> 3) as u8, (x_end >> 3) as u8])?;

        self.send_command(SET_RAM_Y_RANGE)?;
        self.send_data(&[
            (y_start & 0xFF) as u8,
            (y_start >> 8) as u8,
            (y_end & 0xFF) as u8,
            (y_end >> 8) as u8,
        ])?;

        self.state.window = Some(Window {
            x_start: x_start & !0x07,
            y_start,
            x_end: x_end & !0x07,
            y_end,
        });
        Ok(())
    }

    /// Program the RAM address counter (X in bytes, Y in rows)
    pub fn set_cursor<D: DelayNs>(&mut self, x: u8, y: u16, delay: &mut D) -> Result<(), Error<I>> {
        self.send_command(SET_RAM_X_COUNTER)?;
        self.send_data(&[x])?;

        self.send_command(SET_RAM_Y_COUNTER)?;
        self.send_data(&[(y & 0xFF) as u8, (y >> 8) as u8])?;
        self.wait_until_idle(delay)?;

        self.state.cursor = Some((x, y));
        Ok(())
    }

    /// Controller state as last programmed
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> &crate::config::Dimensions {
        &self.config.dimensions
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Give the interface back
    pub fn release(self) -> I {
        self.interface
    }

    fn set_full_window(&mut self) -> Result<(), Error<I>> {
        let dims = self.config.dimensions;
        self.set_window(0, 0, dims.cols - 1, dims.rows - 1)
    }

    /// Upload waveform bytes, then the voltage trailer
    fn load_lut<D: DelayNs>(&mut self, table: &Lut, delay: &mut D) -> Result<(), Error<I>> {
        self.send_command(WRITE_LUT)?;
        self.send_data(&table[..lut::WAVEFORM_LEN])?;
        self.wait_until_idle(delay)?;

        self.command_with_data(END_OPTION, &[table[lut::END_OPTION_INDEX]], delay)?;
        self.command_with_data(GATE_VOLTAGE, &[table[lut::GATE_VOLTAGE_INDEX]], delay)?;
        self.command_with_data(SOURCE_VOLTAGE, &table[lut::SOURCE_VOLTAGE_RANGE], delay)?;
        self.command_with_data(WRITE_VCOM, &[table[lut::VCOM_INDEX]], delay)?;
        Ok(())
    }

    /// Update control 2 + master activation, then wait for the waveform
    fn activate<D: DelayNs>(&mut self, mode: u8, delay: &mut D) -> Result<(), Error<I>> {
        self.send_command(DISPLAY_UPDATE_CTRL2)?;
        self.send_data(&[mode])?;
        self.send_command(MASTER_ACTIVATION)?;
        self.wait_until_idle(delay)
    }

    /// Frame bytes are stored in 8-row bands of `rows` bytes; the controller
    /// expects the last band first.
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), Error<I>> {
        let dims = self.config.dimensions;
        let size = dims.buffer_size();
        for band in frame[..size].chunks(dims.rows as usize).rev() {
            self.send_data(band)?;
        }
        Ok(())
    }

    fn command_with_data<D: DelayNs>(
        &mut self,
        command: u8,
        data: &[u8],
        delay: &mut D,
    ) -> Result<(), Error<I>> {
        self.send_command(command)?;
        self.send_data(data)?;
        self.wait_until_idle(delay)
    }

    /// Poll BUSY every `busy_poll_ms` until it releases or the bound expires
    fn wait_until_idle<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        let step = self.config.busy_poll_ms.max(1);
        let mut waited_ms = 0u32;
        while self.interface.is_busy().map_err(Error::Interface)? {
            if waited_ms >= self.config.busy_timeout_ms {
                log::warn!("ssd1680: busy line stuck after {} ms", waited_ms);
                return Err(Error::Timeout { waited_ms });
            }
            delay.delay_ms(step);
            waited_ms = waited_ms.saturating_add(step);
        }
        Ok(())
    }

    fn check_buffer(&self, frame: &[u8]) -> Result<(), Error<I>> {
        let required = self.config.dimensions.buffer_size();
        if frame.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                provided: frame.len(),
            });
        }
        Ok(())
    }

    fn expect_phase(
        &self,
        operation: &'static str,
        allowed: impl Fn(Phase) -> bool,
    ) -> Result<(), Error<I>> {
        if allowed(self.state.phase) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                phase: self.state.phase,
            })
        }
    }

    /// Send a command to the display controller
    fn send_command(&mut self, cmd: u8) -> Result<(), Error<I>> {
        self.interface.send_command(cmd).map_err(Error::Interface)
    }

    /// Send data to the display controller
    fn send_data(&mut self, data: &[u8]) -> Result<(), Error<I>> {
        self.interface.send_data(data).map_err(Error::Interface)
    }
}

fn is_awake(phase: Phase) -> bool {
    matches!(phase, Phase::Initialized | Phase::Displaying(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Dimensions};
    use crate::interface::ResetPulse;
    use alloc::vec::Vec;
    use core::convert::Infallible;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Cmd(u8),
        Data(Vec<u8>),
        Reset(ResetPulse),
        HoldReset,
    }

    /// Records bus traffic; BUSY reads come from a script, then idle.
    #[derive(Debug, Default)]
    struct RecordingInterface {
        ops: Vec<Op>,
        busy_script: Vec<bool>,
        stuck_busy: bool,
    }

    impl RecordingInterface {
        fn commands(&self) -> Vec<u8> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Cmd(c) => Some(*c),
                    _ => None,
                })
                .collect()
        }

        /// Data bytes following the n-th occurrence of `command`
        fn data_after(&self, command: u8, nth: usize) -> Vec<u8> {
            let mut seen = 0;
            let mut collecting = false;
            let mut out = Vec::new();
            for op in &self.ops {
                match op {
                    Op::Cmd(_) if collecting => break,
                    Op::Cmd(c) if *c == command => {
                        if seen == nth {
                            collecting = true;
                        }
                        seen += 1;
                    }
                    Op::Data(d) if collecting => out.extend_from_slice(d),
                    _ => {}
                }
            }
            out
        }
    }

    impl DisplayInterface for RecordingInterface {
        type Error = Infallible;

        fn send_command(&mut self, command: u8) -> Result<(), Infallible> {
            self.ops.push(Op::Cmd(command));
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Infallible> {
            self.ops.push(Op::Data(data.to_vec()));
            Ok(())
        }

        fn reset<D: DelayNs>(&mut self, _delay: &mut D, pulse: ResetPulse) -> Result<(), Infallible> {
            self.ops.push(Op::Reset(pulse));
            Ok(())
        }

        fn hold_reset(&mut self) -> Result<(), Infallible> {
            self.ops.push(Op::HoldReset);
            Ok(())
        }

        fn is_busy(&mut self) -> Result<bool, Infallible> {
            if self.stuck_busy {
                return Ok(true);
            }
            if self.busy_script.is_empty() {
                Ok(false)
            } else {
                Ok(self.busy_script.remove(0))
            }
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_ms: u64,
        calls: Vec<u32>,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += u64::from(ns / 1_000_000);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += u64::from(ms);
            self.calls.push(ms);
        }
    }

    fn display() -> Display<RecordingInterface> {
        let config = Builder::waveshare_2in9().build().unwrap();
        Display::new(RecordingInterface::default(), config)
    }

    fn frame() -> Vec<u8> {
        (0..Dimensions::PANEL_2IN9.buffer_size())
            .map(|i| (i / 296) as u8)
            .collect()
    }

    #[test]
    fn initialize_programs_registers_and_full_lut() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        display.init(&mut delay).unwrap();

        let ops = &display.interface;
        assert_eq!(ops.ops[0], Op::Reset(ResetPulse::FULL));
        assert_eq!(
            ops.commands(),
            vec![
                SOFT_RESET,
                DRIVER_OUTPUT_CONTROL,
                DATA_ENTRY_MODE,
                SET_RAM_X_RANGE,
                SET_RAM_Y_RANGE,
                DISPLAY_UPDATE_CTRL1,
                SET_RAM_X_COUNTER,
                SET_RAM_Y_COUNTER,
                WRITE_LUT,
                END_OPTION,
                GATE_VOLTAGE,
                SOURCE_VOLTAGE,
                WRITE_VCOM,
            ]
        );
        assert_eq!(ops.data_after(DRIVER_OUTPUT_CONTROL, 0), vec![0x27, 0x01, 0x00]);
        assert_eq!(ops.data_after(DATA_ENTRY_MODE, 0), vec![0x07]);
        assert_eq!(ops.data_after(SET_RAM_X_RANGE, 0), vec![0x00, 0x0F]);
        assert_eq!(ops.data_after(SET_RAM_Y_RANGE, 0), vec![0x00, 0x00, 0x27, 0x01]);
        assert_eq!(ops.data_after(DISPLAY_UPDATE_CTRL1, 0), vec![0x00, 0x80]);
        assert_eq!(ops.data_after(WRITE_LUT, 0), lut::FULL_UPDATE[..153].to_vec());
        assert_eq!(ops.data_after(SOURCE_VOLTAGE, 0), vec![0x41, 0x00, 0x32]);
        assert_eq!(ops.data_after(WRITE_VCOM, 0), vec![0x36]);

        assert_eq!(display.phase(), Phase::Initialized);
        assert_eq!(display.state().lut, Some(RefreshKind::Full));
        assert_eq!(display.state().cursor, Some((0, 0)));
    }

    #[test]
    fn initialize_requires_reset_first() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        let err = display.initialize(&mut delay).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                phase: Phase::Uninitialized,
                ..
            }
        ));
    }

    #[test]
    fn full_frame_single_pass_sends_bands_last_first() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        display.init(&mut delay).unwrap();
        display.interface.ops.clear();

        let frame = frame();
        display
            .write_full_frame(&frame, FullUpdate::Single, &mut delay)
            .unwrap();

        let ops = &display.interface.ops;
        assert_eq!(ops[0], Op::Cmd(WRITE_RAM_BW));
        // 16 bands of 296 bytes, band 15 first
        assert_eq!(ops[1], Op::Data(vec![15u8; 296]));
        assert_eq!(ops[16], Op::Data(vec![0u8; 296]));
        assert_eq!(
            &ops[17..],
            &[
                Op::Cmd(DISPLAY_UPDATE_CTRL2),
                Op::Data(vec![0xC7]),
                Op::Cmd(MASTER_ACTIVATION),
            ]
        );
        assert!(!display.interface.commands().contains(&WRITE_RAM_RED));
        assert_eq!(display.phase(), Phase::Displaying(RefreshKind::Full));
    }

    #[test]
    fn base_frame_writes_both_planes() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        display.init(&mut delay).unwrap();
        display.interface.ops.clear();

        display
            .write_full_frame(&frame(), FullUpdate::Base, &mut delay)
            .unwrap();

        assert_eq!(
            display.interface.commands(),
            vec![WRITE_RAM_BW, WRITE_RAM_RED, DISPLAY_UPDATE_CTRL2, MASTER_ACTIVATION]
        );
        assert_eq!(display.interface.data_after(WRITE_RAM_RED, 0).len(), 4736);
    }

    #[test]
    fn partial_frame_sequence() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        display.init(&mut delay).unwrap();
        display
            .write_full_frame(&frame(), FullUpdate::Base, &mut delay)
            .unwrap();
        display.interface.ops.clear();

        display.write_partial_frame(&frame(), &mut delay).unwrap();

        let iface = &display.interface;
        assert_eq!(iface.ops[0], Op::Reset(ResetPulse::SHORT));
        assert_eq!(iface.data_after(WRITE_LUT, 0), lut::PARTIAL_UPDATE[..153].to_vec());
        assert_eq!(
            iface.data_after(WRITE_DISPLAY_OPTION, 0),
            vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(iface.data_after(BORDER_WAVEFORM, 0), vec![0x80]);
        assert_eq!(iface.data_after(DISPLAY_UPDATE_CTRL2, 0), vec![0xC0]);
        assert_eq!(iface.data_after(DISPLAY_UPDATE_CTRL2, 1), vec![0x0F]);
        assert_eq!(iface.data_after(WRITE_RAM_BW, 0).len(), 4736);
        assert!(!iface.commands().contains(&WRITE_RAM_RED));

        assert_eq!(display.phase(), Phase::Displaying(RefreshKind::Partial));
        assert_eq!(display.state().lut, Some(RefreshKind::Partial));
    }

    #[test]
    fn partial_frame_needs_baseline() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        display.init(&mut delay).unwrap();

        let err = display.write_partial_frame(&frame(), &mut delay).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                phase: Phase::Initialized,
                ..
            }
        ));
    }

    #[test]
    fn full_frame_after_partial_reloads_full_lut() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        display.init(&mut delay).unwrap();
        display
            .write_full_frame(&frame(), FullUpdate::Base, &mut delay)
            .unwrap();
        display.write_partial_frame(&frame(), &mut delay).unwrap();
        display.interface.ops.clear();

        display
            .write_full_frame(&frame(), FullUpdate::Base, &mut delay)
            .unwrap();
        assert_eq!(
            display.interface.data_after(WRITE_LUT, 0),
            lut::FULL_UPDATE[..153].to_vec()
        );
        assert_eq!(display.state().lut, Some(RefreshKind::Full));
    }

    #[test]
    fn sleep_waits_before_dropping_reset() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        display.init(&mut delay).unwrap();
        display.interface.ops.clear();
        delay.calls.clear();

        display.sleep(&mut delay).unwrap();

        assert_eq!(
            display.interface.ops,
            vec![Op::Cmd(DEEP_SLEEP), Op::Data(vec![0x01]), Op::HoldReset]
        );
        assert_eq!(delay.calls, vec![2_000]);
        assert_eq!(display.phase(), Phase::Sleeping);
        assert_eq!(display.state().power, PowerMode::Sleep);

        // Second sleep is a no-op
        display.sleep(&mut delay).unwrap();
        assert_eq!(display.interface.ops.len(), 3);
    }

    #[test]
    fn sleeping_panel_rejects_frames_until_reset() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        display.init(&mut delay).unwrap();
        display.sleep(&mut delay).unwrap();

        assert!(display
            .write_full_frame(&frame(), FullUpdate::Single, &mut delay)
            .is_err());

        display.init(&mut delay).unwrap();
        display
            .write_full_frame(&frame(), FullUpdate::Single, &mut delay)
            .unwrap();
        assert_eq!(display.state().power, PowerMode::Active);
    }

    #[test]
    fn busy_poll_uses_ten_ms_steps() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        display.reset(&mut delay).unwrap();
        display.interface.busy_script = vec![true, true, true];
        delay.calls.clear();

        display.initialize(&mut delay).unwrap();
        assert_eq!(&delay.calls[..3], &[10, 10, 10]);
    }

    #[test]
    fn stuck_busy_line_times_out() {
        let config = Builder::waveshare_2in9()
            .busy_timeout_ms(100)
            .build()
            .unwrap();
        let mut display = Display::new(RecordingInterface::default(), config);
        let mut delay = CountingDelay::default();
        display.reset(&mut delay).unwrap();
        display.interface.stuck_busy = true;

        let err = display.initialize(&mut delay).unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(err, Error::Timeout { waited_ms: 100 }));
    }

    #[test]
    fn window_x_is_truncated_to_bytes() {
        let mut display = display();
        display.set_window(3, 0, 100, 10).unwrap();

        assert_eq!(display.interface.data_after(SET_RAM_X_RANGE, 0), vec![0x00, 0x0C]);
        assert_eq!(
            display.state().window,
            Some(Window {
                x_start: 0,
                y_start: 0,
                x_end: 96,
                y_end: 10
            })
        );
    }

    #[test]
    fn short_frame_is_rejected() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        display.init(&mut delay).unwrap();

        let err = display
            .write_full_frame(&[0xFF; 10], FullUpdate::Single, &mut delay)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                required: 4736,
                provided: 10
            }
        ));
    }

    #[test]
    fn clear_fills_both_planes() {
        let mut display = display();
        let mut delay = CountingDelay::default();
        display.init(&mut delay).unwrap();
        display.interface.ops.clear();

        display.clear(0xFF, &mut delay).unwrap();

        let bw = display.interface.data_after(WRITE_RAM_BW, 0);
        let red = display.interface.data_after(WRITE_RAM_RED, 0);
        assert_eq!(bw.len(), 4736);
        assert!(bw.iter().chain(red.iter()).all(|&b| b == 0xFF));
        assert_eq!(display.interface.data_after(DISPLAY_UPDATE_CTRL2, 0), vec![0xC7]);
    }
}
