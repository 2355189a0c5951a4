//! Display configuration types and builder

pub use crate::error::{BuilderError, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};
use crate::interface::ResetPulse;
use crate::lut::{self, Lut};

/// Display dimensions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Number of rows (gate outputs; the long edge of the 2.9" panel)
    pub rows: u16,
    /// Number of columns (source outputs; the short edge)
    pub cols: u16,
}

impl Dimensions {
    /// Waveshare 2.9" V2: 296 gates x 128 sources
    pub const PANEL_2IN9: Self = Self {
        rows: 296,
        cols: 128,
    };

    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - rows > MAX_GATE_OUTPUTS
    /// - cols > MAX_SOURCE_OUTPUTS
    /// - cols % 8 != 0 (the X address counter works in whole bytes)
    pub fn new(rows: u16, cols: u16) -> Result<Self, BuilderError> {
        if rows == 0 || rows > MAX_GATE_OUTPUTS {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        if cols == 0 || cols > MAX_SOURCE_OUTPUTS || cols % 8 != 0 {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Calculate required buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        (self.rows as usize * self.cols as usize) / 8
    }
}

/// Display configuration
///
/// This struct holds all configurable parameters for the SSD1680 controller.
/// Use `Builder` to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Display dimensions
    pub dimensions: Dimensions,
    /// Gate scanning byte for driver output control
    pub gate_scanning: u8,
    /// Data entry mode byte
    pub data_entry_mode: u8,
    /// Display update control 1 payload
    pub display_update_ctrl1: [u8; 2],
    /// Update control 2 value for a full refresh
    pub full_activation: u8,
    /// Update control 2 value for a partial refresh
    pub partial_activation: u8,
    /// Update control 2 value that latches the partial LUT before writing
    pub partial_preload: u8,
    /// Border waveform used for partial refreshes
    pub partial_border_waveform: u8,
    /// Full-update waveform
    pub full_lut: &'static Lut,
    /// Partial-update waveform
    pub partial_lut: &'static Lut,
    /// Power-on reset pulse
    pub reset_pulse: ResetPulse,
    /// Reset pulse issued before each partial refresh
    pub partial_reset_pulse: ResetPulse,
    /// Interval between BUSY line polls
    pub busy_poll_ms: u32,
    /// Upper bound on a single busy wait
    pub busy_timeout_ms: u32,
    /// Settle time after the deep sleep command before the reset line drops
    pub sleep_settle_ms: u32,
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use ssd1680::{Builder, Dimensions};
///
/// let config = Builder::new()
///     .dimensions(Dimensions::PANEL_2IN9)
///     .busy_timeout_ms(4_000)
///     .build()
///     .expect("valid configuration");
/// assert_eq!(config.dimensions.buffer_size(), 4736);
/// ```
pub struct Builder {
    dimensions: Option<Dimensions>,
    gate_scanning: u8,
    data_entry_mode: u8,
    display_update_ctrl1: [u8; 2],
    full_activation: u8,
    partial_activation: u8,
    partial_preload: u8,
    partial_border_waveform: u8,
    full_lut: &'static Lut,
    partial_lut: &'static Lut,
    reset_pulse: ResetPulse,
    partial_reset_pulse: ResetPulse,
    busy_poll_ms: u32,
    busy_timeout_ms: u32,
    sleep_settle_ms: u32,
}

/// Default busy wait bound, kept under the 8.388 s application watchdog
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

impl Default for Builder {
    fn default() -> Self {
        Builder {
            dimensions: None,
            // Scan G0 -> G295
            gate_scanning: 0x00,
            // X increment, Y increment, counter advances along X
            data_entry_mode: 0x07,
            // Normal RAM content, source output S8..S167
            display_update_ctrl1: [0x00, 0x80],
            // Clock + analog on, load LUT, display, power off
            full_activation: 0xC7,
            partial_activation: 0x0F,
            partial_preload: 0xC0,
            partial_border_waveform: 0x80,
            full_lut: &lut::FULL_UPDATE,
            partial_lut: &lut::PARTIAL_UPDATE,
            reset_pulse: ResetPulse::FULL,
            partial_reset_pulse: ResetPulse::SHORT,
            busy_poll_ms: 10,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            sleep_settle_ms: 2_000,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preset for the Waveshare 2.9" V2 module
    pub fn waveshare_2in9() -> Self {
        Self::default().dimensions(Dimensions::PANEL_2IN9)
    }

    /// Set display dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set gate scanning direction
    pub fn gate_scanning(mut self, value: u8) -> Self {
        self.gate_scanning = value;
        self
    }

    /// Set data entry mode
    pub fn data_entry_mode(mut self, value: u8) -> Self {
        self.data_entry_mode = value;
        self
    }

    /// Set the waveforms used for full and partial refreshes
    pub fn luts(mut self, full: &'static Lut, partial: &'static Lut) -> Self {
        self.full_lut = full;
        self.partial_lut = partial;
        self
    }

    /// Set the power-on reset pulse
    pub fn reset_pulse(mut self, pulse: ResetPulse) -> Self {
        self.reset_pulse = pulse;
        self
    }

    /// Set the BUSY poll interval
    pub fn busy_poll_ms(mut self, value: u32) -> Self {
        self.busy_poll_ms = value;
        self
    }

    /// Set the upper bound on a single busy wait
    pub fn busy_timeout_ms(mut self, value: u32) -> Self {
        self.busy_timeout_ms = value;
        self
    }

    /// Set the settle delay between deep sleep and reset power-down
    pub fn sleep_settle_ms(mut self, value: u32) -> Self {
        self.sleep_settle_ms = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set
    /// and `BuilderError::InvalidTiming` for a zero busy poll or timeout
    pub fn build(self) -> Result<Config, BuilderError> {
        if self.busy_poll_ms == 0 || self.busy_timeout_ms == 0 {
            return Err(BuilderError::InvalidTiming);
        }
        Ok(Config {
            dimensions: self.dimensions.ok_or(BuilderError::MissingDimensions)?,
            gate_scanning: self.gate_scanning,
            data_entry_mode: self.data_entry_mode,
            display_update_ctrl1: self.display_update_ctrl1,
            full_activation: self.full_activation,
            partial_activation: self.partial_activation,
            partial_preload: self.partial_preload,
            partial_border_waveform: self.partial_border_waveform,
            full_lut: self.full_lut,
            partial_lut: self.partial_lut,
            reset_pulse: self.reset_pulse,
            partial_reset_pulse: self.partial_reset_pulse,
            busy_poll_ms: self.busy_poll_ms,
            busy_timeout_ms: self.busy_timeout_ms,
            sleep_settle_ms: self.sleep_settle_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_dimensions_validate() {
        assert_eq!(Dimensions::new(296, 128).unwrap(), Dimensions::PANEL_2IN9);
        assert!(Dimensions::new(296, 130).is_err());
        assert!(Dimensions::new(400, 128).is_err());
        assert!(Dimensions::new(0, 128).is_err());
    }

    #[test]
    fn build_requires_dimensions() {
        assert!(matches!(
            Builder::new().build(),
            Err(BuilderError::MissingDimensions)
        ));
    }

    #[test]
    fn zero_busy_timing_is_rejected() {
        assert!(matches!(
            Builder::waveshare_2in9().busy_poll_ms(0).build(),
            Err(BuilderError::InvalidTiming)
        ));
        assert!(matches!(
            Builder::waveshare_2in9().busy_timeout_ms(0).build(),
            Err(BuilderError::InvalidTiming)
        ));
    }

    #[test]
    fn preset_defaults() {
        let config = Builder::waveshare_2in9().build().unwrap();
        assert_eq!(config.dimensions.buffer_size(), 296 * 16);
        assert_eq!(config.busy_poll_ms, 10);
        assert_eq!(config.reset_pulse, ResetPulse::FULL);
        assert_eq!(config.full_activation, 0xC7);
        assert_eq!(config.partial_activation, 0x0F);
    }
}
