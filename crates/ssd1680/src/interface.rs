//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! for communicating with the SSD1680 controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The SSD1680 requires:
//! - SPI bus (MOSI + SCK, 4 MHz on the reference board)
//! - 3 GPIO pins:
//!   - **DC**: Data/Command select (output)
//!   - **RST**: Reset (output, active low)
//!   - **BUSY**: Busy status (input, active high)
//!
//! ## Example
//!
//! ```rust,ignore
//! use ssd1680::{Interface, ResetPulse};
//!
//! let mut interface = Interface::new(spi_device, dc_pin, rst_pin, busy_pin);
//!
//! interface.reset(&mut delay, ResetPulse::FULL)?;
//! interface.send_command(0x12)?; // Soft reset
//! while interface.is_busy()? {
//!     delay.delay_ms(10);
//! }
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

/// Reset line pulse shape
///
/// The controller only answers reliably when the pulse widths are at least
/// these values; shortening them can leave the chip unresponsive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetPulse {
    /// Time RST is held high before the pulse (skipped when `None`)
    pub settle_high_ms: Option<u32>,
    /// Width of the low pulse
    pub low_ms: u32,
    /// Time RST is held high after the pulse
    pub recover_high_ms: u32,
}

impl ResetPulse {
    /// Power-on reset: high 50 ms, low 2 ms, high 50 ms
    pub const FULL: Self = Self {
        settle_high_ms: Some(50),
        low_ms: 2,
        recover_high_ms: 50,
    };

    /// Reset issued before a partial update: low 2 ms, high 2 ms
    pub const SHORT: Self = Self {
        settle_high_ms: None,
        low_ms: 2,
        recover_high_ms: 2,
    };
}

/// Trait for hardware interface to SSD1680 controller
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`Display`](crate::display::Display) to work with any
/// SPI + GPIO implementation that satisfies embedded-hal traits.
///
/// Busy polling policy (interval, timeout) lives in the display driver; the
/// interface only reports the current level of the BUSY line.
pub trait DisplayInterface {
    /// Error type for interface operations
    type Error: Debug;

    /// Send a command byte to the controller (DC low)
    fn send_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Send data bytes to the controller (DC high)
    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Pulse the reset line with the given timing
    fn reset<D: DelayNs>(&mut self, delay: &mut D, pulse: ResetPulse) -> Result<(), Self::Error>;

    /// Drive the reset line low and leave it there (module power-down)
    fn hold_reset(&mut self) -> Result<(), Self::Error>;

    /// Whether the controller currently reports busy
    fn is_busy(&mut self) -> Result<bool, Self::Error>;
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InterfaceError::Spi(e) => write!(f, "SPI error: {e:?}"),
            InterfaceError::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Hardware interface implementation for SSD1680
///
/// Implements [`DisplayInterface`] for embedded-hal v1.0 SPI and GPIO traits.
/// Chip select is handled by the [`SpiDevice`].
pub struct Interface<SPI, DC, RST, BUSY> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin (active low)
    rst: RST,
    /// Busy pin (active high)
    busy: BUSY,
}

impl<SPI, DC, RST, BUSY> Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
{
    /// Create a new Interface
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI device (must implement [`SpiDevice`])
    /// * `dc` - Data/Command pin (output, low=command, high=data)
    /// * `rst` - Reset pin (output, active low)
    /// * `busy` - Busy pin (input, active high)
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self { spi, dc, rst, busy }
    }

    /// Give the bus and pins back
    pub fn release(self) -> (SPI, DC, RST, BUSY) {
        (self.spi, self.dc, self.rst, self.busy)
    }
}

impl<SPI, DC, RST, BUSY, PinErr> DisplayInterface for Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D, pulse: ResetPulse) -> Result<(), Self::Error> {
        if let Some(ms) = pulse.settle_high_ms {
            self.rst.set_high().map_err(InterfaceError::Pin)?;
            delay.delay_ms(ms);
        }
        self.rst.set_low().map_err(InterfaceError::Pin)?;
        delay.delay_ms(pulse.low_ms);
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        delay.delay_ms(pulse.recover_high_ms);
        Ok(())
    }

    fn hold_reset(&mut self) -> Result<(), Self::Error> {
        self.rst.set_low().map_err(InterfaceError::Pin)
    }

    fn is_busy(&mut self) -> Result<bool, Self::Error> {
        self.busy.is_high().map_err(InterfaceError::Pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::spi::Operation;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Dc(bool),
        Rst(bool),
        Write(Vec<u8>),
        Delay(u32),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct MockSpi(Log);

    impl embedded_hal::spi::ErrorType for MockSpi {
        type Error = Infallible;
    }

    impl SpiDevice for MockSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.0.borrow_mut().push(Event::Write(bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    struct MockPin {
        log: Log,
        is_rst: bool,
        level: bool,
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.level = false;
            let event = if self.is_rst { Event::Rst(false) } else { Event::Dc(false) };
            self.log.borrow_mut().push(event);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.level = true;
            let event = if self.is_rst { Event::Rst(true) } else { Event::Dc(true) };
            self.log.borrow_mut().push(event);
            Ok(())
        }
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.level)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.level)
        }
    }

    struct MockDelay(Log);

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().push(Event::Delay(ns / 1_000_000));
        }

        fn delay_ms(&mut self, ms: u32) {
            self.0.borrow_mut().push(Event::Delay(ms));
        }
    }

    fn fixture(busy_level: bool) -> (Interface<MockSpi, MockPin, MockPin, MockPin>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let interface = Interface::new(
            MockSpi(log.clone()),
            MockPin { log: log.clone(), is_rst: false, level: false },
            MockPin { log: log.clone(), is_rst: true, level: false },
            MockPin { log: log.clone(), is_rst: false, level: busy_level },
        );
        (interface, log)
    }

    #[test]
    fn command_and_data_toggle_dc() {
        let (mut interface, log) = fixture(false);
        interface.send_command(0x12).unwrap();
        interface.send_data(&[0x27, 0x01]).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Dc(false),
                Event::Write(vec![0x12]),
                Event::Dc(true),
                Event::Write(vec![0x27, 0x01]),
            ]
        );
    }

    #[test]
    fn full_reset_pulse_timing() {
        let (mut interface, log) = fixture(false);
        let mut delay = MockDelay(log.clone());
        interface.reset(&mut delay, ResetPulse::FULL).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Rst(true),
                Event::Delay(50),
                Event::Rst(false),
                Event::Delay(2),
                Event::Rst(true),
                Event::Delay(50),
            ]
        );
    }

    #[test]
    fn short_reset_skips_settle_phase() {
        let (mut interface, log) = fixture(false);
        let mut delay = MockDelay(log.clone());
        interface.reset(&mut delay, ResetPulse::SHORT).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Rst(false),
                Event::Delay(2),
                Event::Rst(true),
                Event::Delay(2),
            ]
        );
    }

    #[test]
    fn busy_is_active_high() {
        let (mut busy, _) = fixture(true);
        assert!(busy.is_busy().unwrap());

        let (mut idle, _) = fixture(false);
        assert!(!idle.is_busy().unwrap());
    }
}
