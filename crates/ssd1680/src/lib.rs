//! Driver for the SSD1680 e-paper controller on the Waveshare 2.9" V2 module
//!
//! The driver is split the usual way:
//!
//! - [`Interface`] owns SPI plus the DC/RST/BUSY pins and moves bytes.
//! - [`Display`] owns the controller state machine: init, full and partial
//!   refresh, LUT selection and deep sleep. Every busy wait is bounded.
//! - [`FrameBuffer`] holds one landscape frame in transfer layout and, with
//!   the `graphics` feature, is an embedded-graphics draw target.
//!
//! ```rust,ignore
//! use ssd1680::{Builder, Display, FrameBuffer, FullUpdate, Interface, Dimensions};
//!
//! let config = Builder::waveshare_2in9().build()?;
//! let mut display = Display::new(Interface::new(spi, dc, rst, busy), config);
//! display.init(&mut delay)?;
//!
//! let mut frame = FrameBuffer::new([0xFFu8; 4736], Dimensions::PANEL_2IN9)?;
//! // draw...
//! display.write_full_frame(frame.as_bytes(), FullUpdate::Base, &mut delay)?;
//! display.write_partial_frame(frame.as_bytes(), &mut delay)?;
//! display.sleep(&mut delay)?;
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(test)]
extern crate alloc;

pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod graphics;
pub mod interface;
pub mod lut;

pub use config::{Builder, Config, DEFAULT_BUSY_TIMEOUT_MS, Dimensions};
pub use display::{Display, FullUpdate, PanelState, Phase, PowerMode, RefreshKind, Window};
pub use error::{BuilderError, Error};
pub use graphics::{Color, FrameBuffer, SizeMismatch};
pub use interface::{DisplayInterface, Interface, InterfaceError, ResetPulse};
pub use lut::Lut;
