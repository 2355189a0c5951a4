//! Driver errors.
//!
//! [`BuilderError`] is returned while assembling a [`Config`](crate::Config);
//! [`Error`] by every bus-touching operation on [`Display`](crate::Display).
//!
//! ```
//! use ssd1680::{Builder, BuilderError, Dimensions};
//!
//! assert!(matches!(Builder::new().build(), Err(BuilderError::MissingDimensions)));
//! // 400 gates is more than the controller drives
//! assert!(Dimensions::new(400, 128).is_err());
//! ```

use crate::display::Phase;
use crate::interface::DisplayInterface;

/// Gate lines (rows) the SSD1680 can drive
pub const MAX_GATE_OUTPUTS: u16 = 296;

/// Source lines (columns) the SSD1680 can drive
pub const MAX_SOURCE_OUTPUTS: u16 = 176;

/// Display operation failure, carrying the interface's own error type
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// SPI or GPIO failure
    Interface(I::Error),
    /// BUSY stayed asserted past the configured bound
    ///
    /// The controller gives no other fault signal; a wedged BUSY line is the
    /// only observable hardware failure.
    Timeout {
        /// Milliseconds spent polling before giving up
        waited_ms: u32,
    },
    /// Operation not valid in the current panel phase
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// Phase the panel was in
        phase: Phase,
    },
    /// Frame shorter than one full plane
    BufferTooSmall { required: usize, provided: usize },
}

impl<I: DisplayInterface> Error<I> {
    /// Whether this error is a busy-line timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Interface(e) => write!(f, "Interface error: {e:?}"),
            Error::Timeout { waited_ms } => {
                write!(f, "Display busy for {waited_ms} ms, giving up")
            }
            Error::InvalidState { operation, phase } => {
                write!(f, "Cannot {operation} while panel is {phase:?}")
            }
            Error::BufferTooSmall { required, provided } => {
                write!(f, "Frame has {provided} bytes, panel needs {required}")
            }
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Rejected [`Builder`](crate::Builder) input
#[derive(Debug)]
pub enum BuilderError {
    /// `dimensions()` was never called
    MissingDimensions,
    /// Outside the controller's gate/source range, or columns not byte aligned
    InvalidDimensions { rows: u16, cols: u16 },
    /// Zero busy poll interval or timeout
    InvalidTiming,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BuilderError::MissingDimensions => write!(f, "Dimensions must be specified"),
            BuilderError::InvalidDimensions { rows, cols } => write!(
                f,
                "Invalid dimensions {rows}x{cols} (max {MAX_GATE_OUTPUTS}x{MAX_SOURCE_OUTPUTS}, cols must be multiple of 8)"
            ),
            BuilderError::InvalidTiming => {
                write!(f, "Busy poll interval and timeout must be non-zero")
            }
        }
    }
}

impl core::error::Error for BuilderError {}
