//! Landscape frame buffer in the panel's native byte layout
//!
//! The 2.9" panel is addressed in portrait (128 sources x 296 gates) but
//! content is drawn in landscape, `rows` pixels wide and `cols` pixels high.
//! Each byte holds a vertical run of 8 pixels, least significant bit on top:
//!
//! ```text
//! index = (y / 8) * width + x
//! bit   = y % 8          (1 = white, 0 = black)
//! ```
//!
//! With the `graphics` feature [`FrameBuffer`] is an embedded-graphics
//! `DrawTarget` where `BinaryColor::On` is black ink.
//!
//! ## Example
//!
//! ```
//! use ssd1680::{Color, Dimensions, FrameBuffer};
//!
//! let mut frame = FrameBuffer::new([0u8; 4736], Dimensions::PANEL_2IN9).unwrap();
//! frame.fill(Color::White);
//! frame.set_pixel(10, 3, Color::Black);
//! assert_eq!(frame.as_bytes()[10], 0b1111_0111);
//! ```

use crate::config::Dimensions;

/// Pixel color on a black/white panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Byte with all 8 pixels set to this color
    pub const fn fill_byte(self) -> u8 {
        match self {
            Color::Black => 0x00,
            Color::White => 0xFF,
        }
    }
}

/// Buffer length does not match the panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeMismatch {
    pub required: usize,
    pub provided: usize,
}

impl core::fmt::Display for SizeMismatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Frame buffer is {} bytes, panel needs {}",
            self.provided, self.required
        )
    }
}

impl core::error::Error for SizeMismatch {}

/// One bit per pixel landscape buffer
pub struct FrameBuffer<B> {
    buffer: B,
    width: u16,
    height: u16,
}

impl<B> FrameBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Wrap `buffer`, which must be exactly `dimensions.buffer_size()` bytes
    pub fn new(buffer: B, dimensions: Dimensions) -> Result<Self, SizeMismatch> {
        let required = dimensions.buffer_size();
        let provided = buffer.as_ref().len();
        if provided != required {
            return Err(SizeMismatch { required, provided });
        }
        Ok(Self {
            buffer,
            width: dimensions.rows,
            height: dimensions.cols,
        })
    }

    /// Landscape width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Landscape height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Set every pixel to `color`
    pub fn fill(&mut self, color: Color) {
        self.buffer.as_mut().fill(color.fill_byte());
    }

    /// Set a single pixel; out-of-range coordinates are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some((index, mask)) = self.locate(x, y) else {
            return;
        };
        let byte = &mut self.buffer.as_mut()[index];
        match color {
            Color::White => *byte |= mask,
            Color::Black => *byte &= !mask,
        }
    }

    /// Read back a pixel
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let (index, mask) = self.locate(x, y)?;
        if self.buffer.as_ref()[index] & mask != 0 {
            Some(Color::White)
        } else {
            Some(Color::Black)
        }
    }

    /// Raw bytes in transfer layout
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    /// Give the buffer back
    pub fn into_inner(self) -> B {
        self.buffer
    }

    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some(((y / 8) * self.width as usize + x, 1 << (y % 8)))
    }
}

#[cfg(feature = "graphics")]
mod draw_target {
    use core::convert::Infallible;

    use embedded_graphics_core::{
        Pixel,
        draw_target::DrawTarget,
        geometry::{OriginDimensions, Size},
        pixelcolor::BinaryColor,
    };

    use super::{Color, FrameBuffer};

    impl From<BinaryColor> for Color {
        fn from(color: BinaryColor) -> Self {
            match color {
                BinaryColor::On => Color::Black,
                BinaryColor::Off => Color::White,
            }
        }
    }

    impl<B> OriginDimensions for FrameBuffer<B>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        fn size(&self) -> Size {
            Size::new(u32::from(self.width()), u32::from(self.height()))
        }
    }

    impl<B> DrawTarget for FrameBuffer<B>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                self.set_pixel(point.x, point.y, color.into());
            }
            Ok(())
        }

        fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
            self.fill(color.into());
            Ok(())
        }
    }
}
