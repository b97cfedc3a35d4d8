//! In-memory panel used for host previews and full-frame tests.

use core::convert::Infallible;
use core::fmt;

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::{DrawTarget, OriginDimensions, Pixel, RgbColor, Size},
};

use crate::display::Panel;

/// A `W` x `H` RGB565 framebuffer. Out-of-bounds pixels are dropped.
pub struct MemoryPanel<const W: usize, const H: usize> {
    pixels: [[Rgb565; W]; H],
    backlight: u8,
    presents: u32,
}

impl<const W: usize, const H: usize> MemoryPanel<W, H> {
    pub const fn new() -> Self {
        Self {
            pixels: [[Rgb565::BLACK; W]; H],
            backlight: 100,
            presents: 0,
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb565> {
        self.pixels.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Last backlight level set, in percent.
    #[inline]
    pub fn backlight(&self) -> u8 {
        self.backlight
    }

    /// Number of completed frames.
    #[inline]
    pub fn presents(&self) -> u32 {
        self.presents
    }

    /// Count of pixels that are not black.
    pub fn lit_pixels(&self) -> usize {
        self.pixels
            .iter()
            .flatten()
            .filter(|c| **c != Rgb565::BLACK)
            .count()
    }

    /// Dump the frame as text, one character per pixel: ' ' black, '.' dim, '#' bright.
    pub fn write_text_art<F: fmt::Write>(&self, out: &mut F) -> fmt::Result {
        for row in self.pixels.iter() {
            for c in row.iter() {
                // channel maxima are 31/63/31
                let level = c.r() as u16 * 2 + c.g() as u16 + c.b() as u16 * 2;
                let ch = match level {
                    0 => ' ',
                    1..=95 => '.',
                    _ => '#',
                };
                out.write_char(ch)?;
            }
            out.write_char('\n')?;
        }
        Ok(())
    }
}

impl<const W: usize, const H: usize> Default for MemoryPanel<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> OriginDimensions for MemoryPanel<W, H> {
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const W: usize, const H: usize> DrawTarget for MemoryPanel<W, H> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        for Pixel(p, c) in pixels {
            if p.x < 0 || p.y < 0 {
                continue;
            }
            if let Some(px) = self
                .pixels
                .get_mut(p.y as usize)
                .and_then(|row| row.get_mut(p.x as usize))
            {
                *px = c;
            }
        }
        Ok(())
    }
}

impl<const W: usize, const H: usize> Panel for MemoryPanel<W, H> {
    fn set_backlight(&mut self, percent: u8) -> Result<(), Self::Error> {
        self.backlight = percent.min(100);
        Ok(())
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        self.presents += 1;
        Ok(())
    }
}
