//! Display abstraction and bring-up.
//
// - `Panel` is what the watch face draws on: a `DrawTarget` that can also dim itself and
//   push a finished frame.
// - `Scaled` draws the small logical canvas onto the big round panel.
// - `setup_display` (firmware only) powers up the CO5300 and returns it ready to draw.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::{DrawTarget, OriginDimensions, Pixel, Point, Size},
    primitives::{ContainsPoint, Rectangle},
};

/// A drawable screen with a backlight.
pub trait Panel: DrawTarget<Color = Rgb565> {
    /// Backlight intensity in percent, 0..=100. Larger values are clamped.
    fn set_backlight(&mut self, percent: u8) -> Result<(), Self::Error>;

    /// Make everything drawn since the last call visible.
    fn present(&mut self) -> Result<(), Self::Error>;
}

/// Draws a logical canvas of `size` pixels onto `inner`, each logical pixel as a
/// `scale` x `scale` block, shifted by `offset`.
pub struct Scaled<D> {
    inner: D,
    size: Size,
    scale: u32,
    offset: Point,
}

impl<D> Scaled<D>
where
    D: Panel,
{
    pub fn new(inner: D, size: Size, scale: u32, offset: Point) -> Self {
        Self {
            inner,
            size,
            scale: scale.max(1),
            offset,
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    // Panel rectangle covered by a logical rectangle.
    fn map_rect(&self, area: &Rectangle) -> Rectangle {
        let s = self.scale as i32;
        Rectangle::new(
            self.offset + Point::new(area.top_left.x * s, area.top_left.y * s),
            Size::new(area.size.width * self.scale, area.size.height * self.scale),
        )
    }
}

impl<D> OriginDimensions for Scaled<D> {
    fn size(&self) -> Size {
        self.size
    }
}

impl<D> DrawTarget for Scaled<D>
where
    D: Panel,
{
    type Color = Rgb565;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        let bounds = Rectangle::new(Point::zero(), self.size);
        for Pixel(p, c) in pixels {
            if !bounds.contains(p) {
                continue;
            }
            let block = self.map_rect(&Rectangle::new(p, Size::new(1, 1)));
            self.inner.fill_solid(&block, c)?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        let clipped = area.intersection(&Rectangle::new(Point::zero(), self.size));
        if clipped.is_zero_sized() {
            return Ok(());
        }
        let mapped = self.map_rect(&clipped);
        self.inner.fill_solid(&mapped, color)
    }

    // Only the canvas area, the border keeps whatever the panel was initialised with.
    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        let canvas = self.map_rect(&Rectangle::new(Point::zero(), self.size));
        self.inner.fill_solid(&canvas, color)
    }
}

impl<D> Panel for Scaled<D>
where
    D: Panel,
{
    fn set_backlight(&mut self, percent: u8) -> Result<(), Self::Error> {
        self.inner.set_backlight(percent)
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        self.inner.present()
    }
}

// ==================================================================
// CO5300 (466x466) bring-up, firmware only
// ==================================================================
#[cfg(target_arch = "xtensa")]
mod co5300_backend {
    use embedded_hal::delay::DelayNs;
    use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
    use esp_hal::{
        dma::{DmaRxBuf, DmaTxBuf},
        dma_buffers,
        gpio::Output,
        spi::{
            master::{Config, Spi, SpiDmaBus},
            Mode,
        },
        time::Rate,
        Blocking,
    };

    use crate::co5300::{self, Co5300Display};
    use crate::wiring::DisplayPins;

    // A tiny busy-wait delay that satisfies embedded-hal 1.0 DelayNs.
    struct SpinDelay;

    impl DelayNs for SpinDelay {
        #[inline]
        fn delay_ns(&mut self, ns: u32) {
            let mut n = ns / 50 + 1;
            while n != 0 {
                core::hint::spin_loop();
                n -= 1;
            }
        }
    }

    pub type DisplayType<'a> =
        Co5300Display<'a, ExclusiveDevice<SpiDmaBus<'a, Blocking>, Output<'a>, NoDelay>, Output<'a>>;

    pub fn setup_display<'a>(display_pins: DisplayPins<'a>, fb: &'a mut [u16]) -> DisplayType<'a> {
        let DisplayPins {
            spi2,
            cs,
            clk,
            do0,
            rst,
            mut en,
            dma_ch0,
        } = display_pins;

        let mut delay = SpinDelay;

        // quick toggle EN pin so the panel rails start from off
        en.set_low();
        delay.delay_ms(10);
        en.set_high();
        delay.delay_ms(100);

        // SPI @ 60 MHz, Mode 0
        let spi = Spi::new(
            spi2,
            Config::default()
                .with_frequency(Rate::from_hz(60_000_000))
                .with_mode(Mode::_0),
        )
        .expect("SPI2 config rejected")
        .with_sck(clk)
        .with_mosi(do0)
        .with_dma(dma_ch0);

        let (rx_buf, rx_desc, tx_buf, tx_desc) = dma_buffers!(4096, 4096);
        let rx = DmaRxBuf::new(rx_desc, rx_buf).expect("DMA rx buffer");
        let tx = DmaTxBuf::new(tx_desc, tx_buf).expect("DMA tx buffer");

        let spi_bus: SpiDmaBus<'_, Blocking> = spi.with_buffers(rx, tx);
        let spi_dev = ExclusiveDevice::new(spi_bus, cs, NoDelay).expect("CS pin");

        co5300::new_with_defaults(spi_dev, Some(rst), &mut delay, fb).expect("CO5300 init failed")
    }
}

#[cfg(target_arch = "xtensa")]
pub use co5300_backend::{setup_display, DisplayType};
