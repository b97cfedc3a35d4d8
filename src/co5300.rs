
// Minimal CO5300 panel driver (Standard SPI mode, no D/C pin).
// Works with any embedded-hal 1.0 SpiDevice and embedded-graphics.
//
// Wiring on Waveshare ESP32-S3 Touch AMOLED 1.43” (CO5300):
//   CS  = GPIO9
//   SCK = GPIO10
//   IO0/MOSI = GPIO11
//   (IO1..IO3 unused in Standard SPI mode)
//   RST = GPIO21
//
// Protocol (Standard SPI):
//   Every write begins with 0x02, then one byte CMD, then N data bytes.
//   Example: [0x02, 0x11] -> Sleep Out
//            [0x02, 0x3A, 0x55] -> Pixel Format = 16bpp (RGB565)
// Geometry: panel is 466 x 466 logical pixels (square).
//
// Drawing only touches the local framebuffer and grows a dirty rectangle;
// `present()` pushes that rectangle to the panel.

use embedded_graphics::{
    pixelcolor::{raw::RawU16, Rgb565},
    prelude::*,
    primitives::Rectangle,
};
use embedded_hal::{
    delay::DelayNs,
    digital::OutputPin,
    spi::{Operation, SpiDevice},
};

use crate::display::Panel;

pub const CO5300_WIDTH: u16 = 466;
pub const CO5300_HEIGHT: u16 = 466;
const COLUMN_OFFSET: u16 = 0x0006;

const CMD_SWRESET: u8 = 0x01;
const CMD_SLPOUT: u8 = 0x11;
const CMD_NORON: u8 = 0x13;
const CMD_DISPON: u8 = 0x29;
const CMD_CASET: u8 = 0x2A;
const CMD_RASET: u8 = 0x2B;
const CMD_MADCTL: u8 = 0x36;
const CMD_COLMOD: u8 = 0x3A;
const CMD_BRIGHTNESS: u8 = 0x51;
const CMD_BCTRL: u8 = 0x53;
const RAMWR_OPCODE: u8 = 0x2C;
const RAMWRC_OPCODE: u8 = 0x3C;

const ROW_BYTES: usize = CO5300_WIDTH as usize * 2;

/// Error type that wraps SPI and GPIO errors.
#[derive(Debug)]
pub enum Co5300Error<SpiE, GpioE> {
    Spi(SpiE),
    Gpio(GpioE),
    OutOfBounds,
}

#[inline]
fn header(cmd: u8) -> [u8; 4] {
    [0x02, 0x00, cmd, 0x00]
}

// Inclusive pixel bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Dirty {
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
}

impl Dirty {
    fn union(self, other: Dirty) -> Dirty {
        Dirty {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A very small CO5300 panel driver speaking the "0x02 + CMD + DATA" SPI framing.
/// No D/C pin is used; CS is handled by the `SpiDevice` implementation.
pub struct Co5300Display<'fb, SPI, RST> {
    pub spi: SPI,
    rst: Option<RST>,
    w: u16,
    h: u16,
    x_off: u16,
    y_off: u16,
    fb: &'fb mut [u16], // framebuffer storage
    dirty: Option<Dirty>,
}

impl<'fb, SPI, RST> Co5300Display<'fb, SPI, RST>
where
    SPI: SpiDevice<u8>,
    RST: OutputPin,
{
    /// Create + init the panel. Call once at startup.
    ///
    /// * `spi` - an SPI device with CS control (e.g., `embedded_hal_bus::spi::ExclusiveDevice`)
    /// * `rst` - optional reset pin (recommended to wire)
    /// * `delay` - any `DelayNs` impl (spin delay is fine)
    /// * `width`, `height` - normally 466x466 for this AMOLED
    pub fn new(
        spi: SPI,
        rst: Option<RST>,
        delay: &mut impl DelayNs,
        width: u16,
        height: u16,
        fb: &'fb mut [u16],
    ) -> Result<Self, Co5300Error<SPI::Error, RST::Error>> {
        if width == 0 || height == 0 || width > CO5300_WIDTH || height > CO5300_HEIGHT {
            return Err(Co5300Error::OutOfBounds);
        }
        // Validate FB size matches WxH (RGB565)
        if fb.len() != (width as usize) * (height as usize) {
            return Err(Co5300Error::OutOfBounds);
        }

        let mut this = Self {
            spi,
            rst,
            w: width,
            h: height,
            x_off: COLUMN_OFFSET,
            y_off: 0,
            fb,
            dirty: None,
        };

        // Hard reset sequence
        if let Some(r) = this.rst.as_mut() {
            r.set_high().map_err(Co5300Error::Gpio)?;
            delay.delay_ms(2);
            r.set_low().map_err(Co5300Error::Gpio)?;
            delay.delay_ms(80);
            r.set_high().map_err(Co5300Error::Gpio)?;
            delay.delay_ms(200);
        }

        this.cmd(CMD_SWRESET, &[])?;
        delay.delay_ms(150);

        this.cmd(CMD_SLPOUT, &[])?;
        delay.delay_ms(180);

        // RGB565
        this.cmd(CMD_COLMOD, &[0x55])?;
        delay.delay_ms(2);

        this.cmd(0xC4, &[0x80])?;
        this.cmd(CMD_NORON, &[])?;

        this.cmd(CMD_BCTRL, &[0x20])?;
        delay.delay_ms(1);

        // vendor enable
        this.cmd(0x63, &[0xFF])?;
        delay.delay_ms(1);

        // Dark until the first frame is pushed
        this.cmd(CMD_BRIGHTNESS, &[0x00])?;
        delay.delay_ms(1);

        this.cmd(CMD_DISPON, &[])?;
        delay.delay_ms(200);

        this.cmd(CMD_MADCTL, &[0x00])?;

        // Panel RAM is garbage after reset, push the cleared FB on first present
        this.fb.fill(0);
        this.mark_dirty(Dirty { x0: 0, y0: 0, x1: width - 1, y1: height - 1 });

        Ok(this)
    }

    /// Read back a framebuffer pixel.
    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb565> {
        if x >= self.w || y >= self.h {
            return None;
        }
        Some(RawU16::new(self.fb[(y as usize) * (self.w as usize) + (x as usize)]).into())
    }

    /// Panel brightness, 0..=255.
    pub fn set_brightness(&mut self, level: u8) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        self.cmd(CMD_BRIGHTNESS, &[level])
    }

    /// True if `present()` has something to send.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    /// Push the dirty rectangle to the panel.
    pub fn flush(&mut self) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        if let Some(d) = self.dirty.take() {
            self.flush_fb_rect_even(d.x0, d.y0, d.x1, d.y1)?;
        }
        Ok(())
    }

    fn mark_dirty(&mut self, area: Dirty) {
        self.dirty = Some(match self.dirty {
            Some(d) => d.union(area),
            None => area,
        });
    }

    // Raw window set (no even expansion, still applies panel offsets)
    #[cfg_attr(target_arch = "xtensa", esp_hal::ram)]
    fn set_window_raw(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        if x0 > x1 || y0 > y1 || x1 >= self.w || y1 >= self.h {
            return Err(Co5300Error::OutOfBounds);
        }

        let x0p = x0 + self.x_off;
        let x1p = x1 + self.x_off;
        let y0p = y0 + self.y_off;
        let y1p = y1 + self.y_off;

        let ca = [(x0p >> 8) as u8, (x0p & 0xFF) as u8, (x1p >> 8) as u8, (x1p & 0xFF) as u8];
        let ra = [(y0p >> 8) as u8, (y0p & 0xFF) as u8, (y1p >> 8) as u8, (y1p & 0xFF) as u8];

        self.cmd(CMD_CASET, &ca)?;
        self.cmd(CMD_RASET, &ra)?;
        Ok(())
    }

    // Flush an FB rectangle, forcing even start/end (2x2 tiles). One row per
    // transaction: RAMWR for the first, RAMWRC to continue.
    #[cfg_attr(target_arch = "xtensa", esp_hal::ram)]
    fn flush_fb_rect_even(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        if x0 > x1 || y0 > y1 || x0 >= self.w || y0 >= self.h {
            return Ok(());
        }

        let ax0 = x0 & !1;
        let ay0 = y0 & !1;
        let ax1 = (x1 | 1).min(self.w - 1);
        let ay1 = (y1 | 1).min(self.h - 1);
        let ew = (ax1 - ax0 + 1) as usize;

        self.set_window_raw(ax0, ay0, ax1, ay1)?;

        let fbw = self.w as usize;
        let mut row = [0u8; ROW_BYTES];
        for y in ay0..=ay1 {
            let base = (y as usize) * fbw + (ax0 as usize);
            for (i, px) in self.fb[base..base + ew].iter().enumerate() {
                let [hi, lo] = px.to_be_bytes();
                row[2 * i] = hi;
                row[2 * i + 1] = lo;
            }
            let opcode = if y == ay0 { RAMWR_OPCODE } else { RAMWRC_OPCODE };
            let hdr = header(opcode);
            self.spi
                .transaction(&mut [Operation::Write(&hdr), Operation::Write(&row[..2 * ew])])
                .map_err(Co5300Error::Spi)?;
        }
        Ok(())
    }

    #[cfg_attr(target_arch = "xtensa", esp_hal::ram)]
    fn cmd(&mut self, cmd: u8, data: &[u8]) -> Result<(), Co5300Error<SPI::Error, RST::Error>> {
        let hdr = header(cmd);
        if data.is_empty() {
            self.spi.write(&hdr).map_err(Co5300Error::Spi)
        } else {
            self.spi
                .transaction(&mut [Operation::Write(&hdr), Operation::Write(data)])
                .map_err(Co5300Error::Spi)
        }
    }
}

// -------------------- embedded-graphics integration --------------------
impl<'fb, SPI, RST> OriginDimensions for Co5300Display<'fb, SPI, RST>
where
    SPI: SpiDevice<u8>,
    RST: OutputPin,
{
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<'fb, SPI, RST> DrawTarget for Co5300Display<'fb, SPI, RST>
where
    SPI: SpiDevice<u8>,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = Co5300Error<SPI::Error, RST::Error>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        let mut area: Option<Dirty> = None;
        for Pixel(p, c) in pixels {
            if p.x < 0 || p.y < 0 {
                continue;
            }
            let (x, y) = (p.x as u16, p.y as u16);
            if x >= self.w || y >= self.h {
                continue;
            }
            self.fb[(y as usize) * (self.w as usize) + (x as usize)] = c.into_storage();

            let px = Dirty { x0: x, y0: y, x1: x, y1: y };
            area = Some(match area {
                Some(d) => d.union(px),
                None => px,
            });
        }
        if let Some(d) = area {
            self.mark_dirty(d);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        let inter = area.intersection(&self.bounding_box());
        let Some(br) = inter.bottom_right() else {
            return Ok(());
        };

        let (x0, y0) = (inter.top_left.x as u16, inter.top_left.y as u16);
        let (x1, y1) = (br.x as u16, br.y as u16);
        let fbw = self.w as usize;
        let raw = color.into_storage();
        for y in y0..=y1 {
            let base = (y as usize) * fbw;
            self.fb[base + x0 as usize..=base + x1 as usize].fill(raw);
        }
        self.mark_dirty(Dirty { x0, y0, x1, y1 });
        Ok(())
    }

    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        self.fb.fill(color.into_storage());
        self.mark_dirty(Dirty { x0: 0, y0: 0, x1: self.w - 1, y1: self.h - 1 });
        Ok(())
    }
}

impl<'fb, SPI, RST> Panel for Co5300Display<'fb, SPI, RST>
where
    SPI: SpiDevice<u8>,
    RST: OutputPin,
{
    fn set_backlight(&mut self, percent: u8) -> Result<(), Self::Error> {
        let level = (percent.min(100) as u16 * 255 / 100) as u8;
        self.set_brightness(level)
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        self.flush()
    }
}

// Convenience builder for the full 466x466 panel.
pub fn new_with_defaults<'fb, SPI, RST>(
    spi: SPI,
    rst: Option<RST>,
    delay: &mut impl DelayNs,
    fb: &'fb mut [u16],
) -> Result<Co5300Display<'fb, SPI, RST>, Co5300Error<SPI::Error, RST::Error>>
where
    SPI: SpiDevice<u8>,
    RST: OutputPin,
{
    Co5300Display::new(spi, rst, delay, CO5300_WIDTH, CO5300_HEIGHT, fb)
}
