//! Watch face rendering.
//!
//! This module provides:
//! - `FaceState`, everything one frame depends on
//! - `draw_face`, which clears the canvas and draws digits, colon, status text,
//!   battery and the seconds bar
//! - `format_date`, the `Mo-05.May25` status line
//!
//! All coordinates are on the 160x80 logical canvas; see `config` for the layout.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::{ascii::FONT_7X13, MonoTextStyle},
    pixelcolor::{Rgb565, Rgb888},
    prelude::{DrawTarget, Point, Primitive, RgbColor, Size},
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
    Drawable,
};
use heapless::String;

use crate::battery::{draw_battery, PowerStatus};
use crate::clock::DateTime;
use crate::config::{
    BATTERY_ORIGIN, CELL, COLON_COL, LEFT_PAIR_COL, RIGHT_PAIR_COL, SECONDS_BAR_BOTTOM,
    SECONDS_BAR_TOP, SECONDS_BAR_X, TEXT_ORIGIN,
};
use crate::glyph::{draw_colon, draw_number};
use crate::mode::Mode;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const WEEKDAYS: [&str; 7] = ["Mo-", "Tu-", "We-", "Th-", "Fr-", "Sa-", "Su-"];

pub const DIGIT_COLOR: Rgb565 = Rgb565::WHITE;

fn rgb(r: u8, g: u8, b: u8) -> Rgb565 {
    Rgb888::new(r, g, b).into()
}

/// Everything a frame depends on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceState {
    pub mode: Mode,
    pub now: DateTime,
    pub power: Option<PowerStatus>,
}

pub type StatusLine = String<16>;

/// `Mo-05.May25`
pub fn format_date(dt: &DateTime) -> StatusLine {
    let mut line = StatusLine::new();
    let weekday = WEEKDAYS[(dt.weekday % 7) as usize];
    let month = MONTHS[(dt.month.clamp(1, 12) - 1) as usize];
    // 14 chars at most, cannot overflow
    let _ = write!(line, "{}{:02}.{}{:02}", weekday, dt.day, month, dt.year % 100);
    line
}

/// Text and colour of the status line.
pub fn status_line(mode: Mode, now: &DateTime) -> (StatusLine, Rgb565) {
    match mode {
        Mode::Display => (format_date(now), rgb(128, 128, 128)),
        m => {
            let mut line = StatusLine::new();
            let _ = line.push_str(m.label());
            let color = if m.is_date_field() {
                rgb(0, 255, 128)
            } else {
                rgb(0, 128, 128)
            };
            (line, color)
        }
    }
}

/// Colour of the seconds bar, brightening over the minute.
pub fn seconds_bar_color(second: u8) -> Rgb565 {
    let level = (second.min(63) as u16 * 4).min(255) as u8;
    rgb(level, level, level)
}

fn draw_digits<D>(target: &mut D, mode: Mode, now: &DateTime) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    match mode {
        Mode::ChangeYear => {
            draw_number(target, LEFT_PAIR_COL, 0, CELL, (now.year / 100) as u8, DIGIT_COLOR)?;
            draw_number(target, RIGHT_PAIR_COL, 0, CELL, (now.year % 100) as u8, DIGIT_COLOR)
        }
        Mode::ChangeMonth => draw_number(target, RIGHT_PAIR_COL, 0, CELL, now.month, DIGIT_COLOR),
        Mode::ChangeDay => draw_number(target, RIGHT_PAIR_COL, 0, CELL, now.day, DIGIT_COLOR),
        _ => {
            draw_number(target, LEFT_PAIR_COL, 0, CELL, now.hour, DIGIT_COLOR)?;
            draw_number(target, RIGHT_PAIR_COL, 0, CELL, now.minute, DIGIT_COLOR)
        }
    }
}

fn draw_seconds_bar<D>(target: &mut D, second: u8) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let right = 2 * second as i32;
    if right <= SECONDS_BAR_X {
        return Ok(());
    }
    Rectangle::new(
        Point::new(SECONDS_BAR_X, SECONDS_BAR_TOP),
        Size::new(
            (right - SECONDS_BAR_X) as u32,
            (SECONDS_BAR_BOTTOM - SECONDS_BAR_TOP) as u32,
        ),
    )
    .into_styled(PrimitiveStyle::with_fill(seconds_bar_color(second)))
    .draw(target)
}

/// Render one full frame.
pub fn draw_face<D>(target: &mut D, face: &FaceState) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let now = &face.now;
    target.clear(Rgb565::BLACK)?;

    draw_digits(target, face.mode, now)?;
    if !face.mode.is_date_field() && now.second % 2 == 0 {
        draw_colon(target, COLON_COL, CELL, DIGIT_COLOR)?;
    }

    let (line, color) = status_line(face.mode, now);
    Text::with_baseline(
        &line,
        TEXT_ORIGIN,
        MonoTextStyle::new(&FONT_7X13, color),
        Baseline::Top,
    )
    .draw(target)?;

    if let Some(power) = face.power.as_ref() {
        draw_battery(target, BATTERY_ORIGIN, power)?;
    }
    draw_seconds_bar(target, now.second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::MemoryPanel;
    use crate::glyph::DIGITS;
    use embedded_graphics::{mock_display::MockDisplay, primitives::PointsIter};

    type Canvas = MemoryPanel<160, 80>;

    fn face(mode: Mode, second: u8) -> FaceState {
        FaceState {
            mode,
            now: DateTime::new(2025, 5, 5, 12, 34, second),
            power: Some(PowerStatus::new(4150, 0)),
        }
    }

    fn render(state: &FaceState) -> Canvas {
        let mut canvas = Canvas::new();
        draw_face(&mut canvas, state).unwrap();
        canvas
    }

    // Count lit pixels inside a rectangle.
    fn lit_in(canvas: &Canvas, x0: usize, y0: usize, x1: usize, y1: usize) -> usize {
        let mut n = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                if canvas.pixel(x, y) != Some(Rgb565::BLACK) {
                    n += 1;
                }
            }
        }
        n
    }

    // Pixels one glyph lights up on its own.
    fn glyph_pixels(value: u8) -> usize {
        let mut display: MockDisplay<Rgb565> = MockDisplay::new();
        crate::glyph::draw_segments(&mut display, 0, 0, CELL, &DIGITS[value as usize], DIGIT_COLOR).unwrap();
        let area = display.affected_area();
        let mut n = 0;
        for p in area.points() {
            if display.get_pixel(p).is_some() {
                n += 1;
            }
        }
        n
    }

    #[test]
    fn date_line() {
        let dt = DateTime::new(2025, 5, 5, 8, 0, 0);
        assert_eq!(format_date(&dt).as_str(), "Mo-05.May25");
        let dt = DateTime::new(2031, 12, 28, 8, 0, 0);
        assert_eq!(format_date(&dt).as_str(), "Su-28.Dec31");
    }

    #[test]
    fn status_line_colours() {
        let now = DateTime::new(2025, 5, 5, 8, 0, 0);
        let (text, color) = status_line(Mode::ChangeDay, &now);
        assert_eq!(text.as_str(), ">-------DAY");
        assert_eq!(color, rgb(0, 255, 128));

        let (text, color) = status_line(Mode::ChangeHours, &now);
        assert_eq!(text.as_str(), ">-----HOURS");
        assert_eq!(color, rgb(0, 128, 128));

        let (_, color) = status_line(Mode::Display, &now);
        assert_eq!(color, rgb(128, 128, 128));
    }

    #[test]
    fn colon_blinks_on_even_seconds() {
        // colon column 11 spans pixels 77..84, between the two pairs
        let even = render(&face(Mode::Display, 10));
        let odd = render(&face(Mode::Display, 11));
        assert!(lit_in(&even, 77, 0, 84, 49) > 0);
        assert_eq!(lit_in(&odd, 77, 0, 84, 49), 0);
    }

    #[test]
    fn date_modes_hide_colon_and_hours() {
        let month = render(&face(Mode::ChangeMonth, 10));
        assert_eq!(lit_in(&month, 77, 0, 84, 49), 0);
        // nothing at the hour position
        assert_eq!(lit_in(&month, 0, 0, 77, 49), 0);
        // "05" at the minute position
        let expected = glyph_pixels(0) + glyph_pixels(5);
        assert_eq!(lit_in(&month, 84, 0, 160, 50), expected);
    }

    #[test]
    fn time_digits_match_glyphs() {
        let frame = render(&face(Mode::Display, 11));
        assert_eq!(lit_in(&frame, 0, 0, 77, 50), glyph_pixels(1) + glyph_pixels(2));
        assert_eq!(lit_in(&frame, 84, 0, 160, 50), glyph_pixels(3) + glyph_pixels(4));
    }

    #[test]
    fn year_mode_shows_century() {
        let frame = render(&face(Mode::ChangeYear, 10));
        assert_eq!(lit_in(&frame, 0, 0, 77, 50), glyph_pixels(2) + glyph_pixels(0));
        assert_eq!(lit_in(&frame, 84, 0, 160, 50), glyph_pixels(2) + glyph_pixels(5));
    }

    #[test]
    fn seconds_bar_grows() {
        let frame = render(&face(Mode::Display, 30));
        let grey = seconds_bar_color(30);
        assert_eq!(frame.pixel(5, 72), Some(grey));
        assert_eq!(frame.pixel(59, 79), Some(grey));
        assert_eq!(frame.pixel(60, 72), Some(Rgb565::BLACK));
        assert_eq!(frame.pixel(4, 72), Some(Rgb565::BLACK));

        // too early in the minute for a bar
        let frame = render(&face(Mode::Display, 2));
        assert_eq!(lit_in(&frame, 0, 72, 130, 80), 0);
    }

    #[test]
    fn battery_only_with_power_status() {
        let mut state = face(Mode::Display, 1);
        assert!(lit_in(&render(&state), 140, 72, 160, 80) > 0);
        state.power = None;
        assert_eq!(lit_in(&render(&state), 140, 72, 160, 80), 0);
    }

    #[test]
    fn status_text_is_drawn() {
        let frame = render(&face(Mode::Display, 1));
        assert!(lit_in(&frame, 5, 54, 160, 67) > 0);
        assert_eq!(lit_in(&frame, 0, 50, 5, 72), 0);
    }
}
