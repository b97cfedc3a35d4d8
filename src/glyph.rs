//! Seven-segment digits on the glyph grid.
//!
//! A digit occupies a 4 x 7 grid of corners. Segment order follows the usual
//! a..g naming:
//!
//! ```text
//!      0
//!    5   1
//!      6
//!    4   2
//!      3
//! ```

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};

use crate::config::DIGIT_PITCH;
use crate::segment::{draw_grid_horizontal, draw_grid_vertical, Axis};

/// Which segments are lit, indexed top, upper-right, lower-right, bottom, lower-left,
/// upper-left, middle.
pub type SegmentPattern = [bool; 7];

pub const SEGMENT_COUNT: usize = 7;

/// Grid units every glyph bar spans.
pub const SEGMENT_UNITS: i32 = 4;

/// Patterns for 0..=9.
pub const DIGITS: [SegmentPattern; 10] = [
    [true, true, true, true, true, true, false],
    [false, true, true, false, false, false, false],
    [true, true, false, true, true, false, true],
    [true, true, true, true, false, false, true],
    [false, true, true, false, false, true, true],
    [true, false, true, true, false, true, true],
    [true, false, true, true, true, true, true],
    [true, true, true, false, false, false, false],
    [true, true, true, true, true, true, true],
    [true, true, true, true, false, true, true],
];

/// Where each segment sits relative to the glyph's top-left corner, in grid units,
/// and which way it runs.
pub const SEGMENT_LAYOUT: [(i32, i32, Axis); SEGMENT_COUNT] = [
    (0, 0, Axis::Horizontal), // top
    (3, 0, Axis::Vertical),   // upper right
    (3, 3, Axis::Vertical),   // lower right
    (0, 6, Axis::Horizontal), // bottom
    (0, 3, Axis::Vertical),   // lower left
    (0, 0, Axis::Vertical),   // upper left
    (0, 3, Axis::Horizontal), // middle
];

/// Draw the lit segments of `segs` with the glyph's top-left grid corner at `(col, row)`.
///
/// Unlit segments are skipped, nothing is erased.
pub fn draw_segments<D>(
    target: &mut D,
    col: i32,
    row: i32,
    cell: i32,
    segs: &SegmentPattern,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for (lit, &(dx, dy, axis)) in segs.iter().zip(SEGMENT_LAYOUT.iter()) {
        if !lit {
            continue;
        }
        match axis {
            Axis::Horizontal => {
                draw_grid_horizontal(target, col + dx, row + dy, cell, SEGMENT_UNITS, color)?
            }
            Axis::Vertical => {
                draw_grid_vertical(target, col + dx, row + dy, cell, SEGMENT_UNITS, color)?
            }
        }
    }
    Ok(())
}

/// Draw one decimal digit. Values above 9 use their last decimal digit.
pub fn draw_digit<D>(
    target: &mut D,
    col: i32,
    row: i32,
    cell: i32,
    digit: u8,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_segments(target, col, row, cell, &DIGITS[(digit % 10) as usize], color)
}

/// Tens and ones of a two-digit value. Values above 99 keep their last two digits.
#[inline]
pub const fn split_two_digits(value: u8) -> (u8, u8) {
    let value = value % 100;
    (value / 10, value % 10)
}

/// Draw a value 0..=99 as two glyphs, [`DIGIT_PITCH`] grid units apart.
pub fn draw_number<D>(
    target: &mut D,
    col: i32,
    row: i32,
    cell: i32,
    value: u8,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let (tens, ones) = split_two_digits(value);
    draw_digit(target, col, row, cell, tens, color)?;
    draw_digit(target, col + DIGIT_PITCH, row, cell, ones, color)
}

/// Two short bars stacked between the hour and minute pairs.
pub fn draw_colon<D>(target: &mut D, col: i32, cell: i32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_grid_vertical(target, col, 2, cell, 2, color)?;
    draw_grid_vertical(target, col, 4, cell, 2, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    const CELL: i32 = 7;

    // A pixel in the middle of each segment's body for a glyph at the origin.
    fn probe(segment: usize) -> Point {
        let (dx, dy, axis) = SEGMENT_LAYOUT[segment];
        // Bar runs from corner + 5 to corner + 22 along, 1..=5 across.
        let (across, along) = (dx * CELL + 3, dy * CELL + 13);
        match axis {
            Axis::Vertical => Point::new(across, along),
            Axis::Horizontal => Point::new(dx * CELL + 13, dy * CELL + 3),
        }
    }

    #[test]
    fn every_digit_lights_exactly_its_pattern() {
        for digit in 0..10u8 {
            let mut display = MockDisplay::new();
            draw_digit(&mut display, 0, 0, CELL, digit, Rgb565::WHITE).unwrap();

            for (segment, &lit) in DIGITS[digit as usize].iter().enumerate() {
                let expected = lit.then_some(Rgb565::WHITE);
                assert_eq!(
                    display.get_pixel(probe(segment)),
                    expected,
                    "digit {digit} segment {segment}"
                );
            }
        }
    }

    #[test]
    fn digit_matches_individually_drawn_segments() {
        for digit in 0..10u8 {
            let mut whole = MockDisplay::new();
            draw_digit(&mut whole, 0, 0, CELL, digit, Rgb565::YELLOW).unwrap();

            let mut parts = MockDisplay::new();
            for (segment, &lit) in DIGITS[digit as usize].iter().enumerate() {
                if lit {
                    let mut only = [false; SEGMENT_COUNT];
                    only[segment] = true;
                    draw_segments(&mut parts, 0, 0, CELL, &only, Rgb565::YELLOW).unwrap();
                }
            }
            assert_eq!(whole, parts, "digit {digit}");
        }
    }

    #[test]
    fn eight_has_no_overlapping_segments() {
        // MockDisplay panics on overdraw, so drawing all seven bars proves they are disjoint.
        let mut display = MockDisplay::new();
        draw_digit(&mut display, 0, 0, CELL, 8, Rgb565::WHITE).unwrap();
        let area = display.affected_area();
        assert_eq!(area.top_left, Point::new(1, 1));
        assert_eq!(area.bottom_right(), Some(Point::new(26, 47)));
    }

    #[test]
    fn split_two_digits_uses_division_and_modulo() {
        assert_eq!(split_two_digits(7), (0, 7));
        assert_eq!(split_two_digits(99), (9, 9));
        assert_eq!(split_two_digits(40), (4, 0));
        assert_eq!(split_two_digits(123), (2, 3));
    }

    #[test]
    fn number_draws_tens_then_ones() {
        let mut number = MockDisplay::new();
        draw_number(&mut number, 0, 0, CELL, 7, Rgb565::WHITE).unwrap();

        let mut expected = MockDisplay::new();
        draw_digit(&mut expected, 0, 0, CELL, 0, Rgb565::WHITE).unwrap();
        draw_digit(&mut expected, DIGIT_PITCH, 0, CELL, 7, Rgb565::WHITE).unwrap();

        assert_eq!(number, expected);
    }

    #[test]
    fn colon_is_two_separate_dots() {
        let mut display = MockDisplay::new();
        draw_colon(&mut display, 0, CELL, Rgb565::WHITE).unwrap();
        // Upper dot covers rows 19..=22, lower 33..=36.
        assert_eq!(display.get_pixel(Point::new(3, 19)), Some(Rgb565::WHITE));
        assert_eq!(display.get_pixel(Point::new(3, 33)), Some(Rgb565::WHITE));
        assert_eq!(display.get_pixel(Point::new(3, 26)), None);
    }
}
