//! Rounded bar segments with tapered end caps.
//!
//! A segment is laid out "vertically" in segment space: `x` runs across the bar and `y`
//! along it. The [`Axis`] flag transposes every pixel, so a horizontal bar is the exact
//! mirror of a vertical one along the diagonal. That is also why the horizontal helpers
//! take their coordinates swapped.
//!
//! ```text
//!   width 5, length 8
//!     ..#..   end cap (inverted)
//!     .###.
//!     #####   body, length - 2 * tip_height
//!     #####
//!     #####
//!     #####
//!     .###.   end cap
//!     ..#..
//! ```

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
};
use log::warn;

/// Which way a segment runs on screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// Pixels trimmed off each side of a grid cell so neighbouring bars keep a gutter.
pub const GRID_GUTTER: i32 = 2;
/// Extra gap between a grid bar's cap and the shared corner.
pub const GRID_CORNER_GAP: i32 = 3;
/// Pixels removed from a grid bar's length so both ends clear their corners.
pub const GRID_LENGTH_TRIM: i32 = 3;

// Floor-based ceiling division, matches integer maths for non-negative inputs.
#[inline]
pub const fn ceil_div(a: i32, b: i32) -> i32 {
    (a + (b - 1)).div_euclid(b)
}

/// Height of one tapered end cap for a bar `width` pixels wide.
#[inline]
pub const fn tip_height(width: i32) -> i32 {
    ceil_div(width, 2) - 1
}

/// Length of the solid body between the two caps. Negative means the bar is too short
/// for its width.
#[inline]
pub const fn body_height(width: i32, length: i32) -> i32 {
    length - 2 * tip_height(width)
}

/// Whether a bar of this size draws as intended (non-negative body).
#[inline]
pub const fn is_well_formed(width: i32, length: i32) -> bool {
    body_height(width, length) >= 0
}

// Fill a rectangle given in segment space, transposing it for horizontal bars.
fn fill_span<D>(
    target: &mut D,
    axis: Axis,
    top_left: Point,
    size: Size,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if size.width == 0 || size.height == 0 {
        return Ok(());
    }
    let area = match axis {
        Axis::Vertical => Rectangle::new(top_left, size),
        Axis::Horizontal => Rectangle::new(
            Point::new(top_left.y, top_left.x),
            Size::new(size.height, size.width),
        ),
    };
    target.fill_solid(&area, color)
}

/// Draw one tapered cap starting at segment-space `(x, y)`.
///
/// Row `dy` covers `dy + 1 ..= width - 2 - dy`. A normal cap starts wide and narrows,
/// an inverted one starts narrow and widens into the body.
pub fn draw_tip<D>(
    target: &mut D,
    x: i32,
    y: i32,
    width: i32,
    color: Rgb565,
    inverted: bool,
    axis: Axis,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let h = tip_height(width);
    for dy in 0..h {
        let row = if inverted { y + h - 1 - dy } else { y + dy };
        let first = dy + 1;
        let end = width - 1 - dy; // exclusive
        if end <= first {
            continue;
        }
        fill_span(
            target,
            axis,
            Point::new(x + first, row),
            Size::new((end - first) as u32, 1),
            color,
        )?;
    }
    Ok(())
}

/// Draw a full bar: inverted cap, body, cap.
///
/// `x`/`y` are in segment space, so for [`Axis::Horizontal`] they are the screen row and
/// column respectively. Bars that are too short for their width are drawn anyway with
/// an empty body and overlapping caps.
pub fn draw_segment<D>(
    target: &mut D,
    x: i32,
    y: i32,
    width: i32,
    length: i32,
    color: Rgb565,
    axis: Axis,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let tip_h = tip_height(width);
    let body_h = body_height(width, length);
    if !is_well_formed(width, length) {
        warn!(
            "segment {}x{} too short for its caps (body {})",
            width, length, body_h
        );
    }

    draw_tip(target, x, y, width, color, true, axis)?;

    if width > 0 && body_h > 0 {
        fill_span(
            target,
            axis,
            Point::new(x, y + tip_h),
            Size::new(width as u32, body_h as u32),
            color,
        )?;
    }

    draw_tip(target, x, y + tip_h + body_h, width, color, false, axis)
}

/// Vertical bar with its top-left at `at`.
pub fn draw_vertical<D>(target: &mut D, at: Point, width: i32, length: i32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_segment(target, at.x, at.y, width, length, color, Axis::Vertical)
}

/// Horizontal bar with its top-left at `at`.
pub fn draw_horizontal<D>(target: &mut D, at: Point, width: i32, length: i32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_segment(target, at.y, at.x, width, length, color, Axis::Horizontal)
}

/// Bar placed on the glyph grid.
///
/// `(x, y)` is the grid corner in segment space and `units` how many grid corners the
/// bar spans (a 4-unit bar reaches from corner 0 to corner 3). The bar is narrowed by
/// [`GRID_GUTTER`] and pulled back from both corners, so perpendicular bars meeting at
/// a corner never share a pixel.
pub fn draw_grid_segment<D>(
    target: &mut D,
    x: i32,
    y: i32,
    cell: i32,
    units: i32,
    color: Rgb565,
    axis: Axis,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let width = cell - GRID_GUTTER;
    let tip_h = tip_height(width);
    let length = (units - 1) * cell;
    draw_segment(
        target,
        x * cell + 1,
        y * cell + tip_h + GRID_CORNER_GAP,
        width,
        length - GRID_LENGTH_TRIM,
        color,
        axis,
    )
}

/// Vertical grid bar starting at grid corner `(col, row)`.
pub fn draw_grid_vertical<D>(target: &mut D, col: i32, row: i32, cell: i32, units: i32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_grid_segment(target, col, row, cell, units, color, Axis::Vertical)
}

/// Horizontal grid bar starting at grid corner `(col, row)`.
pub fn draw_grid_horizontal<D>(target: &mut D, col: i32, row: i32, cell: i32, units: i32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_grid_segment(target, row, col, cell, units, color, Axis::Horizontal)
}
