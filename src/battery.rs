//! Battery gauge icon.

use embedded_graphics::{
    pixelcolor::{Rgb565, Rgb888},
    prelude::{DrawTarget, Point, Primitive, RgbColor, Size},
    primitives::{PrimitiveStyle, Rectangle},
    Drawable, Pixel,
};

/// Supply voltages read by the board's power monitor, in millivolts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PowerStatus {
    pub battery_mv: u16,
    pub charge_in_mv: u16,
}

impl PowerStatus {
    pub const fn new(battery_mv: u16, charge_in_mv: u16) -> Self {
        Self {
            battery_mv,
            charge_in_mv,
        }
    }

    #[inline]
    pub const fn is_charging(&self) -> bool {
        self.charge_in_mv > CHARGING_MV
    }
}

const GOOD_MV: u16 = 3800;
const OK_MV: u16 = 3600;
const FULL_MV: u16 = 4000;
const CHARGING_MV: u16 = 4000;

/// Outline colour for a battery voltage.
pub fn battery_color(battery_mv: u16) -> Rgb565 {
    if battery_mv > GOOD_MV {
        Rgb888::new(0, 230, 0).into()
    } else if battery_mv > OK_MV {
        Rgb888::new(255, 215, 0).into()
    } else {
        Rgb565::RED
    }
}

// Fill the half-open box [x0, x1) x [y0, y1).
fn fill_box<D>(target: &mut D, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(
        Point::new(x0, y0),
        Size::new((x1 - x0).max(0) as u32, (y1 - y0).max(0) as u32),
    )
    .into_styled(PrimitiveStyle::with_fill(color))
    .draw(target)
}

/// Draw the battery icon with its top-left corner at `origin`.
///
/// The body is 15x7 with a 2x3 nub on the right. Cells are blanked from the right as
/// the voltage drops below 4.0, 3.8 and 3.6 V.
pub fn draw_battery<D>(target: &mut D, origin: Point, status: &PowerStatus) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let (x, y) = (origin.x, origin.y);
    let v = status.battery_mv;
    let color = battery_color(v);

    fill_box(target, x, y, x + 15, y + 7, color)?;
    fill_box(target, x + 15, y + 2, x + 17, y + 5, color)?;

    if v < FULL_MV {
        fill_box(target, x + 11, y + 1, x + 14, y + 6, Rgb565::BLACK)?;
    }
    if v < GOOD_MV {
        fill_box(target, x + 6, y + 1, x + 11, y + 6, Rgb565::BLACK)?;
    }
    if v < OK_MV {
        fill_box(target, x + 1, y + 1, x + 6, y + 6, Rgb565::BLACK)?;
    }

    if status.is_charging() {
        draw_bolt(target, Point::new(x + 6, y))?;
    }
    Ok(())
}

// (dx, dy, shaded)
const BOLT: [(i32, i32, bool); 20] = [
    (1, 0, false),
    (2, 0, true),
    (1, 1, false),
    (0, 1, true),
    (1, 2, false),
    (0, 2, false),
    (0, 3, false),
    (1, 3, false),
    (2, 3, false),
    (3, 3, true),
    (2, 4, false),
    (3, 4, false),
    (4, 4, false),
    (1, 4, true),
    (3, 5, false),
    (4, 5, false),
    (3, 6, false),
    (4, 6, true),
    (3, 7, false),
    (2, 7, true),
];

fn draw_bolt<D>(target: &mut D, at: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let shade: Rgb565 = Rgb888::new(120, 120, 120).into();
    target.draw_iter(BOLT.iter().map(|&(dx, dy, shaded)| {
        let color = if shaded { shade } else { Rgb565::BLACK };
        Pixel(at + Point::new(dx, dy), color)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    fn render(status: PowerStatus) -> MockDisplay<Rgb565> {
        let mut display = MockDisplay::new();
        display.set_allow_overdraw(true);
        draw_battery(&mut display, Point::new(2, 2), &status).unwrap();
        display
    }

    #[test]
    fn colour_thresholds() {
        let green: Rgb565 = Rgb888::new(0, 230, 0).into();
        let amber: Rgb565 = Rgb888::new(255, 215, 0).into();
        assert_eq!(battery_color(4100), green);
        assert_eq!(battery_color(3801), green);
        assert_eq!(battery_color(3800), amber);
        assert_eq!(battery_color(3601), amber);
        assert_eq!(battery_color(3600), Rgb565::RED);
    }

    #[test]
    fn full_battery_is_solid() {
        let display = render(PowerStatus::new(4150, 0));
        let green: Rgb565 = Rgb888::new(0, 230, 0).into();
        assert_eq!(
            display.affected_area(),
            Rectangle::new(Point::new(2, 2), Size::new(17, 7))
        );
        for x in 2..17 {
            for y in 2..9 {
                assert_eq!(display.get_pixel(Point::new(x, y)), Some(green));
            }
        }
        // nub only spans the middle rows
        assert_eq!(display.get_pixel(Point::new(17, 4)), Some(green));
        assert_eq!(display.get_pixel(Point::new(17, 2)), None);
    }

    #[test]
    fn cells_empty_as_voltage_drops() {
        let mid = render(PowerStatus::new(3900, 0));
        assert_eq!(mid.get_pixel(Point::new(14, 4)), Some(Rgb565::BLACK));
        assert_ne!(mid.get_pixel(Point::new(10, 4)), Some(Rgb565::BLACK));

        let low = render(PowerStatus::new(3500, 0));
        assert_eq!(low.get_pixel(Point::new(3, 4)), Some(Rgb565::BLACK));
        assert_eq!(low.get_pixel(Point::new(10, 4)), Some(Rgb565::BLACK));
        assert_eq!(low.get_pixel(Point::new(14, 4)), Some(Rgb565::BLACK));
        // outline survives
        assert_eq!(low.get_pixel(Point::new(2, 4)), Some(Rgb565::RED));
        assert_eq!(low.get_pixel(Point::new(16, 4)), Some(Rgb565::RED));
    }

    #[test]
    fn bolt_only_while_charging() {
        let idle = render(PowerStatus::new(4150, 3900));
        let charging = render(PowerStatus::new(4150, 5000));
        let tip = Point::new(2 + 6 + 1, 2);
        assert_ne!(idle.get_pixel(tip), Some(Rgb565::BLACK));
        assert_eq!(charging.get_pixel(tip), Some(Rgb565::BLACK));
        let shade: Rgb565 = Rgb888::new(120, 120, 120).into();
        assert_eq!(charging.get_pixel(Point::new(2 + 6 + 2, 2 + 7)), Some(shade));
    }
}
