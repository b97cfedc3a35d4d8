//! Compile-time configuration for the watch face, the backlight controller and input timing.
//!
//! Everything tunable lives here so the algorithms in the other modules only ever see
//! values, never magic numbers.

use embedded_graphics::prelude::{Point, Size};

// ------------------------- Backlight controller -------------------------

/// Angular window (degrees) in which the wrist counts as raised toward the face.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewingCone {
    pub y_center: f32,
    pub y_span: f32, // +/- around y_center
    pub z_center: f32,
    pub z_span: f32, // +/- around z_center
}

impl ViewingCone {
    /// Strictly inside on both axes. Samples sitting exactly on an edge are neither
    /// inside nor outside, which keeps the current state.
    pub fn contains(&self, y: f32, z: f32) -> bool {
        z > self.z_center - self.z_span
            && z < self.z_center + self.z_span
            && y > self.y_center - self.y_span
            && y < self.y_center + self.y_span
    }

    /// Strictly outside on at least one axis.
    pub fn excludes(&self, y: f32, z: f32) -> bool {
        z < self.z_center - self.z_span
            || z > self.z_center + self.z_span
            || y < self.y_center - self.y_span
            || y > self.y_center + self.y_span
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BacklightConfig {
    pub cone: ViewingCone,
    /// Minimum sample `status` that is trusted.
    pub reliable_threshold: u8,
    /// Minimum y-angle change (degrees) between samples that wakes the screen from timeout.
    pub movement_threshold: f32,
    /// Longest continuous viewing period before the screen is forced off.
    pub view_timeout_s: u32,
}

impl BacklightConfig {
    pub const DEFAULT: Self = Self {
        cone: ViewingCone {
            y_center: -30.0,
            y_span: 20.0,
            z_center: 0.0,
            z_span: 10.0,
        },
        reliable_threshold: 2,
        movement_threshold: 2.0,
        view_timeout_s: 10,
    };

    #[inline]
    pub fn view_timeout_ms(&self) -> u64 {
        self.view_timeout_s as u64 * 1000
    }
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Ambient light above this forces full brightness.
pub const LIGHT_FULL_BRIGHTNESS: u32 = 300;
/// Light reading counts per brightness percent.
pub const LIGHT_PER_PERCENT: u32 = 4;
/// Used on boards without a light sensor, gives 75 %.
pub const AMBIENT_LIGHT_FALLBACK: u32 = 300;

// ------------------------- Buttons -------------------------

pub const DEBOUNCE_MS: u64 = 40;
/// A press held at least this long is reported as a long press on release.
pub const LONG_PRESS_MS: u64 = 1000;

// ------------------------- IMU -------------------------

pub const IMU_POLL_MS: u64 = 50;
/// +/-8 g full scale on a 16-bit register.
pub const ACCEL_LSB_PER_G: f32 = 4096.0;
/// +/-512 dps full scale on a 16-bit register.
pub const GYRO_LSB_PER_DPS: f32 = 64.0;

// ------------------------- Face layout -------------------------

/// Logical canvas the face is laid out on, (0,0) is top-left.
pub const CANVAS: Size = Size::new(160, 80);

/// Pixel pitch of one glyph grid cell.
pub const CELL: i32 = 7;
/// Grid columns of the two number pairs.
pub const LEFT_PAIR_COL: i32 = 1;
pub const RIGHT_PAIR_COL: i32 = 13;
/// Grid columns between the tens and ones glyph of a pair.
pub const DIGIT_PITCH: i32 = 5;
/// Grid column of the colon between hours and minutes.
pub const COLON_COL: i32 = 11;

pub const TEXT_ORIGIN: Point = Point::new(5, 54);
pub const BATTERY_ORIGIN: Point = Point::new(140, 72);

/// Seconds bar spans x = 5 .. 2*sec on rows 72..=80.
pub const SECONDS_BAR_X: i32 = 5;
pub const SECONDS_BAR_TOP: i32 = 72;
pub const SECONDS_BAR_BOTTOM: i32 = 80;

// ------------------------- Panel placement -------------------------

/// CO5300 AMOLED panel, square.
pub const PANEL_SIZE: u16 = 466;
/// Logical canvas is drawn with this integer magnification ...
pub const PANEL_SCALE: u32 = 2;
/// ... centred on the panel.
pub const PANEL_OFFSET: Point = Point::new(
    (PANEL_SIZE as i32 - CANVAS.width as i32 * PANEL_SCALE as i32) / 2,
    (PANEL_SIZE as i32 - CANVAS.height as i32 * PANEL_SCALE as i32) / 2,
);
