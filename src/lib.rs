#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod backlight;
pub mod battery;
pub mod clock;
pub mod co5300;
pub mod config;
pub mod display;
pub mod framebuffer;
pub mod glyph;
pub mod input;
pub mod mode;
pub mod orientation;
pub mod qmi8658_imu;
pub mod rtc_pcf85063;
pub mod segment;
pub mod ui;

#[cfg(target_arch = "xtensa")]
pub mod wiring;
