//! Board-specific pin mappings and initialization for the
//! Waveshare ESP32-S3 Touch AMOLED 1.43" watch board.
//!
//! The following wiring is assumed:
//! - SELECT button => GPIO7
//! - UP button     => GPIO15
//! - DOWN button   => GPIO16
//! - CO5300 CS => GPIO9, SCK => GPIO10, IO0/MOSI => GPIO11, RST => GPIO21
//! - Panel power enable => GPIO42
//! - Shared I2C (QMI8658 IMU @ 0x6B, PCF85063 RTC @ 0x51): SDA => GPIO47, SCL => GPIO48
//! Buttons short to GND when pressed (internal pull-ups enabled).

use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::peripherals::{Peripherals, DMA_CH0, GPIO10, GPIO11, GPIO47, GPIO48, I2C0, SPI2};

pub struct ButtonPins<'a> {
    pub select: Input<'a>,
    pub up: Input<'a>,
    pub down: Input<'a>,
}

pub struct DisplayPins<'a> {
    pub spi2: SPI2<'a>,
    pub cs: Output<'a>,
    pub clk: GPIO10<'a>,
    pub do0: GPIO11<'a>,
    pub rst: Output<'a>,
    pub en: Output<'a>,
    pub dma_ch0: DMA_CH0<'a>,
}

pub struct I2cPins<'a> {
    pub i2c0: I2C0<'a>,
    pub sda: GPIO47<'a>,
    pub scl: GPIO48<'a>,
}

pub struct BoardPins<'a> {
    pub buttons: ButtonPins<'a>,
    pub display_pins: DisplayPins<'a>,
    pub i2c: I2cPins<'a>,
}

pub fn init_board_pins<'a>(p: Peripherals) -> BoardPins<'a> {
    let pull_up = InputConfig::default().with_pull(Pull::Up);
    let buttons = ButtonPins {
        select: Input::new(p.GPIO7, pull_up),
        up: Input::new(p.GPIO15, pull_up),
        down: Input::new(p.GPIO16, pull_up),
    };

    // Display control pins; do NOT touch GPIO10/11 here (SPI SCK/MOSI)
    let display_pins = DisplayPins {
        spi2: p.SPI2,
        cs: Output::new(p.GPIO9, Level::High, OutputConfig::default()),
        clk: p.GPIO10,
        do0: p.GPIO11,
        rst: Output::new(p.GPIO21, Level::High, OutputConfig::default()),
        en: Output::new(p.GPIO42, Level::Low, OutputConfig::default()),
        dma_ch0: p.DMA_CH0,
    };

    let i2c = I2cPins {
        i2c0: p.I2C0,
        sda: p.GPIO47,
        scl: p.GPIO48,
    };

    BoardPins {
        buttons,
        display_pins,
        i2c,
    }
}
