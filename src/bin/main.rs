//! Digital clock watch face
//! ========================================
//! needs to be run in WSL2 terminal
//! source ~/export-esp.sh
//! ========================================
//!
//! Seven-segment clock with wrist-raise backlight on the Waveshare ESP32-S3
//! 1.43" AMOLED. Hold SELECT to enter settings, SELECT steps through the fields,
//! UP/DOWN change them, hold SELECT again to save to the RTC.
//!
//! Built for any other target, this prints one frame of the face as text art.

//% CHIPS: esp32s3
//% FEATURES: esp-hal/unstable

#![cfg_attr(target_arch = "xtensa", no_std)]
#![cfg_attr(target_arch = "xtensa", no_main)]

#[cfg(target_arch = "xtensa")]
mod firmware {
    // Define the application description, which is placed in a special section of the binary.
    // This is used by the bootloader to verify the application.
    esp_bootloader_esp_idf::esp_app_desc!();

    use core::cell::RefCell;
    use esp_backtrace as _;

    use esp_hal::{
        delay::Delay,
        i2c::master::{Config as I2cConfig, I2c},
        main, psram,
        time::Rate,
        timer::systimer::{SystemTimer, Unit},
        Blocking, Config,
    };
    use embedded_hal_bus::i2c::RefCellDevice;
    use log::{info, warn, LevelFilter};

    // Allocator for PSRAM
    extern crate alloc;
    use alloc::{boxed::Box, vec};

    use digiclk_watch::{
        app::{TickInputs, WatchApp},
        clock::{DateTime, WallClock},
        co5300::{CO5300_HEIGHT, CO5300_WIDTH},
        config::{BacklightConfig, AMBIENT_LIGHT_FALLBACK, CANVAS, IMU_POLL_MS, PANEL_OFFSET, PANEL_SCALE},
        display::{setup_display, Scaled},
        input::ButtonLevels,
        orientation::{OrientationSource, SampleQueue},
        qmi8658_imu::{Qmi8658, DEFAULT_I2C_ADDR},
        rtc_pcf85063::Pcf85063,
        wiring::{init_board_pins, BoardPins, ButtonPins, I2cPins},
    };

    // Milliseconds since boot
    fn now_ms() -> u64 {
        let t = SystemTimer::unit_value(Unit::Unit0);
        t.saturating_mul(1000) / SystemTimer::ticks_per_second()
    }

    // Used when the RTC lost power or does not answer
    fn fallback_time() -> DateTime {
        DateTime::new(2025, 1, 1, 0, 0, 0)
    }

    #[main]
    fn main() -> ! {
        esp_println::logger::init_logger(LevelFilter::Info);

        let peripherals = esp_hal::init(Config::default());
        esp_alloc::psram_allocator!(&peripherals.PSRAM, psram);

        let BoardPins {
            buttons: ButtonPins { select, up, down },
            display_pins,
            i2c: I2cPins { i2c0, sda, scl },
        } = init_board_pins(peripherals);

        // -------------------- Display --------------------
        let fb: &'static mut [u16] = Box::leak(
            vec![0u16; CO5300_WIDTH as usize * CO5300_HEIGHT as usize].into_boxed_slice(),
        );
        let mut panel = Scaled::new(setup_display(display_pins, fb), CANVAS, PANEL_SCALE, PANEL_OFFSET);

        // -------------------- IMU and RTC, one shared bus --------------------
        let i2c = I2c::new(i2c0, I2cConfig::default().with_frequency(Rate::from_khz(400)))
            .expect("I2C0 config rejected")
            .with_sda(sda)
            .with_scl(scl);
        let bus: &'static RefCell<I2c<'static, Blocking>> = Box::leak(Box::new(RefCell::new(i2c)));

        let mut rtc = Pcf85063::new(RefCellDevice::new(bus));
        let boot_time = match rtc.read_datetime() {
            Ok((dt, false)) => dt,
            Ok((_, true)) => {
                warn!("RTC lost power, starting from fallback time");
                fallback_time()
            }
            Err(e) => {
                warn!("RTC read failed: {:?}", e);
                fallback_time()
            }
        };
        info!(
            "boot time {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            boot_time.year, boot_time.month, boot_time.day, boot_time.hour, boot_time.minute, boot_time.second
        );

        let mut imu = match Qmi8658::new(RefCellDevice::new(bus), DEFAULT_I2C_ADDR) {
            Ok(dev) => Some(dev),
            Err(e) => {
                warn!("IMU init failed, backlight stays on: {:?}", e);
                None
            }
        };

        // -------------------- Main loop --------------------
        let start_ms = now_ms();
        let mut app = WatchApp::new(
            BacklightConfig::DEFAULT,
            WallClock::new(boot_time.to_unix(), start_ms),
            start_ms,
        );
        let mut samples = SampleQueue::new();
        let mut next_poll_ms: u64 = 0;
        let delay = Delay::new();

        loop {
            let now = now_ms();

            if let Some(imu) = imu.as_mut() {
                if now >= next_poll_ms {
                    imu.poll(now, &mut samples);
                    next_poll_ms = now + IMU_POLL_MS;
                }
            }

            let inputs = TickInputs {
                now_ms: now,
                buttons: ButtonLevels {
                    select: select.is_low(),
                    up: up.is_low(),
                    down: down.is_low(),
                },
                ambient_light: AMBIENT_LIGHT_FALLBACK,
                power: None,
            };

            match app.tick(&inputs, &mut samples, &mut panel) {
                Ok(report) if report.committed => {
                    if let Err(e) = rtc.set_datetime(&report.now) {
                        warn!("RTC write failed: {:?}", e);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("display error: {:?}", e),
            }

            delay.delay_millis(10);
        }
    }
}

#[cfg(not(target_arch = "xtensa"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use digiclk_watch::{
        battery::PowerStatus,
        clock::DateTime,
        framebuffer::MemoryPanel,
        mode::Mode,
        ui::{draw_face, FaceState},
    };

    let unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().min(u32::MAX as u64) as u32)
        .unwrap_or(0);

    let mut canvas = MemoryPanel::<160, 80>::new();
    let face = FaceState {
        mode: Mode::Display,
        now: DateTime::from_unix(unix),
        power: Some(PowerStatus::new(3900, 5000)),
    };
    let Ok(()) = draw_face(&mut canvas, &face);

    let mut art = String::new();
    if canvas.write_text_art(&mut art).is_ok() {
        print!("{}", art);
    }
}
