//! Minimal QMI8658 IMU bring-up and tilt estimation for wrist-raise detection.
//! The register values are conservative defaults for the Waveshare ESP32-S3
//! Touch AMOLED 1.43" board (QMI8658 on the shared I2C bus)

use embedded_hal::i2c;
use libm::{atan2f, fabsf, sqrtf};
use log::warn;

use crate::config::{ACCEL_LSB_PER_G, GYRO_LSB_PER_DPS};
use crate::orientation::{OrientationSample, OrientationSource, SampleQueue};

pub const DEFAULT_I2C_ADDR: u8 = 0x6B; // AD0 pulled high on the Waveshare board

const REG_WHO_AM_I: u8 = 0x00;
const REG_CTRL1: u8 = 0x02; // accel config
const REG_CTRL2: u8 = 0x03; // gyro config
const REG_CTRL7: u8 = 0x08; // power / enable
const REG_CTRL8: u8 = 0x09; // reset/power settings
const REG_ACC_START: u8 = 0x35; // AX_L .. GZ_H

// Expected chip ID for QMI8658. Some revisions report 0x05 or 0x0F; keep it loose.
const WHO_AM_I_FALLBACK: u8 = 0x05;
const WHO_AM_I_ALT: u8 = 0x0F;

const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImuSample {
    pub accel: [i16; 3],
    pub gyro: [i16; 3],
}

impl ImuSample {
    /// Acceleration in g.
    #[inline]
    pub fn accel_g(&self) -> [f32; 3] {
        self.accel.map(|v| v as f32 / ACCEL_LSB_PER_G)
    }

    /// Angular rate magnitude in degrees per second.
    #[inline]
    pub fn gyro_dps(&self) -> f32 {
        let [x, y, z] = self.gyro.map(|v| v as f32 / GYRO_LSB_PER_DPS);
        sqrtf(x * x + y * y + z * z)
    }

    /// Tilt angles from the gravity vector.
    ///
    /// `y` is rotation about the band axis (negative when the face tips toward the
    /// wearer), `z` is roll across it. Heading is not observable from the
    /// accelerometer alone, so `x` is always 0. The status drops as the reading
    /// strays from a clean 1 g at rest.
    pub fn orientation(&self) -> OrientationSample {
        let [ax, ay, az] = self.accel_g();
        let y = atan2f(ay, az) * RAD_TO_DEG;
        let z = atan2f(-ax, sqrtf(ay * ay + az * az)) * RAD_TO_DEG;

        let deviation = fabsf(sqrtf(ax * ax + ay * ay + az * az) - 1.0);
        let rate = self.gyro_dps();
        let status = if deviation < 0.1 && rate < 30.0 {
            3
        } else if deviation < 0.25 && rate < 120.0 {
            2
        } else if deviation < 0.5 {
            1
        } else {
            0
        };

        OrientationSample::new(0.0, y, z, status)
    }
}

// IMU error type
#[derive(Debug)]
pub enum ImuError<E> {
    Bus(E),
    BadWhoAmI(u8),
}

// Allow automatic conversion from I2C errors
impl<E> From<E> for ImuError<E> {
    fn from(e: E) -> Self {
        ImuError::Bus(e)
    }
}

// QMI8658 IMU driver
pub struct Qmi8658<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Qmi8658<I2C>
where
    I2C: i2c::ErrorType + i2c::I2c,
{
    // Create a new instance and initialize the IMU
    pub fn new(i2c: I2C, address: u8) -> Result<Self, ImuError<I2C::Error>> {
        let mut this = Self { i2c, address };
        this.init()?;
        Ok(this)
    }

    pub fn who_am_i(&mut self) -> Result<u8, ImuError<I2C::Error>> {
        self.read_reg(REG_WHO_AM_I)
    }

    fn init(&mut self) -> Result<(), ImuError<I2C::Error>> {
        let who = self.who_am_i()?;
        if who != WHO_AM_I_FALLBACK && who != WHO_AM_I_ALT {
            return Err(ImuError::BadWhoAmI(who));
        }

        // Soft reset and clear low-power.
        // Ignore errors here to avoid blocking subsequent config steps.
        let _ = self.write_reg(REG_CTRL8, 0x10);

        // Accelerometer: +/-8g, ~1 kHz ODR
        let _ = self.write_reg(REG_CTRL1, 0x60);
        // Gyro: +/-512 dps, ~1 kHz ODR
        let _ = self.write_reg(REG_CTRL2, 0x64);

        // Enable accel + gyro, set to Active
        self.write_reg(REG_CTRL7, 0x03)?;

        Ok(())
    }

    fn write_reg(&mut self, reg: u8, val: u8) -> Result<(), ImuError<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, val])
            .map_err(ImuError::Bus)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, ImuError<I2C::Error>> {
        let mut out = [0u8];
        self.i2c
            .write_read(self.address, &[reg], &mut out)
            .map_err(ImuError::Bus)?;
        Ok(out[0])
    }

    // Read a sample (accel + gyro)
    pub fn read_sample(&mut self) -> Result<ImuSample, ImuError<I2C::Error>> {
        let mut buf = [0u8; 12];
        self.i2c
            .write_read(self.address, &[REG_ACC_START], &mut buf)
            .map_err(ImuError::Bus)?;

        let accel = [
            i16::from_le_bytes([buf[0], buf[1]]),
            i16::from_le_bytes([buf[2], buf[3]]),
            i16::from_le_bytes([buf[4], buf[5]]),
        ];
        let gyro = [
            i16::from_le_bytes([buf[6], buf[7]]),
            i16::from_le_bytes([buf[8], buf[9]]),
            i16::from_le_bytes([buf[10], buf[11]]),
        ];

        Ok(ImuSample { accel, gyro })
    }

    // Consume the driver and return the underlying I2C bus
    pub fn into_inner(self) -> I2C {
        self.i2c
    }
}

impl<I2C> OrientationSource for Qmi8658<I2C>
where
    I2C: i2c::ErrorType + i2c::I2c,
{
    fn poll(&mut self, _now_ms: u64, queue: &mut SampleQueue) {
        match self.read_sample() {
            Ok(sample) => queue.push(sample.orientation()),
            Err(e) => warn!("imu read failed: {:?}", e),
        }
    }
}
