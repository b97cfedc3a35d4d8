// RTC driver for PCF85063A/PCF85063TP real-time clock chips.
// Datasheet: https://files.waveshare.com/wiki/common/Pcf85063atl1118-NdPQpTGE-loeW7GbZ7.pdf

use embedded_hal::i2c::I2c;

use crate::clock::DateTime;

pub const I2C_ADDR: u8 = 0x51;

const REG_SECONDS: u8 = 0x04; // sec, min, hour, day, weekday, month, year
const VL_FLAG: u8 = 0x80; // oscillator stopped, time is unreliable
const CENTURY_FLAG: u8 = 0x80;

pub struct Pcf85063<I2C> {
    i2c: I2C,
}

impl<I2C, E> Pcf85063<I2C>
where
    I2C: I2c<Error = E>,
{
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn into_inner(self) -> I2C {
        self.i2c
    }

    // Read datetime. Returns (dt, vl_flag) where vl_flag == true means time is unreliable (power loss).
    // The weekday register is ignored and recomputed from the date.
    pub fn read_datetime(&mut self) -> Result<(DateTime, bool), E> {
        let mut buf = [0u8; 7];
        self.i2c.write_read(I2C_ADDR, &[REG_SECONDS], &mut buf)?;
        let vl = (buf[0] & VL_FLAG) != 0;
        let second = bcd_decode(buf[0] & 0x7F);
        let minute = bcd_decode(buf[1] & 0x7F);
        let hour = bcd_decode(buf[2] & 0x3F);
        let day = bcd_decode(buf[3] & 0x3F);
        let month_raw = buf[5];
        let month = bcd_decode(month_raw & 0x1F);
        let year = if (month_raw & CENTURY_FLAG) != 0 {
            1900u16 + bcd_decode(buf[6]) as u16
        } else {
            2000u16 + bcd_decode(buf[6]) as u16
        };

        let raw = DateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            weekday: 0,
        };
        // Garbage registers would otherwise normalise into some arbitrary date.
        if !datetime_is_valid(&raw) {
            return Ok((raw, true));
        }
        Ok((DateTime::new(year, month, day, hour, minute, second), vl))
    }

    // Set datetime. Writing the seconds register also clears the VL flag.
    pub fn set_datetime(&mut self, dt: &DateTime) -> Result<(), E> {
        let yr = (dt.year % 100) as u8;
        let data = [
            REG_SECONDS,
            bcd_encode(dt.second),
            bcd_encode(dt.minute),
            bcd_encode(dt.hour),
            bcd_encode(dt.day),
            (dt.weekday + 1) % 7, // chip counts from Sunday
            bcd_encode(dt.month),
            bcd_encode(yr),
        ];
        self.i2c.write(I2C_ADDR, &data)?;
        Ok(())
    }
}

fn bcd_decode(v: u8) -> u8 {
    (v & 0x0F) + ((v >> 4) * 10)
}

fn bcd_encode(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}

// Basic sanity check on decoded RTC time.
pub fn datetime_is_valid(dt: &DateTime) -> bool {
    (2020..=2099).contains(&dt.year)
        && (1..=12).contains(&dt.month)
        && (1..=31).contains(&dt.day)
        && dt.hour < 24
        && dt.minute < 60
        && dt.second < 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qmi8658_imu::tests::FakeRegs;

    #[test]
    fn bcd_helpers() {
        assert_eq!(bcd_encode(59), 0x59);
        assert_eq!(bcd_decode(0x59), 59);
        assert_eq!(bcd_decode(bcd_encode(7)), 7);
    }

    #[test]
    fn read_decodes_registers() {
        let mut regs = FakeRegs::new(I2C_ADDR);
        // 2025-05-05 08:09:10, weekday register deliberately wrong
        regs.regs[0x04..0x0B].copy_from_slice(&[0x10, 0x09, 0x08, 0x05, 0x06, 0x05, 0x25]);
        let mut rtc = Pcf85063::new(regs);
        let (dt, vl) = rtc.read_datetime().unwrap();
        assert!(!vl);
        assert_eq!(dt, DateTime::new(2025, 5, 5, 8, 9, 10));
        assert_eq!(dt.weekday, 0);
    }

    #[test]
    fn vl_flag_marks_time_unreliable() {
        let mut regs = FakeRegs::new(I2C_ADDR);
        regs.regs[0x04..0x0B].copy_from_slice(&[0x80 | 0x30, 0x00, 0x12, 0x01, 0x00, 0x01, 0x24]);
        let mut rtc = Pcf85063::new(regs);
        let (dt, vl) = rtc.read_datetime().unwrap();
        assert!(vl);
        assert_eq!((dt.year, dt.hour, dt.second), (2024, 12, 30));
    }

    #[test]
    fn garbage_registers_are_unreliable() {
        // all-zero registers decode to month 0
        let mut rtc = Pcf85063::new(FakeRegs::new(I2C_ADDR));
        let (_, vl) = rtc.read_datetime().unwrap();
        assert!(vl);
    }

    #[test]
    fn set_writes_bcd_and_weekday() {
        let mut rtc = Pcf85063::new(FakeRegs::new(I2C_ADDR));
        // Sunday
        let dt = DateTime::new(2025, 5, 11, 23, 45, 6);
        rtc.set_datetime(&dt).unwrap();
        let regs = rtc.into_inner();
        assert_eq!(
            &regs.regs[0x04..0x0B],
            &[0x06, 0x45, 0x23, 0x11, 0x00, 0x05, 0x25]
        );

        let mut rtc = Pcf85063::new(regs);
        assert_eq!(rtc.read_datetime().unwrap(), (dt, false));
    }
}
