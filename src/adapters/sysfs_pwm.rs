use crate::domain::ports::ServoLine;
use embedded_hal::pwm::{self, ErrorKind, ErrorType, SetDutyCycle};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SYSFS_PWM_ROOT: &str = "/sys/class/pwm";

#[derive(Debug)]
pub struct SysfsPwmError(pub io::Error);

impl pwm::Error for SysfsPwmError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl From<io::Error> for SysfsPwmError {
    fn from(err: io::Error) -> Self {
        Self(err)
    }
}

/// Linux kernel PWM channel (`/sys/class/pwm/pwmchipN/pwmM`).
#[derive(Debug)]
pub struct SysfsPwm {
    chip_dir: PathBuf,
    channel: u32,
    period_ns: u64,
    exported_here: bool,
}

impl SysfsPwm {
    pub fn new(chip: u32, channel: u32, frequency_hz: u32) -> Self {
        Self::with_root(SYSFS_PWM_ROOT, chip, channel, frequency_hz)
    }

    pub fn with_root(root: impl AsRef<Path>, chip: u32, channel: u32, frequency_hz: u32) -> Self {
        Self {
            chip_dir: root.as_ref().join(format!("pwmchip{}", chip)),
            channel,
            period_ns: 1_000_000_000 / u64::from(frequency_hz.max(1)),
            exported_here: false,
        }
    }

    pub fn period_ns(&self) -> u64 {
        self.period_ns
    }

    fn channel_dir(&self) -> PathBuf {
        self.chip_dir.join(format!("pwm{}", self.channel))
    }

    fn write_attr(&self, name: &str, value: impl ToString) -> io::Result<()> {
        let path = self.channel_dir().join(name);
        tracing::trace!("write {} <- {}", path.display(), value.to_string());
        fs::write(path, value.to_string())
    }
}

impl ErrorType for SysfsPwm {
    type Error = SysfsPwmError;
}

impl SetDutyCycle for SysfsPwm {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty_ns = self.period_ns * u64::from(duty) / u64::from(u16::MAX);
        self.write_attr("duty_cycle", duty_ns)?;
        Ok(())
    }
}

impl ServoLine for SysfsPwm {
    fn start(&mut self) -> Result<(), Self::Error> {
        if !self.channel_dir().exists() {
            fs::write(self.chip_dir.join("export"), self.channel.to_string())?;
            self.exported_here = true;
        }
        // duty 必須 <= period，所以先歸零
        self.write_attr("duty_cycle", 0)?;
        self.write_attr("period", self.period_ns)?;
        self.write_attr("enable", 1)?;
        Ok(())
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.write_attr("duty_cycle", 0)?;
        self.write_attr("enable", 0)?;
        if self.exported_here {
            fs::write(self.chip_dir.join("unexport"), self.channel.to_string())?;
            self.exported_here = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(dir: &Path, name: &str) -> String {
        fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn test_start_and_release_write_attributes() {
        let root = TempDir::new().unwrap();
        let channel_dir = root.path().join("pwmchip0").join("pwm0");
        fs::create_dir_all(&channel_dir).unwrap();

        let mut pwm = SysfsPwm::with_root(root.path(), 0, 0, 50);
        assert_eq!(pwm.period_ns(), 20_000_000);

        pwm.start().unwrap();
        assert_eq!(read(&channel_dir, "period"), "20000000");
        assert_eq!(read(&channel_dir, "enable"), "1");

        pwm.set_duty_cycle_fraction(750, 10_000).unwrap();
        let duty_ns: u64 = read(&channel_dir, "duty_cycle").parse().unwrap();
        // 7.5 % of 20 ms, within rounding of the 16-bit scale
        assert!((1_499_000..=1_500_000).contains(&duty_ns));

        pwm.release().unwrap();
        assert_eq!(read(&channel_dir, "enable"), "0");
        assert_eq!(read(&channel_dir, "duty_cycle"), "0");
        // 沒有自己 export，就不應該 unexport
        assert!(!root.path().join("pwmchip0").join("unexport").exists());
    }

    #[test]
    fn test_missing_chip_is_an_error() {
        let root = TempDir::new().unwrap();
        let mut pwm = SysfsPwm::with_root(root.path(), 3, 1, 50);
        assert!(pwm.start().is_err());
    }
}
