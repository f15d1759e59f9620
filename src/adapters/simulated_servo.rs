use crate::domain::ports::ServoLine;
use embedded_hal::pwm::{self, ErrorKind, ErrorType, SetDutyCycle};

/// Resolution matching the driver's 1/100 % basis, so recorded duties are exact.
const SIM_MAX_DUTY: u16 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedFault;

impl pwm::Error for SimulatedFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// In-memory PWM line used for dry runs and tests.
#[derive(Debug, Default)]
pub struct SimulatedServo {
    active: bool,
    duty_history: Vec<f32>,
    updates: usize,
    fail_after: Option<usize>,
    releases: usize,
}

impl SimulatedServo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duty updates beyond the first `n` return an error.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn duty_history(&self) -> &[f32] {
        &self.duty_history
    }

    pub fn release_count(&self) -> usize {
        self.releases
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl ErrorType for SimulatedServo {
    type Error = SimulatedFault;
}

impl SetDutyCycle for SimulatedServo {
    fn max_duty_cycle(&self) -> u16 {
        SIM_MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        if self.fail_after.is_some_and(|n| self.updates >= n) {
            return Err(SimulatedFault);
        }
        self.updates += 1;
        let percent = f32::from(duty) * 100.0 / f32::from(SIM_MAX_DUTY);
        tracing::debug!("sim servo duty {:.2}%", percent);
        self.duty_history.push(percent);
        Ok(())
    }
}

impl ServoLine for SimulatedServo {
    fn start(&mut self) -> Result<(), Self::Error> {
        self.active = true;
        self.duty_history.push(0.0);
        Ok(())
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.active = false;
        self.releases += 1;
        Ok(())
    }
}
