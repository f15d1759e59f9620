//! Hobby-servo sweep test.
//!
//! The servo is driven by a 50 Hz PWM signal. Every routine brings the
//! line up at 0 % duty, moves the horn, and then stops the signal and
//! releases the pin. The release happens once per routine even when a
//! duty update fails half-way.

use crate::domain::ports::ServoLine;
use crate::utils::error::{KioskError, Result};
use std::fmt;
use std::time::Duration;

pub const SERVO_FREQUENCY_HZ: u32 = 50;
pub const MAX_ANGLE: u32 = 180;

/// Duty resolution handed to the PWM line (1/100 of a percent).
const DUTY_BASIS: u16 = 10_000;

/// 角度換算成工作週期百分比：0° = 2 %，180° = 12 %
pub fn duty_for_angle(angle: u32) -> f32 {
    angle.min(MAX_ANGLE) as f32 / 18.0 + 2.0
}

/// 掃描經過的角度，包含 0 與 180
pub fn sweep_angles(step_degrees: u32) -> Vec<u32> {
    (0..=MAX_ANGLE).step_by(step_degrees.max(1) as usize).collect()
}

#[derive(Debug, Clone)]
pub struct ServoSettings {
    pub center_duty: f32,
    pub step_degrees: u32,
    pub dwell: Duration,
    pub center_hold: Duration,
}

impl Default for ServoSettings {
    fn default() -> Self {
        Self {
            center_duty: 7.5,
            step_degrees: 10,
            dwell: Duration::from_millis(500),
            center_hold: Duration::from_secs(1),
        }
    }
}

fn hardware<E: fmt::Debug>(err: E) -> KioskError {
    KioskError::HardwareError {
        message: format!("{:?}", err),
    }
}

pub struct ServoDriver<L: ServoLine> {
    line: L,
    settings: ServoSettings,
}

impl<L: ServoLine> ServoDriver<L> {
    pub fn new(line: L, settings: ServoSettings) -> Self {
        Self { line, settings }
    }

    pub fn line(&self) -> &L {
        &self.line
    }

    pub fn into_line(self) -> L {
        self.line
    }

    pub fn set_duty_percent(&mut self, percent: f32) -> Result<()> {
        let basis = (percent.clamp(0.0, 100.0) * 100.0).round() as u16;
        self.line
            .set_duty_cycle_fraction(basis.min(DUTY_BASIS), DUTY_BASIS)
            .map_err(hardware)
    }

    /// 置中並停留 `center_hold`
    pub async fn center(&mut self) -> Result<()> {
        tracing::info!("🎯 Centering servo at {:.1}% duty", self.settings.center_duty);
        let outcome = self.center_body().await;
        self.finish(outcome)
    }

    /// 0° 到 180° 逐步掃描
    pub async fn sweep(&mut self) -> Result<()> {
        tracing::info!(
            "↔️ Sweeping servo 0..={} in {}° steps",
            MAX_ANGLE,
            self.settings.step_degrees
        );
        let outcome = self.sweep_body().await;
        self.finish(outcome)
    }

    /// center → sweep → center
    pub async fn run_test_routine(&mut self) -> Result<()> {
        self.center().await?;
        self.sweep().await?;
        self.center().await
    }

    async fn center_body(&mut self) -> Result<()> {
        self.line.start().map_err(hardware)?;
        self.set_duty_percent(self.settings.center_duty)?;
        tokio::time::sleep(self.settings.center_hold).await;
        Ok(())
    }

    async fn sweep_body(&mut self) -> Result<()> {
        self.line.start().map_err(hardware)?;
        for angle in sweep_angles(self.settings.step_degrees) {
            let duty = duty_for_angle(angle);
            tracing::debug!("angle {:>3}° -> duty {:.2}%", angle, duty);
            self.set_duty_percent(duty)?;
            tokio::time::sleep(self.settings.dwell).await;
        }
        Ok(())
    }

    fn finish(&mut self, outcome: Result<()>) -> Result<()> {
        // 不論成功與否都要釋放腳位
        let released = self.line.release().map_err(hardware);
        if let Err(e) = &outcome {
            tracing::error!("❌ Servo routine failed: {}", e);
        }
        outcome.and(released)
    }
}
