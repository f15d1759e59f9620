//! Two-eye blink animation.
//!
//! Every frame starts black. Once per blink interval a frame is drawn with
//! both eyes: a white ring around a black disc.

use crate::domain::ports::FrameSink;
use crate::utils::error::Result;
use std::time::Duration;
use tokio::time::Instant;

pub const BACKGROUND: u32 = 0x0000_0000;
pub const OUTLINE_COLOR: u32 = 0x00FF_FFFF;
pub const EYE_COLOR: u32 = 0x0000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeLayout {
    pub width: usize,
    pub height: usize,
    pub radius: i64,
    pub offset: i64,
    pub outline: i64,
}

impl EyeLayout {
    pub fn centered(width: usize, height: usize, radius: u32, offset: u32, outline: u32) -> Self {
        Self {
            width,
            height,
            radius: i64::from(radius),
            offset: i64::from(offset),
            outline: i64::from(outline),
        }
    }

    /// 左眼、右眼的圓心
    pub fn eye_centers(&self) -> [(i64, i64); 2] {
        let cx = self.width as i64 / 2;
        let cy = self.height as i64 / 2;
        [(cx - self.offset, cy), (cx + self.offset, cy)]
    }
}

#[derive(Debug, Clone)]
pub struct BlinkClock {
    interval: Duration,
    last_blink: Instant,
}

impl BlinkClock {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_blink: now,
        }
    }

    /// 到了眨眼時間就回傳 true，並重設計時
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_blink) >= self.interval {
            self.last_blink = now;
            true
        } else {
            false
        }
    }
}

pub fn fill_circle(buffer: &mut [u32], width: usize, height: usize, center: (i64, i64), radius: i64, color: u32) {
    let (cx, cy) = center;
    let r2 = radius * radius;
    let y_start = (cy - radius).max(0);
    let y_end = (cy + radius).min(height as i64 - 1);
    let x_start = (cx - radius).max(0);
    let x_end = (cx + radius).min(width as i64 - 1);

    for y in y_start..=y_end {
        let dy = y - cy;
        for x in x_start..=x_end {
            let dx = x - cx;
            if dx * dx + dy * dy <= r2 {
                buffer[y as usize * width + x as usize] = color;
            }
        }
    }
}

pub fn render_frame(buffer: &mut [u32], layout: &EyeLayout, eyes_visible: bool) {
    buffer.fill(BACKGROUND);
    if !eyes_visible {
        return;
    }

    for center in layout.eye_centers() {
        fill_circle(
            buffer,
            layout.width,
            layout.height,
            center,
            layout.radius + layout.outline,
            OUTLINE_COLOR,
        );
        fill_circle(buffer, layout.width, layout.height, center, layout.radius, EYE_COLOR);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlinkStats {
    pub frames: u64,
    pub blinks: u64,
}

#[derive(Debug, Clone)]
pub struct BlinkSettings {
    pub interval: Duration,
    pub frame_period: Duration,
    pub radius: u32,
    pub offset: u32,
    pub outline: u32,
    pub max_frames: Option<u64>,
}

/// 執行動畫直到 sink 要求結束或達到 `max_frames`
pub async fn run_animation<S: FrameSink>(sink: &mut S, settings: &BlinkSettings) -> Result<BlinkStats> {
    let (width, height) = sink.size();
    let layout = EyeLayout::centered(width, height, settings.radius, settings.offset, settings.outline);
    let mut buffer = vec![BACKGROUND; width * height];
    let mut clock = BlinkClock::new(settings.interval, Instant::now());
    let mut stats = BlinkStats::default();

    tracing::info!(
        "👀 Blink animation {}x{} interval={:?}",
        width,
        height,
        settings.interval
    );

    loop {
        if settings.max_frames.is_some_and(|max| stats.frames >= max) {
            break;
        }

        let blink = clock.poll(Instant::now());
        render_frame(&mut buffer, &layout, blink);
        if blink {
            stats.blinks += 1;
            tracing::debug!("blink #{}", stats.blinks);
        }

        stats.frames += 1;
        if !sink.present(&buffer)? {
            tracing::info!("Viewer closed the animation");
            break;
        }

        tokio::time::sleep(settings.frame_period).await;
    }

    Ok(stats)
}
