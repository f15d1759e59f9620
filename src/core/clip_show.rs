use crate::domain::model::{AssetLibrary, ClipStep, Emotion};
use crate::domain::ports::MediaPlayer;
use crate::utils::error::{KioskError, Result};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowReport {
    pub played: Vec<Emotion>,
    pub early_exits: usize,
    pub interrupted: bool,
}

/// Plays a fixed sequence of expression clips through an external player:
/// launch, hold, terminate, short gap, next clip.
pub struct ClipShow<P: MediaPlayer> {
    player: P,
    library: AssetLibrary,
    steps: Vec<ClipStep>,
    gap: Duration,
    repeat: u32,
}

impl<P: MediaPlayer> ClipShow<P> {
    pub fn new(player: P, library: AssetLibrary, steps: Vec<ClipStep>, gap: Duration) -> Self {
        Self {
            player,
            library,
            steps,
            gap,
            repeat: 1,
        }
    }

    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat.max(1);
        self
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn planned_clips(&self) -> Vec<PathBuf> {
        self.steps
            .iter()
            .map(|step| self.library.clip_path(step.emotion))
            .collect()
    }

    /// 一次列出所有缺少的影片
    pub fn check_assets(&self) -> Result<()> {
        let missing: Vec<String> = self
            .planned_clips()
            .into_iter()
            .filter(|path| !path.is_file())
            .map(|path| path.display().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(KioskError::PlayerError {
                message: format!("Missing clip files: {}", missing.join(", ")),
            })
        }
    }

    /// 列出會執行的指令，不啟動播放器
    pub fn describe(&self) -> Vec<String> {
        self.steps
            .iter()
            .map(|step| {
                format!(
                    "{}  # hold {} ms",
                    self.player.describe(&self.library.clip_path(step.emotion)),
                    step.hold_ms
                )
            })
            .collect()
    }

    pub async fn run(&self) -> Result<ShowReport> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// 播放到結束，或 `shutdown` 完成時停止目前的影片
    pub async fn run_until<F>(&self, shutdown: F) -> Result<ShowReport>
    where
        F: Future<Output = ()>,
    {
        self.check_assets()?;
        tokio::pin!(shutdown);

        let mut report = ShowReport::default();

        for round in 1..=self.repeat {
            tracing::debug!("clip show round {}/{}", round, self.repeat);

            for step in &self.steps {
                let clip = self.library.clip_path(step.emotion);
                tracing::info!("🎬 Playing {} for {} ms", step.emotion, step.hold_ms);

                let mut handle = self.player.launch(&clip).await?;

                let interrupted = tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(step.hold_ms)) => false,
                    _ = &mut shutdown => true,
                };

                if !handle.is_running() {
                    tracing::warn!("⚠️ Player for {} exited before its hold ended", step.emotion);
                    report.early_exits += 1;
                }

                handle.terminate().await?;
                report.played.push(step.emotion);

                if interrupted {
                    tracing::info!("🛑 Clip show interrupted");
                    report.interrupted = true;
                    return Ok(report);
                }

                if !self.gap.is_zero() {
                    tokio::time::sleep(self.gap).await;
                }
            }
        }

        tracing::info!("✅ Clip show finished ({} clips)", report.played.len());
        Ok(report)
    }
}
