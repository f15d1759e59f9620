use crate::domain::ports::{MediaPlayer, PlaybackHandle};
use crate::utils::error::{KioskError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Launches an external command-line player (cvlc by default) per clip.
#[derive(Debug, Clone)]
pub struct ProcessPlayer {
    binary: String,
    args: Vec<String>,
}

impl ProcessPlayer {
    pub fn new(binary: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            binary: binary.into(),
            args,
        }
    }

    fn command(&self, clip: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg(clip)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            // 任何錯誤路徑上 handle 被丟棄時都會收掉子行程
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl MediaPlayer for ProcessPlayer {
    async fn launch(&self, clip: &Path) -> Result<Box<dyn PlaybackHandle>> {
        let child = self
            .command(clip)
            .spawn()
            .map_err(|e| KioskError::PlayerError {
                message: format!("Failed to launch '{}': {}", self.binary, e),
            })?;

        tracing::debug!("spawned {} (pid {:?}) for {}", self.binary, child.id(), clip.display());

        Ok(Box::new(ProcessHandle {
            child,
            clip: clip.to_path_buf(),
        }))
    }

    fn describe(&self, clip: &Path) -> String {
        let mut line = format!("{} {}", self.binary, clip.display());
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

pub struct ProcessHandle {
    child: Child,
    clip: PathBuf,
}

#[async_trait]
impl PlaybackHandle for ProcessHandle {
    fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    async fn terminate(&mut self) -> Result<()> {
        if let Ok(Some(status)) = self.child.try_wait() {
            tracing::debug!("player for {} already exited: {}", self.clip.display(), status);
            return Ok(());
        }

        self.child.kill().await.map_err(|e| KioskError::PlayerError {
            message: format!("Failed to stop player for {}: {}", self.clip.display(), e),
        })
    }
}
