use async_trait::async_trait;
use pixie::domain::model::{AssetLibrary, ClipStep, Emotion};
use pixie::domain::ports::{MediaPlayer, PlaybackHandle};
use pixie::{ClipShow, KioskError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// 記錄每次啟動與停止的假播放器
#[derive(Clone, Default)]
struct RecordingPlayer {
    log: Arc<Mutex<Vec<String>>>,
    exits_early: bool,
}

impl RecordingPlayer {
    fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

struct RecordingHandle {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    running: bool,
}

#[async_trait]
impl PlaybackHandle for RecordingHandle {
    fn is_running(&mut self) -> bool {
        self.running
    }

    async fn terminate(&mut self) -> pixie::Result<()> {
        self.log.lock().unwrap().push(format!("stop {}", self.name));
        self.running = false;
        Ok(())
    }
}

#[async_trait]
impl MediaPlayer for RecordingPlayer {
    async fn launch(&self, clip: &Path) -> pixie::Result<Box<dyn PlaybackHandle>> {
        let name = clip.file_name().unwrap().to_string_lossy().to_string();
        self.log.lock().unwrap().push(format!("play {}", name));
        Ok(Box::new(RecordingHandle {
            name,
            log: self.log.clone(),
            running: !self.exits_early,
        }))
    }

    fn describe(&self, clip: &Path) -> String {
        format!("fake {}", clip.display())
    }
}

fn library_with(emotions: &[Emotion]) -> (TempDir, AssetLibrary) {
    let dir = TempDir::new().unwrap();
    for emotion in emotions {
        std::fs::write(dir.path().join(emotion.clip_file()), b"clip").unwrap();
    }
    let library = AssetLibrary::new(dir.path());
    (dir, library)
}

fn default_steps() -> Vec<ClipStep> {
    vec![
        ClipStep {
            emotion: Emotion::Sad,
            hold_ms: 2000,
        },
        ClipStep {
            emotion: Emotion::Love,
            hold_ms: 2000,
        },
    ]
}

#[tokio::test(start_paused = true)]
async fn test_plays_each_clip_then_terminates_it() {
    let (_dir, library) = library_with(&[Emotion::Sad, Emotion::Love]);
    let player = RecordingPlayer::default();
    let show = ClipShow::new(player.clone(), library, default_steps(), Duration::from_millis(10));

    let started = tokio::time::Instant::now();
    let report = show.run().await.unwrap();

    assert_eq!(
        player.entries(),
        vec!["play sad.mp4", "stop sad.mp4", "play love.mp4", "stop love.mp4"]
    );
    assert_eq!(report.played, vec![Emotion::Sad, Emotion::Love]);
    assert_eq!(report.early_exits, 0);
    assert!(!report.interrupted);
    // 2 × 2 s 的停留加上兩次 10 ms 間隔
    assert!(started.elapsed() >= Duration::from_millis(4020));
}

#[tokio::test(start_paused = true)]
async fn test_repeat_runs_the_sequence_again() {
    let (_dir, library) = library_with(&[Emotion::Sad, Emotion::Love]);
    let player = RecordingPlayer::default();
    let show = ClipShow::new(player.clone(), library, default_steps(), Duration::ZERO).with_repeat(2);

    let report = show.run().await.unwrap();
    assert_eq!(report.played.len(), 4);
    assert_eq!(player.entries().len(), 8);
}

#[tokio::test]
async fn test_missing_clips_fail_before_any_launch() {
    let (_dir, library) = library_with(&[Emotion::Sad]);
    let player = RecordingPlayer::default();
    let show = ClipShow::new(player.clone(), library, default_steps(), Duration::ZERO);

    let err = show.run().await.unwrap_err();
    assert!(matches!(err, KioskError::PlayerError { .. }));
    assert!(err.to_string().contains("love.mp4"));
    assert!(player.entries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_early_exit_is_counted_and_show_continues() {
    let (_dir, library) = library_with(&[Emotion::Sad, Emotion::Love]);
    let player = RecordingPlayer {
        exits_early: true,
        ..RecordingPlayer::default()
    };
    let show = ClipShow::new(player.clone(), library, default_steps(), Duration::ZERO);

    let report = show.run().await.unwrap();
    assert_eq!(report.early_exits, 2);
    assert_eq!(report.played.len(), 2);
}

/// shutdown 觸發時停止目前的影片並結束
#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_current_clip() {
    let (_dir, library) = library_with(&[Emotion::Sad, Emotion::Love]);
    let player = RecordingPlayer::default();
    let show = ClipShow::new(player.clone(), library, default_steps(), Duration::ZERO);

    let report = show
        .run_until(tokio::time::sleep(Duration::from_millis(500)))
        .await
        .unwrap();

    assert!(report.interrupted);
    assert_eq!(report.played, vec![Emotion::Sad]);
    assert_eq!(player.entries(), vec!["play sad.mp4", "stop sad.mp4"]);
}

#[test]
fn test_describe_lists_planned_commands() {
    let (_dir, library) = library_with(&[]);
    let show = ClipShow::new(
        RecordingPlayer::default(),
        library,
        default_steps(),
        Duration::ZERO,
    );

    let lines = show.describe();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("fake "));
    assert!(lines[0].ends_with("sad.mp4  # hold 2000 ms"));
}
