use crate::core::blink::OUTLINE_COLOR;
use crate::domain::ports::FrameSink;
use crate::utils::error::Result;

/// Frame sink without a display; counts what would have been shown.
#[derive(Debug)]
pub struct HeadlessSink {
    width: usize,
    height: usize,
    frames: u64,
    frames_with_eyes: u64,
}

impl HeadlessSink {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            frames: 0,
            frames_with_eyes: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn frames_with_eyes(&self) -> u64 {
        self.frames_with_eyes
    }
}

impl FrameSink for HeadlessSink {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn present(&mut self, buffer: &[u32]) -> Result<bool> {
        self.frames += 1;
        if buffer.iter().any(|&p| p == OUTLINE_COLOR) {
            self.frames_with_eyes += 1;
        }
        Ok(true)
    }
}

#[cfg(feature = "window")]
pub use window::WindowSink;

#[cfg(feature = "window")]
mod window {
    use crate::domain::ports::FrameSink;
    use crate::utils::error::{KioskError, Result};
    use minifb::{Key, Window, WindowOptions};

    /// Borderless, always-on-top software framebuffer window.
    pub struct WindowSink {
        window: Window,
        width: usize,
        height: usize,
    }

    impl WindowSink {
        pub fn open(title: &str, width: usize, height: usize) -> Result<Self> {
            let mut window = Window::new(
                title,
                width,
                height,
                WindowOptions {
                    borderless: true,
                    title: false,
                    resize: false,
                    topmost: true,
                    ..WindowOptions::default()
                },
            )
            .map_err(|e| KioskError::DisplayError {
                message: e.to_string(),
            })?;

            window.limit_update_rate(Some(std::time::Duration::from_millis(16)));

            Ok(Self {
                window,
                width,
                height,
            })
        }
    }

    impl FrameSink for WindowSink {
        fn size(&self) -> (usize, usize) {
            (self.width, self.height)
        }

        fn present(&mut self, buffer: &[u32]) -> Result<bool> {
            if !self.window.is_open() || self.window.is_key_down(Key::Escape) {
                return Ok(false);
            }
            self.window
                .update_with_buffer(buffer, self.width, self.height)
                .map_err(|e| KioskError::DisplayError {
                    message: e.to_string(),
                })?;
            Ok(true)
        }
    }
}
