//! Animated (Lottie/TGS) stickers to GIF through the external `lottie_to_gif.sh` renderer.

use super::{run_program, Converter};
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Render settings passed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LottiePreset {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub quality: u32,
}

impl LottiePreset {
    pub const FULL: LottiePreset = LottiePreset {
        width: 512,
        height: 512,
        fps: 50,
        quality: 90,
    };

    /// Small, low-frame-rate output for slow hosts.
    pub const COMPRESSED: LottiePreset = LottiePreset {
        width: 64,
        height: 64,
        fps: 20,
        quality: 45,
    };

    pub fn select(compress: bool) -> Self {
        if compress {
            Self::COMPRESSED
        } else {
            Self::FULL
        }
    }
}

pub struct LottieConverter {
    command: String,
    preset: LottiePreset,
}

impl LottieConverter {
    pub fn new(command: impl Into<String>, preset: LottiePreset) -> Self {
        Self {
            command: command.into(),
            preset,
        }
    }

    pub fn preset(&self) -> LottiePreset {
        self.preset
    }

    pub(crate) fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        let p = self.preset;
        vec![
            "--width".to_string(),
            p.width.to_string(),
            "--height".to_string(),
            p.height.to_string(),
            "--fps".to_string(),
            p.fps.to_string(),
            "--quality".to_string(),
            p.quality.to_string(),
            "--output".to_string(),
            output.to_string_lossy().to_string(),
            input.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Converter for LottieConverter {
    fn name(&self) -> &'static str {
        "lottie-gif"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let args = self.args(input, output);
        debug!(program = %self.command, ?args, "Running lottie renderer");
        run_program(&self.command, &args).await
    }
}
