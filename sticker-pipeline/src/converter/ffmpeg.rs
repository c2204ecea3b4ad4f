//! WebM video stickers and MP4 clips to looping GIF through ffmpeg.

use super::{run_program, Converter};
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Two-pass palette keeps transparency and avoids dithering noise.
const GIF_FILTER: &str =
    "fps=20,split[s0][s1];[s0]palettegen=reserve_transparent=1[p];[s1][p]paletteuse";

pub struct FfmpegGifConverter {
    ffmpeg_path: String,
}

impl FfmpegGifConverter {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub(crate) fn args(input: &Path, output: &Path) -> Vec<String> {
        let mut args = vec!["-hide_banner".to_string(), "-loglevel".to_string(), "error".to_string()];
        // ffmpeg's native VP9 decoder drops the alpha channel of video stickers.
        if input.extension().and_then(|e| e.to_str()) == Some("webm") {
            args.extend_from_slice(&["-c:v".to_string(), "libvpx-vp9".to_string()]);
        }
        args.extend_from_slice(&[
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vf".to_string(),
            GIF_FILTER.to_string(),
            "-loop".to_string(),
            "0".to_string(),
            "-f".to_string(),
            "gif".to_string(),
            "-y".to_string(),
            output.to_string_lossy().to_string(),
        ]);
        args
    }
}

#[async_trait]
impl Converter for FfmpegGifConverter {
    fn name(&self) -> &'static str {
        "ffmpeg-gif"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let args = Self::args(input, output);
        debug!(program = %self.ffmpeg_path, ?args, "Running ffmpeg");
        run_program(&self.ffmpeg_path, &args).await
    }
}
