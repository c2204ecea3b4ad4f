//! Static WebP stickers to PNG, decoded in-process with the `image` crate.

use super::Converter;
use anyhow::{Context, Result};
use async_trait::async_trait;
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Default)]
pub struct WebpPngConverter;

impl WebpPngConverter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Converter for WebpPngConverter {
    fn name(&self) -> &'static str {
        "webp-png"
    }

    /// Decoding and encoding run on the blocking pool; the file is written from the async side, so
    /// a cancelled conversion never writes `output`.
    async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let bytes = tokio::fs::read(input)
            .await
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let img = image::load_from_memory_with_format(&bytes, ImageFormat::WebP)
                .context("Failed to decode WebP")?;
            let mut encoded = Cursor::new(Vec::new());
            img.write_to(&mut encoded, ImageFormat::Png)
                .context("Failed to encode PNG")?;
            Ok(encoded.into_inner())
        })
        .await
        .context("WebP decode task failed")??;
        tokio::fs::write(output, png)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))
    }
}
