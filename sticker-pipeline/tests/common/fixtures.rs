//! Builders shared by the pipeline tests: requests, a recording converter, and a wired orchestrator.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use relay_core::{Chat, ClipPayload, InboundRequest, StickerPayload, User};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sticker_pipeline::{
    Authorizer, Converter, ConverterRouter, PipelineOrchestrator, ResourceFetcher, Timeouts,
    TransientStore,
};

use super::mock_bot::MockBot;

pub const CHAT_ID: i64 = 500;

pub fn user(id: i64) -> User {
    User {
        id,
        username: Some(format!("user{}", id)),
        first_name: None,
        last_name: None,
    }
}

pub fn text_request(message_id: &str, user_id: i64, text: &str) -> InboundRequest {
    InboundRequest::text(
        message_id,
        user(user_id),
        Chat {
            id: CHAT_ID,
            chat_type: "private".to_string(),
        },
        text,
    )
}

pub fn sticker_request(
    message_id: &str,
    user_id: i64,
    set_name: &str,
    unique_id: &str,
    animated: bool,
    video: bool,
) -> InboundRequest {
    text_request(message_id, user_id, "").with_sticker(StickerPayload {
        file_id: format!("file-{}", unique_id),
        file_unique_id: unique_id.to_string(),
        set_name: Some(set_name.to_string()),
        is_animated: animated,
        is_video: video,
    })
}

pub fn clip_request(message_id: &str, user_id: i64, unique_id: &str) -> InboundRequest {
    text_request(message_id, user_id, "").with_clip(ClipPayload {
        file_id: format!("clip-{}", unique_id),
        file_unique_id: unique_id.to_string(),
        mime_type: Some("video/mp4".to_string()),
        is_animation: true,
    })
}

/// Converter that writes fixed bytes and records the paths it was given.
pub struct RecordingConverter {
    output: &'static [u8],
    delay: Duration,
    fail: bool,
    pub seen: Mutex<Vec<(PathBuf, PathBuf)>>,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl RecordingConverter {
    pub fn new(output: &'static [u8]) -> Self {
        Self {
            output,
            delay: Duration::ZERO,
            fail: false,
            seen: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing() -> Self {
        let mut c = Self::new(b"");
        c.fail = true;
        c
    }

    pub fn seen(&self) -> Vec<(PathBuf, PathBuf)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Converter for RecordingConverter {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));
        assert!(input.exists(), "converter input must exist: {}", input.display());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = if self.fail {
            Err(anyhow!("renderer crashed"))
        } else {
            tokio::fs::write(output, self.output).await.map_err(Into::into)
        };
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Wires an orchestrator where every kind is converted by `converter`.
pub fn orchestrator(
    bot: Arc<MockBot>,
    work_dir: &Path,
    allowed: &[i64],
    converter: Arc<RecordingConverter>,
) -> PipelineOrchestrator {
    orchestrator_with_step(bot, work_dir, allowed, converter, Duration::from_secs(5))
}

/// Like [`orchestrator`], with a custom bound on each chat call and transfer. The HTTP client
/// keeps a long timeout so the step bound is the one that fires.
pub fn orchestrator_with_step(
    bot: Arc<MockBot>,
    work_dir: &Path,
    allowed: &[i64],
    converter: Arc<RecordingConverter>,
    step: Duration,
) -> PipelineOrchestrator {
    let store = Arc::new(TransientStore::new(work_dir));
    let fetcher = Arc::new(ResourceFetcher::new(Duration::from_secs(5), None).unwrap());
    let router = Arc::new(ConverterRouter::new(
        store.clone(),
        converter.clone(),
        converter.clone(),
        converter,
        Duration::from_secs(5),
    ));
    PipelineOrchestrator::new(
        bot,
        Arc::new(Authorizer::new(allowed.iter().copied())),
        store,
        fetcher,
        router,
        Timeouts { step },
    )
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}
