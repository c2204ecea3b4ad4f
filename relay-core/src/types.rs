//! Core types: user, chat, inbound request and its media payloads, attachments, outbound document, and Handler trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User identity (id, username, names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Chat (channel or private) identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}

/// Sticker object as delivered by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickerPayload {
    pub file_id: String,
    pub file_unique_id: String,
    /// Sticker set name; stickers sent outside a set have none.
    pub set_name: Option<String>,
    pub is_animated: bool,
    pub is_video: bool,
}

/// Non-sticker animation or document carrying a clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipPayload {
    pub file_id: String,
    pub file_unique_id: String,
    pub mime_type: Option<String>,
    /// True when the transport reported it as an animation (GIF/MP4) rather than a plain document.
    pub is_animation: bool,
}

/// A single inbound message: who sent it, where, and which media it carries. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundRequest {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub text: Option<String>,
    pub sticker: Option<StickerPayload>,
    pub clip: Option<ClipPayload>,
    pub created_at: DateTime<Utc>,
}

impl InboundRequest {
    /// Text-only request; handy for commands and tests.
    pub fn text(id: impl Into<String>, user: User, chat: Chat, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user,
            chat,
            text: Some(text.into()),
            sticker: None,
            clip: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_sticker(mut self, sticker: StickerPayload) -> Self {
        self.sticker = Some(sticker);
        self
    }

    pub fn with_clip(mut self, clip: ClipPayload) -> Self {
        self.clip = Some(clip);
        self
    }
}

/// Discriminant of [`Attachment`], used for dispatch, logs and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentKind {
    StaticSticker,
    AnimatedSticker,
    VideoSticker,
    AnimationClip,
}

impl AttachmentKind {
    pub const ALL: [AttachmentKind; 4] = [
        AttachmentKind::StaticSticker,
        AttachmentKind::AnimatedSticker,
        AttachmentKind::VideoSticker,
        AttachmentKind::AnimationClip,
    ];

    /// Extension of the downloaded source file.
    pub fn source_extension(&self) -> &'static str {
        match self {
            AttachmentKind::StaticSticker => "webp",
            AttachmentKind::AnimatedSticker => "tgs",
            AttachmentKind::VideoSticker => "webm",
            AttachmentKind::AnimationClip => "mp4",
        }
    }

    /// Extension of the converted file in the working directory.
    pub fn output_extension(&self) -> &'static str {
        match self {
            AttachmentKind::StaticSticker => "png",
            _ => "gif",
        }
    }

    /// Extension of the delivered document. GIF results are sent as `.gif.1` so clients
    /// keep them as files instead of re-encoding them as native animations.
    pub fn delivery_extension(&self) -> &'static str {
        match self {
            AttachmentKind::StaticSticker => "png",
            _ => "gif.1",
        }
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            AttachmentKind::StaticSticker => Some("image/png"),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::StaticSticker => "static_sticker",
            AttachmentKind::AnimatedSticker => "animated_sticker",
            AttachmentKind::VideoSticker => "video_sticker",
            AttachmentKind::AnimationClip => "animation_clip",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttachmentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "static_sticker" | "static" | "webp" => Ok(AttachmentKind::StaticSticker),
            "animated_sticker" | "animated" | "tgs" => Ok(AttachmentKind::AnimatedSticker),
            "video_sticker" | "video" | "webm" => Ok(AttachmentKind::VideoSticker),
            "animation_clip" | "animation" | "mp4" => Ok(AttachmentKind::AnimationClip),
            other => Err(format!("unknown attachment kind: {}", other)),
        }
    }
}

/// Remote file reference plus the identity used to name transient files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub file_id: String,
    pub group_key: String,
    pub unique_id: String,
}

impl FileRef {
    pub fn new(
        file_id: impl Into<String>,
        group_key: impl AsRef<str>,
        unique_id: impl AsRef<str>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            group_key: sanitize_key_part(group_key.as_ref()),
            unique_id: sanitize_key_part(unique_id.as_ref()),
        }
    }

    /// `{group_key}_{unique_id}`; a single safe path component.
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.group_key, self.unique_id)
    }
}

/// Keeps `[A-Za-z0-9_-]`, replaces everything else with `-`.
pub fn sanitize_key_part(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

/// Typed attachment descriptor produced by classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attachment {
    StaticSticker(FileRef),
    AnimatedSticker(FileRef),
    VideoSticker(FileRef),
    AnimationClip(FileRef),
}

impl Attachment {
    pub fn new(kind: AttachmentKind, file: FileRef) -> Self {
        match kind {
            AttachmentKind::StaticSticker => Attachment::StaticSticker(file),
            AttachmentKind::AnimatedSticker => Attachment::AnimatedSticker(file),
            AttachmentKind::VideoSticker => Attachment::VideoSticker(file),
            AttachmentKind::AnimationClip => Attachment::AnimationClip(file),
        }
    }

    pub fn kind(&self) -> AttachmentKind {
        match self {
            Attachment::StaticSticker(_) => AttachmentKind::StaticSticker,
            Attachment::AnimatedSticker(_) => AttachmentKind::AnimatedSticker,
            Attachment::VideoSticker(_) => AttachmentKind::VideoSticker,
            Attachment::AnimationClip(_) => AttachmentKind::AnimationClip,
        }
    }

    pub fn file(&self) -> &FileRef {
        match self {
            Attachment::StaticSticker(f)
            | Attachment::AnimatedSticker(f)
            | Attachment::VideoSticker(f)
            | Attachment::AnimationClip(f) => f,
        }
    }

    pub fn storage_key(&self) -> String {
        self.file().storage_key()
    }

    /// Name of the delivered document; a pure function of attachment identity.
    pub fn output_filename(&self) -> String {
        format!("{}.{}", self.storage_key(), self.kind().delivery_extension())
    }
}

/// A local file to be sent as a document.
#[derive(Debug, Clone)]
pub struct OutboundDocument {
    pub path: std::path::PathBuf,
    pub file_name: String,
    pub content_type: Option<String>,
    /// Message id to reply to, if any.
    pub reply_to: Option<String>,
}

/// Handler result for the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; the message has been handled.
    Stop,
    /// Skip this handler, try next.
    Ignore,
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific message type to core [`InboundRequest`].
pub trait ToInboundRequest: Send + Sync {
    fn to_inbound(&self) -> InboundRequest;
}

/// Single handler concept: optional before / handle / after. Chain runs all before → handle until Stop → all after (reverse).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs before the handle phase. Return false to stop the chain.
    async fn before(&self, _request: &InboundRequest) -> crate::error::Result<bool> {
        Ok(true)
    }
    /// Processes the request. Return Stop to end the handle phase. Default: Continue.
    async fn handle(&self, _request: &InboundRequest) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
    /// Runs after the handle phase (reverse order), with the final response.
    async fn after(
        &self,
        _request: &InboundRequest,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_filename_static_sticker() {
        let a = Attachment::StaticSticker(FileRef::new("f1", "pack1", "abc"));
        assert_eq!(a.output_filename(), "pack1_abc.png");
        assert_eq!(a.kind().content_type(), Some("image/png"));
    }

    #[test]
    fn test_output_filename_gif_kinds() {
        for kind in [
            AttachmentKind::AnimatedSticker,
            AttachmentKind::VideoSticker,
            AttachmentKind::AnimationClip,
        ] {
            let a = Attachment::new(kind, FileRef::new("f", "pack2", "xyz"));
            assert_eq!(a.output_filename(), "pack2_xyz.gif.1");
            assert_eq!(kind.content_type(), None);
        }
    }

    #[test]
    fn test_sanitize_key_part() {
        assert_eq!(sanitize_key_part("Pack_1-a"), "Pack_1-a");
        assert_eq!(sanitize_key_part("../etc"), "---etc");
        assert_eq!(sanitize_key_part("a b/c"), "a-b-c");
        assert_eq!(sanitize_key_part(""), "unknown");
    }

    #[test]
    fn test_attachment_kind_names_round_trip() {
        for kind in AttachmentKind::ALL {
            assert_eq!(kind.as_str().parse::<AttachmentKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_attachment_kind_from_str() {
        assert_eq!("tgs".parse::<AttachmentKind>().unwrap(), AttachmentKind::AnimatedSticker);
        assert_eq!("static".parse::<AttachmentKind>().unwrap(), AttachmentKind::StaticSticker);
        assert!("png".parse::<AttachmentKind>().is_err());
    }
}
