//! Maps an inbound request to a typed [`Attachment`], or `None` when it carries nothing convertible.

use relay_core::{Attachment, AttachmentKind, FileRef, InboundRequest};

/// Group key for stickers sent outside any set.
pub const NO_SET_GROUP_KEY: &str = "noset";
/// Group key for animations and clip documents.
pub const CLIP_GROUP_KEY: &str = "animation";

/// Classification order: animated sticker → video sticker → static sticker → clip → None.
pub fn classify(request: &InboundRequest) -> Option<Attachment> {
    if let Some(sticker) = &request.sticker {
        if sticker.file_id.is_empty() || sticker.file_unique_id.is_empty() {
            return None;
        }
        let kind = if sticker.is_animated {
            AttachmentKind::AnimatedSticker
        } else if sticker.is_video {
            AttachmentKind::VideoSticker
        } else {
            AttachmentKind::StaticSticker
        };
        let group = sticker
            .set_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_SET_GROUP_KEY);
        let file = FileRef::new(sticker.file_id.clone(), group, &sticker.file_unique_id);
        return Some(Attachment::new(kind, file));
    }

    let clip = request.clip.as_ref()?;
    if clip.file_id.is_empty() || clip.file_unique_id.is_empty() {
        return None;
    }
    if !clip.is_animation && !is_clip_mime(clip.mime_type.as_deref()) {
        return None;
    }
    Some(Attachment::AnimationClip(FileRef::new(
        clip.file_id.clone(),
        CLIP_GROUP_KEY,
        &clip.file_unique_id,
    )))
}

fn is_clip_mime(mime: Option<&str>) -> bool {
    match mime {
        Some(m) => m.starts_with("video/") || m == "image/gif",
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{Chat, ClipPayload, StickerPayload, User};

    fn request() -> InboundRequest {
        InboundRequest::text(
            "1",
            User {
                id: 1,
                username: None,
                first_name: None,
                last_name: None,
            },
            Chat {
                id: 2,
                chat_type: "private".to_string(),
            },
            "",
        )
    }

    fn sticker(animated: bool, video: bool) -> StickerPayload {
        StickerPayload {
            file_id: "fid".to_string(),
            file_unique_id: "uid".to_string(),
            set_name: Some("pack".to_string()),
            is_animated: animated,
            is_video: video,
        }
    }

    fn clip(is_animation: bool, mime: Option<&str>) -> ClipPayload {
        ClipPayload {
            file_id: "cid".to_string(),
            file_unique_id: "cu".to_string(),
            mime_type: mime.map(|s| s.to_string()),
            is_animation,
        }
    }

    #[test]
    fn test_sticker_flags_pick_variant() {
        let cases = [
            (true, false, AttachmentKind::AnimatedSticker),
            (false, true, AttachmentKind::VideoSticker),
            (false, false, AttachmentKind::StaticSticker),
            // The animated flag wins when both are set.
            (true, true, AttachmentKind::AnimatedSticker),
        ];
        for (animated, video, expected) in cases {
            let a = classify(&request().with_sticker(sticker(animated, video))).unwrap();
            assert_eq!(a.kind(), expected);
            assert_eq!(a.storage_key(), "pack_uid");
            assert_eq!(a.file().file_id, "fid");
        }
    }

    #[test]
    fn test_sticker_without_set_uses_placeholder_group() {
        let mut s = sticker(false, false);
        s.set_name = None;
        let a = classify(&request().with_sticker(s)).unwrap();
        assert_eq!(a.storage_key(), "noset_uid");
    }

    #[test]
    fn test_sticker_takes_precedence_over_clip() {
        let req = request()
            .with_sticker(sticker(false, true))
            .with_clip(clip(true, Some("video/mp4")));
        assert_eq!(classify(&req).unwrap().kind(), AttachmentKind::VideoSticker);
    }

    #[test]
    fn test_clip_classification() {
        let a = classify(&request().with_clip(clip(true, None))).unwrap();
        assert_eq!(a, Attachment::AnimationClip(FileRef::new("cid", "animation", "cu")));

        assert!(classify(&request().with_clip(clip(false, Some("video/mp4")))).is_some());
        assert!(classify(&request().with_clip(clip(false, Some("image/gif")))).is_some());
        assert!(classify(&request().with_clip(clip(false, Some("application/pdf")))).is_none());
        assert!(classify(&request().with_clip(clip(false, None))).is_none());
    }

    #[test]
    fn test_no_attachment_or_malformed() {
        assert!(classify(&request()).is_none());

        let mut s = sticker(false, false);
        s.file_unique_id.clear();
        assert!(classify(&request().with_sticker(s)).is_none());
    }
}
