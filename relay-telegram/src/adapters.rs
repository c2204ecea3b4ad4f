//! Adapters from Telegram (teloxide) types to relay_core types.
//! Depends only on teloxide and relay_core type definitions.

use relay_core::{
    Chat, ClipPayload, InboundRequest, StickerPayload, ToCoreUser, ToInboundRequest, User,
};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`InboundRequest`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToInboundRequest for TelegramMessageWrapper<'a> {
    fn to_inbound(&self) -> InboundRequest {
        InboundRequest {
            id: self.0.id.0.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: format!("{:?}", self.0.chat.kind),
            },
            text: self.0.text().map(|s| s.to_string()),
            sticker: self.sticker_payload(),
            clip: self.clip_payload(),
            created_at: self.0.date,
        }
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    fn sticker_payload(&self) -> Option<StickerPayload> {
        self.0.sticker().map(|s| StickerPayload {
            file_id: s.file.id.0.clone(),
            file_unique_id: s.file.unique_id.0.clone(),
            set_name: s.set_name.clone(),
            is_animated: s.is_animated(),
            is_video: s.is_video(),
        })
    }

    /// Animation first; a plain document is only reported when it may hold a clip.
    fn clip_payload(&self) -> Option<ClipPayload> {
        if let Some(a) = self.0.animation() {
            return Some(ClipPayload {
                file_id: a.file.id.0.clone(),
                file_unique_id: a.file.unique_id.0.clone(),
                mime_type: a.mime_type.as_ref().map(|m| m.to_string()),
                is_animation: true,
            });
        }
        self.0.document().map(|d| ClipPayload {
            file_id: d.file.id.0.clone(),
            file_unique_id: d.file.unique_id.0.clone(),
            mime_type: d.mime_type.as_ref().map(|m| m.to_string()),
            is_animation: false,
        })
    }
}
