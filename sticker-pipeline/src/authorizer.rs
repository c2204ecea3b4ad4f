//! Allow-list gate for the costly vector-animation conversions.

use relay_core::{Attachment, AttachmentKind};
use std::collections::HashSet;
use tracing::{info, warn};

/// Read-only set of requester ids allowed to convert animated stickers. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    allowed_users: HashSet<i64>,
}

impl Authorizer {
    pub fn new(allowed_users: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed_users: allowed_users.into_iter().collect(),
        }
    }

    /// AnimatedSticker requires membership; every other kind is always permitted.
    pub fn permits(&self, requester_id: i64, attachment: &Attachment) -> bool {
        if attachment.kind() != AttachmentKind::AnimatedSticker {
            return true;
        }
        let allowed = self.allowed_users.contains(&requester_id);
        if allowed {
            info!(user_id = requester_id, "User authorized for animated sticker");
        } else {
            warn!(user_id = requester_id, "Animated sticker conversion denied");
        }
        allowed
    }

    pub fn len(&self) -> usize {
        self.allowed_users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed_users.is_empty()
    }
}
