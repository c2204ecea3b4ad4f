//! # relay-core
//!
//! Core types and traits for the sticker relay: [`Bot`], [`Handler`], [`InboundRequest`],
//! [`Attachment`] and tracing initialization. Transport-agnostic; used by relay-telegram,
//! handler-chain and sticker-pipeline.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{parse_message_id, Bot};
pub use error::{RelayError, Result};
pub use logger::init_tracing;
pub use types::{
    sanitize_key_part, Attachment, AttachmentKind, Chat, ClipPayload, FileRef, Handler,
    HandlerResponse, InboundRequest, OutboundDocument, StickerPayload, ToCoreUser,
    ToInboundRequest, User,
};
