//! Client seam used by target resolution and broadcasting
//!
//! `chat::GrammersMessenger` is the production implementation; tests drive the
//! resolver and the send loop through in-memory fakes.

use crate::error::Result;
use crate::link::MessageLink;
use crate::target::{ChatRef, Target, TargetKind};

/// A chat as seen through the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInfo {
    /// Bare id, without Bot-API prefixes.
    pub id: i64,
    /// Display title: chat title, user full name, username or "Unknown".
    pub title: String,
    pub kind: TargetKind,
    pub is_forum: bool,
}

/// Reply header fields relevant to forum topics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyHeader {
    pub forum_topic: bool,
    pub reply_to_msg_id: Option<i32>,
    pub reply_to_top_id: Option<i32>,
}

/// The parts of a message the resolver looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageInfo {
    pub id: i32,
    pub text: String,
    pub reply: Option<ReplyHeader>,
    /// Title carried by a "topic created" service message.
    pub topic_created_title: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait Messenger {
    /// A fetched message that can be copied or forwarded.
    type Message;

    async fn find_chat(&self, chat: &ChatRef) -> Result<Option<ChatInfo>>;

    async fn message_info(&self, chat: &ChatInfo, message_id: i32) -> Result<Option<MessageInfo>>;

    async fn fetch_message(&self, link: &MessageLink) -> Result<Option<Self::Message>>;

    /// Send text, replying into `target.topic_id` when set.
    async fn send_text(&self, target: &Target, text: &str) -> Result<()>;

    /// Re-send an existing message (text, entities and media) as a new one.
    async fn send_copy(&self, target: &Target, message: &Self::Message) -> Result<()>;

    /// Forward an existing message, keeping the original author header.
    async fn forward(&self, target: &Target, message: &Self::Message) -> Result<()>;
}
