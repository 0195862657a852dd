//! Turn a numeric id or `t.me` link into a stored [`Target`]

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::link::{parse_input, ParsedLink, TargetInput};
use crate::messenger::{ChatInfo, MessageInfo, Messenger};
use crate::target::{ChatRef, Target};

const TOPIC_TITLE_CHARS: usize = 30;

/// Resolve user input into a target, validating access through the client.
pub async fn resolve_target<M: Messenger>(messenger: &M, input: &str) -> Result<Target> {
    match parse_input(input)? {
        TargetInput::ChatId(chat) => resolve_chat_id(messenger, &chat).await,
        TargetInput::Link(link) => resolve_link(messenger, &link).await,
    }
}

async fn find_chat<M: Messenger>(messenger: &M, chat: &ChatRef) -> Result<ChatInfo> {
    messenger
        .find_chat(chat)
        .await?
        .ok_or_else(|| Error::ChatNotFound(chat.to_string()))
}

async fn resolve_chat_id<M: Messenger>(messenger: &M, chat: &ChatRef) -> Result<Target> {
    let info = find_chat(messenger, chat).await?;
    Ok(Target::new(info.id, info.title, info.kind))
}

async fn resolve_link<M: Messenger>(messenger: &M, link: &ParsedLink) -> Result<Target> {
    debug!(chat = %link.chat, "Verifying access");
    let info = find_chat(messenger, &link.chat).await?;

    let mut topic_id = None;
    if let Some(message_id) = link.message_id {
        if let Some(message) = messenger.message_info(&info, message_id).await? {
            topic_id = topic_from_message(&message, info.is_forum);
        } else {
            debug!(message_id, "Linked message not found");
        }
    }

    // The URL is a stronger signal than the reply header.
    if link.topic_id.is_some() {
        topic_id = link.topic_id;
    }

    let mut target = Target::new(info.id, info.title.clone(), info.kind);
    if let Some(topic_id) = topic_id {
        target.topic_title = Some(topic_title(messenger, &info, topic_id).await);
        target.topic_id = Some(topic_id);
    }
    Ok(target)
}

/// Detect the forum topic a message was posted in.
pub fn topic_from_message(message: &MessageInfo, chat_is_forum: bool) -> Option<i32> {
    let reply = message.reply.as_ref()?;
    if reply.forum_topic {
        reply.reply_to_top_id.or(reply.reply_to_msg_id)
    } else if chat_is_forum {
        reply.reply_to_msg_id
    } else {
        None
    }
}

/// Title for a topic, read from its start message.
async fn topic_title<M: Messenger>(messenger: &M, chat: &ChatInfo, topic_id: i32) -> String {
    let fallback = || format!("Topic {}", topic_id);

    match messenger.message_info(chat, topic_id).await {
        Ok(Some(start)) => {
            if let Some(title) = start.topic_created_title {
                title
            } else if !start.text.is_empty() {
                start.text.chars().take(TOPIC_TITLE_CHARS).collect()
            } else {
                fallback()
            }
        }
        Ok(None) => fallback(),
        Err(e) => {
            warn!(topic_id, error = %e, "Failed to fetch topic start message");
            fallback()
        }
    }
}
