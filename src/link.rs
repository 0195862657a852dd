//! Target input classification and `t.me` link parsing
//!
//! Accepted inputs:
//! - numeric ids, including Bot-API style `-100<id>` and `-<id>`
//! - `t.me/<username>[/<topic>][/<msg>]`
//! - `t.me/c/<chat>/<msg>` and `t.me/c/<chat>/<topic>/<msg>`

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::target::{ChatRef, TargetKind};

static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:www\.)?(?:t|telegram)\.me/(?P<path>\S*)")
        .expect("valid t.me regex")
});

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid username regex"));

/// What the user typed when adding a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetInput {
    ChatId(ChatRef),
    Link(ParsedLink),
}

/// Pieces recovered from a `t.me` link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    pub chat: ChatRef,
    pub message_id: Option<i32>,
    pub topic_id: Option<i32>,
}

/// A link that must point at a concrete message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLink {
    pub chat: ChatRef,
    pub message_id: i32,
    pub topic_id: Option<i32>,
}

fn is_numeric_id(input: &str) -> bool {
    let digits = input.strip_prefix('-').unwrap_or(input);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Normalize a numeric id into a bare id and the chat kind it implies.
pub fn normalize_chat_id(raw: i64) -> ChatRef {
    if raw >= 0 {
        return ChatRef::Id {
            id: raw,
            kind: TargetKind::Unknown,
        };
    }

    let digits = raw.unsigned_abs().to_string();
    match digits.strip_prefix("100") {
        Some(rest) if !rest.is_empty() => ChatRef::Id {
            id: rest.parse().unwrap_or(0),
            kind: TargetKind::Channel,
        },
        _ => ChatRef::Id {
            id: raw.unsigned_abs() as i64,
            kind: TargetKind::Group,
        },
    }
}

fn parse_id_part<T: std::str::FromStr>(part: &str, link: &str) -> Result<T> {
    part.parse::<T>()
        .map_err(|_| Error::InvalidLink(format!("'{}' is not a number in {}", part, link)))
}

/// Parse a `t.me` link into chat, message and topic.
pub fn parse_link(input: &str) -> Result<ParsedLink> {
    let captures = LINK_RE
        .captures(input)
        .ok_or_else(|| Error::InvalidLink(input.to_string()))?;
    let path = &captures["path"];
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();

    // Web preview links: t.me/s/<username>/<msg>
    if parts.first() == Some(&"s") && parts.len() > 1 {
        parts.remove(0);
    }

    let Some(first) = parts.first().copied() else {
        return Err(Error::InvalidLink(input.to_string()));
    };

    if first == "c" {
        if parts.len() < 3 {
            return Err(Error::InvalidLink(input.to_string()));
        }
        let chat_id: i64 = parse_id_part(parts[1], input)?;
        let message_id: i32 = parse_id_part(parts[parts.len() - 1], input)?;
        let topic_id = if parts.len() == 4 {
            Some(parse_id_part::<i32>(parts[2], input)?)
        } else {
            None
        };
        return Ok(ParsedLink {
            chat: ChatRef::Id {
                id: chat_id,
                kind: TargetKind::Channel,
            },
            message_id: Some(message_id),
            topic_id,
        });
    }

    if !USERNAME_RE.is_match(first) {
        return Err(Error::InvalidLink(input.to_string()));
    }

    let message_id = if parts.len() > 1 {
        Some(parse_id_part::<i32>(parts[parts.len() - 1], input)?)
    } else {
        None
    };
    let topic_id = if parts.len() == 3 {
        Some(parse_id_part::<i32>(parts[1], input)?)
    } else {
        None
    };

    Ok(ParsedLink {
        chat: ChatRef::Username(first.to_string()),
        message_id,
        topic_id,
    })
}

/// Classify a target input as numeric id or link.
pub fn parse_input(input: &str) -> Result<TargetInput> {
    let input = input.trim();

    if is_numeric_id(input) {
        let raw: i64 = input
            .parse()
            .map_err(|_| Error::InvalidInput(input.to_string()))?;
        return Ok(TargetInput::ChatId(normalize_chat_id(raw)));
    }

    let lower = input.to_lowercase();
    if lower.contains("t.me/") || lower.contains("telegram.me/") {
        return parse_link(input).map(TargetInput::Link);
    }

    Err(Error::InvalidInput(input.to_string()))
}

/// Parse a link to an existing message (source for copy/forward).
pub fn parse_message_link(input: &str) -> Result<MessageLink> {
    let parsed = parse_link(input.trim())?;
    let message_id = parsed
        .message_id
        .ok_or_else(|| Error::InvalidLink(format!("no message id in {}", input.trim())))?;
    Ok(MessageLink {
        chat: parsed.chat,
        message_id,
        topic_id: parsed.topic_id,
    })
}
