//! Send destinations stored in templates

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of chat a target points at.
///
/// Older files carry free-form labels ("User/Chat", "Group/Channel"); those
/// load as `Unknown` and are looked up across every chat kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetKind {
    User,
    Group,
    Channel,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TargetKind {
    pub fn label(&self) -> &'static str {
        match self {
            TargetKind::User => "User",
            TargetKind::Group => "Group",
            TargetKind::Channel => "Channel",
            TargetKind::Unknown => "Unknown",
        }
    }

    /// Whether a chat of kind `other` can satisfy a lookup for `self`.
    pub fn accepts(&self, other: TargetKind) -> bool {
        *self == TargetKind::Unknown || *self == other
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How to find a chat through the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRef {
    /// Bare (unprefixed) id plus the kind implied by the input.
    Id { id: i64, kind: TargetKind },
    /// Public username without `@`.
    Username(String),
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRef::Id { id, kind: TargetKind::Channel } => write!(f, "-100{}", id),
            ChatRef::Id { id, kind: TargetKind::Group } => write!(f, "-{}", id),
            ChatRef::Id { id, .. } => write!(f, "{}", id),
            ChatRef::Username(name) => write!(f, "@{}", name),
        }
    }
}

/// A resolved send destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub chat_id: i64,
    pub chat_title: String,
    #[serde(default)]
    pub topic_id: Option<i32>,
    #[serde(default)]
    pub topic_title: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: TargetKind,
}

impl Target {
    pub fn new(chat_id: i64, chat_title: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            chat_id,
            chat_title: chat_title.into(),
            topic_id: None,
            topic_title: None,
            kind,
        }
    }

    /// Two targets are the same destination when chat and topic match.
    pub fn same_destination(&self, other: &Target) -> bool {
        self.chat_id == other.chat_id && self.topic_id == other.topic_id
    }

    pub fn chat_ref(&self) -> ChatRef {
        ChatRef::Id {
            id: self.chat_id,
            kind: self.kind,
        }
    }

    /// `Title (Topic: name)` as printed in send outcomes.
    pub fn describe(&self) -> String {
        match &self.topic_title {
            Some(topic) => format!("{} (Topic: {})", self.chat_title, topic),
            None => self.chat_title.clone(),
        }
    }

    /// `Title > topic` as printed when a target is added.
    pub fn short_label(&self) -> String {
        match &self.topic_title {
            Some(topic) => format!("{} > {}", self.chat_title, topic),
            None => self.chat_title.clone(),
        }
    }
}
