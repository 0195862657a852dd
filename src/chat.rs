//! Chat lookup and message delivery over a grammers client

use std::sync::{Arc, Mutex};

use grammers_client::types::peer::Peer;
use grammers_client::types::Message;
use grammers_client::{Client, InputMessage};
use grammers_session::defs::{ChannelKind, PeerAuth, PeerId, PeerInfo, PeerRef};
use grammers_session::Session;
use grammers_tl_types as tl;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{Error, Result};
use crate::link::MessageLink;
use crate::messenger::{ChatInfo, MessageInfo, Messenger, ReplyHeader};
use crate::target::{ChatRef, Target, TargetKind};

/// Bare id of a peer, without Bot-API prefixes.
pub fn peer_id(peer: &Peer) -> i64 {
    match peer {
        Peer::User(u) => u.raw.id(),
        Peer::Channel(c) => c.raw.id,
        Peer::Group(g) => match &g.raw {
            tl::enums::Chat::Empty(c) => c.id,
            tl::enums::Chat::Chat(c) => c.id,
            tl::enums::Chat::Forbidden(c) => c.id,
            tl::enums::Chat::Channel(c) => c.id,
            tl::enums::Chat::ChannelForbidden(c) => c.id,
        },
    }
}

/// Id namespace of a peer. Supergroups share the channel namespace.
pub fn peer_kind(peer: &Peer) -> TargetKind {
    match peer {
        Peer::User(_) => TargetKind::User,
        Peer::Channel(_) => TargetKind::Channel,
        Peer::Group(g) => match &g.raw {
            tl::enums::Chat::Channel(_) | tl::enums::Chat::ChannelForbidden(_) => {
                TargetKind::Channel
            }
            _ => TargetKind::Group,
        },
    }
}

pub fn is_forum(peer: &Peer) -> bool {
    match peer {
        Peer::Channel(c) => c.raw.forum,
        Peer::Group(g) => matches!(&g.raw, tl::enums::Chat::Channel(c) if c.forum),
        Peer::User(_) => false,
    }
}

fn peer_username(peer: &Peer) -> Option<String> {
    match peer {
        Peer::User(u) => u.username().map(str::to_string),
        Peer::Channel(c) => c.raw.username.clone(),
        Peer::Group(g) => match &g.raw {
            tl::enums::Chat::Channel(c) => c.username.clone(),
            _ => None,
        },
    }
}

/// Full name for users, title for chats, then username, then "Unknown".
pub fn peer_title(peer: &Peer) -> String {
    let name = match peer {
        Peer::User(user) => Some(user.full_name()),
        _ => peer.name().map(str::to_string),
    };
    name.map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| peer_username(peer))
        .unwrap_or_else(|| "Unknown".to_string())
}

fn channel_info(channel: &tl::types::Channel) -> Option<PeerInfo> {
    if channel.min {
        return None;
    }
    let kind = if channel.gigagroup {
        ChannelKind::Gigagroup
    } else if channel.broadcast {
        ChannelKind::Broadcast
    } else {
        ChannelKind::Megagroup
    };
    Some(PeerInfo::Channel {
        id: channel.id,
        auth: channel.access_hash.map(PeerAuth::from_hash),
        kind: Some(kind),
    })
}

/// Session cache entry for a peer. `min` peers carry no usable access hash.
pub fn peer_info(peer: &Peer) -> Option<PeerInfo> {
    match peer {
        Peer::User(user) => match &user.raw {
            tl::enums::User::User(u) if !u.min => Some(PeerInfo::User {
                id: u.id,
                auth: u.access_hash.map(PeerAuth::from_hash),
                bot: Some(u.bot),
                is_self: Some(u.is_self),
            }),
            _ => None,
        },
        Peer::Channel(c) => channel_info(&c.raw),
        Peer::Group(g) => match &g.raw {
            tl::enums::Chat::Chat(c) => Some(PeerInfo::Chat { id: c.id }),
            tl::enums::Chat::Forbidden(c) => Some(PeerInfo::Chat { id: c.id }),
            tl::enums::Chat::Channel(c) => channel_info(c),
            tl::enums::Chat::ChannelForbidden(c) => Some(PeerInfo::Channel {
                id: c.id,
                auth: Some(PeerAuth::from_hash(c.access_hash)),
                kind: None,
            }),
            tl::enums::Chat::Empty(_) => None,
        },
    }
}

/// Session peer ids a stored chat id may refer to, skipping ids outside each namespace.
pub fn cached_peer_ids(id: i64, kind: TargetKind) -> Vec<PeerId> {
    let mut ids = Vec::new();
    if kind.accepts(TargetKind::User) && (1..=0xff_ffff_ffff).contains(&id) {
        ids.push(PeerId::user(id));
    }
    if kind.accepts(TargetKind::Channel)
        && ((1..=997_852_516_352).contains(&id)
            || (1_002_147_483_649..=3_000_000_000_000).contains(&id))
    {
        ids.push(PeerId::channel(id));
    }
    if kind.accepts(TargetKind::Group) && (1..=999_999_999_999).contains(&id) {
        ids.push(PeerId::chat(id));
    }
    ids
}

fn chat_info(peer: &Peer) -> ChatInfo {
    ChatInfo {
        id: peer_id(peer),
        title: peer_title(peer),
        kind: peer_kind(peer),
        is_forum: is_forum(peer),
    }
}

/// Extract the resolver-relevant parts of a raw message.
pub fn message_info(raw: &tl::enums::Message) -> MessageInfo {
    match raw {
        tl::enums::Message::Message(m) => MessageInfo {
            id: m.id,
            text: m.message.clone(),
            reply: m.reply_to.as_ref().and_then(reply_header),
            topic_created_title: None,
        },
        tl::enums::Message::Service(s) => MessageInfo {
            id: s.id,
            text: String::new(),
            reply: s.reply_to.as_ref().and_then(reply_header),
            topic_created_title: match &s.action {
                tl::enums::MessageAction::TopicCreate(action) => Some(action.title.clone()),
                _ => None,
            },
        },
        tl::enums::Message::Empty(e) => MessageInfo {
            id: e.id,
            ..Default::default()
        },
    }
}

fn reply_header(header: &tl::enums::MessageReplyHeader) -> Option<ReplyHeader> {
    match header {
        tl::enums::MessageReplyHeader::Header(h) => Some(ReplyHeader {
            forum_topic: h.forum_topic,
            reply_to_msg_id: h.reply_to_msg_id,
            reply_to_top_id: h.reply_to_top_id,
        }),
        _ => None,
    }
}

/// Forward request that can land inside a forum topic.
pub fn forward_request(
    destination: &Peer,
    source: &Peer,
    message_id: i32,
    topic_id: Option<i32>,
) -> tl::functions::messages::ForwardMessages {
    tl::functions::messages::ForwardMessages {
        silent: false,
        background: false,
        with_my_score: false,
        drop_author: false,
        drop_media_captions: false,
        from_peer: PeerRef::from(source).into(),
        id: vec![message_id],
        random_id: vec![rand::random::<i64>()],
        to_peer: PeerRef::from(destination).into(),
        top_msg_id: topic_id,
        reply_to: None,
        schedule_date: None,
        send_as: None,
        noforwards: false,
        quick_reply_shortcut: None,
        allow_paid_floodskip: false,
        video_timestamp: None,
        allow_paid_stars: None,
        suggested_post: None,
    }
}

/// A message fetched for copying or forwarding, with the chat it came from.
pub struct SourceMessage {
    pub peer: Peer,
    pub message: Message,
}

/// [`Messenger`] backed by a logged-in grammers client.
///
/// Numeric ids are looked up among peers resolved in this run, then in the
/// session's peer cache, then in the account's dialogs (fetched once per
/// messenger). Peers resolved by username are written to the session cache so
/// later runs can reach chats the account has no dialog with.
pub struct GrammersMessenger<'a> {
    client: &'a Client,
    peer_cache: Option<Arc<dyn Session>>,
    dialogs: OnceCell<Vec<Peer>>,
    resolved: Mutex<Vec<Peer>>,
}

impl<'a> GrammersMessenger<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            peer_cache: None,
            dialogs: OnceCell::new(),
            resolved: Mutex::new(Vec::new()),
        }
    }

    pub fn with_peer_cache(mut self, cache: Arc<dyn Session>) -> Self {
        self.peer_cache = Some(cache);
        self
    }

    async fn dialogs(&self) -> Result<&[Peer]> {
        let peers = self
            .dialogs
            .get_or_try_init(|| async {
                let mut peers = Vec::new();
                let mut dialogs = self.client.iter_dialogs();
                while let Some(dialog) = dialogs.next().await? {
                    peers.push(dialog.peer.clone());
                }
                debug!(count = peers.len(), "Loaded dialogs");
                Ok::<_, Error>(peers)
            })
            .await?;
        Ok(peers.as_slice())
    }

    fn remember(&self, peer: &Peer) {
        if let (Some(cache), Some(info)) = (&self.peer_cache, peer_info(peer)) {
            cache.cache_peer(&info);
        }
        if let Ok(mut resolved) = self.resolved.lock() {
            resolved.push(peer.clone());
        }
    }

    async fn find_cached(&self, id: i64, kind: TargetKind) -> Option<Peer> {
        let cache = self.peer_cache.as_ref()?;
        for cached_id in cached_peer_ids(id, kind) {
            let Some(info) = cache.peer(cached_id) else {
                continue;
            };
            match self.client.resolve_peer(PeerRef::from(info)).await {
                Ok(peer) => return Some(peer),
                Err(e) => debug!(%cached_id, error = %e, "Cached peer could not be fetched"),
            }
        }
        None
    }

    fn find_resolved(&self, id: i64, kind: TargetKind) -> Option<Peer> {
        let resolved = self.resolved.lock().ok()?;
        resolved
            .iter()
            .find(|p| peer_id(p) == id && kind.accepts(peer_kind(p)))
            .cloned()
    }

    async fn peer(&self, chat: &ChatRef) -> Result<Option<Peer>> {
        match chat {
            ChatRef::Username(username) => {
                let peer = self.client.resolve_username(username).await?;
                if let Some(ref peer) = peer {
                    self.remember(peer);
                }
                Ok(peer)
            }
            ChatRef::Id { id, kind } => {
                if let Some(peer) = self.find_resolved(*id, *kind) {
                    return Ok(Some(peer));
                }
                if let Some(peer) = self.find_cached(*id, *kind).await {
                    if let Ok(mut resolved) = self.resolved.lock() {
                        resolved.push(peer.clone());
                    }
                    return Ok(Some(peer));
                }
                Ok(self
                    .dialogs()
                    .await?
                    .iter()
                    .find(|p| peer_id(p) == *id && kind.accepts(peer_kind(p)))
                    .cloned())
            }
        }
    }

    async fn target_peer(&self, target: &Target) -> Result<Peer> {
        self.peer(&target.chat_ref())
            .await?
            .ok_or_else(|| Error::ChatNotFound(target.chat_ref().to_string()))
    }

    async fn fetch(&self, peer: &Peer, message_id: i32) -> Result<Option<Message>> {
        let mut messages = self.client.get_messages_by_id(peer, &[message_id]).await?;
        Ok(messages.pop().flatten())
    }
}

impl Messenger for GrammersMessenger<'_> {
    type Message = SourceMessage;

    async fn find_chat(&self, chat: &ChatRef) -> Result<Option<ChatInfo>> {
        Ok(self.peer(chat).await?.as_ref().map(chat_info))
    }

    async fn message_info(&self, chat: &ChatInfo, message_id: i32) -> Result<Option<MessageInfo>> {
        let chat_ref = ChatRef::Id {
            id: chat.id,
            kind: chat.kind,
        };
        let peer = self
            .peer(&chat_ref)
            .await?
            .ok_or_else(|| Error::ChatNotFound(chat_ref.to_string()))?;
        Ok(self
            .fetch(&peer, message_id)
            .await?
            .map(|message| message_info(&message.raw)))
    }

    async fn fetch_message(&self, link: &MessageLink) -> Result<Option<SourceMessage>> {
        let Some(peer) = self.peer(&link.chat).await? else {
            return Ok(None);
        };
        let message = self.fetch(&peer, link.message_id).await?;
        Ok(message.map(|message| SourceMessage { peer, message }))
    }

    async fn send_text(&self, target: &Target, text: &str) -> Result<()> {
        let peer = self.target_peer(target).await?;
        self.client
            .send_message(&peer, InputMessage::from(text).reply_to(target.topic_id))
            .await?;
        Ok(())
    }

    async fn send_copy(&self, target: &Target, source: &SourceMessage) -> Result<()> {
        let peer = self.target_peer(target).await?;
        let original = &source.message;

        let mut input = InputMessage::from(original.text()).reply_to(target.topic_id);
        if let Some(entities) = original.fmt_entities() {
            input = input.fmt_entities(entities.clone());
        }
        if let Some(media) = original.media() {
            input = input.copy_media(&media);
        }

        self.client.send_message(&peer, input).await?;
        Ok(())
    }

    async fn forward(&self, target: &Target, source: &SourceMessage) -> Result<()> {
        let peer = self.target_peer(target).await?;
        let request = forward_request(&peer, &source.peer, source.message.id(), target.topic_id);
        self.client.invoke(&request).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use grammers_client::types::peer::User;
    use grammers_session::storages::SqliteSession;

    fn raw_user(id: i64, first: Option<&str>, last: Option<&str>, username: Option<&str>) -> tl::types::User {
        tl::types::User {
            is_self: false,
            contact: false,
            mutual_contact: false,
            deleted: false,
            bot: false,
            bot_chat_history: false,
            bot_nochats: false,
            verified: false,
            restricted: false,
            min: false,
            bot_inline_geo: false,
            support: false,
            scam: false,
            apply_min_photo: false,
            fake: false,
            bot_attach_menu: false,
            premium: false,
            attach_menu_enabled: false,
            bot_can_edit: false,
            close_friend: false,
            stories_hidden: false,
            stories_unavailable: false,
            contact_require_premium: false,
            bot_business: false,
            bot_has_main_app: false,
            bot_forum_view: false,
            id,
            access_hash: Some(777),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            username: username.map(str::to_string),
            phone: None,
            photo: None,
            status: None,
            bot_info_version: None,
            restriction_reason: None,
            bot_inline_placeholder: None,
            lang_code: None,
            emoji_status: None,
            usernames: None,
            stories_max_id: None,
            color: None,
            profile_color: None,
            bot_active_users: None,
            bot_verification_icon: None,
            send_paid_messages_stars: None,
        }
    }

    fn user(first: Option<&str>, last: Option<&str>, username: Option<&str>) -> Peer {
        Peer::User(User::from_raw(raw_user(42, first, last, username).into()))
    }

    fn raw_channel(id: i64, title: &str, broadcast: bool, forum: bool) -> tl::types::Channel {
        tl::types::Channel {
            creator: false,
            left: false,
            broadcast,
            verified: false,
            megagroup: !broadcast,
            restricted: false,
            signatures: false,
            min: false,
            scam: false,
            has_link: false,
            has_geo: false,
            slowmode_enabled: false,
            call_active: false,
            call_not_empty: false,
            fake: false,
            gigagroup: false,
            noforwards: false,
            join_to_send: false,
            join_request: false,
            forum,
            stories_hidden: false,
            stories_hidden_min: false,
            stories_unavailable: false,
            signature_profiles: false,
            autotranslation: false,
            broadcast_messages_allowed: false,
            monoforum: false,
            forum_tabs: false,
            id,
            access_hash: Some(555),
            title: title.to_string(),
            username: None,
            photo: tl::enums::ChatPhoto::Empty,
            date: 0,
            restriction_reason: None,
            admin_rights: None,
            banned_rights: None,
            default_banned_rights: None,
            participants_count: None,
            usernames: None,
            stories_max_id: None,
            color: None,
            profile_color: None,
            emoji_status: None,
            level: None,
            subscription_until_date: None,
            bot_verification_icon: None,
            send_paid_messages_stars: None,
            linked_monoforum_id: None,
        }
    }

    fn channel(id: i64, title: &str, broadcast: bool, forum: bool) -> Peer {
        Peer::from_raw(raw_channel(id, title, broadcast, forum).into())
    }

    fn basic_group(id: i64, title: &str) -> Peer {
        Peer::from_raw(
            tl::types::Chat {
                creator: false,
                left: false,
                deactivated: false,
                call_active: false,
                call_not_empty: false,
                noforwards: false,
                id,
                title: title.to_string(),
                photo: tl::enums::ChatPhoto::Empty,
                participants_count: 3,
                date: 0,
                version: 1,
                migrated_to: None,
                admin_rights: None,
                default_banned_rights: None,
            }
            .into(),
        )
    }

    fn reply(forum_topic: bool, msg_id: Option<i32>, top_id: Option<i32>) -> tl::enums::MessageReplyHeader {
        tl::types::MessageReplyHeader {
            reply_to_scheduled: false,
            forum_topic,
            quote: false,
            reply_to_msg_id: msg_id,
            reply_to_peer_id: None,
            reply_from: None,
            reply_media: None,
            reply_to_top_id: top_id,
            quote_text: None,
            quote_entities: None,
            quote_offset: None,
            todo_item_id: None,
        }
        .into()
    }

    fn text_message(id: i32, text: &str, reply_to: Option<tl::enums::MessageReplyHeader>) -> tl::enums::Message {
        tl::types::Message {
            out: false,
            mentioned: false,
            media_unread: false,
            silent: false,
            post: false,
            from_scheduled: false,
            legacy: false,
            edit_hide: false,
            pinned: false,
            noforwards: false,
            invert_media: false,
            offline: false,
            video_processing_pending: false,
            paid_suggested_post_stars: false,
            paid_suggested_post_ton: false,
            id,
            from_id: None,
            from_boosts_applied: None,
            peer_id: tl::types::PeerChannel { channel_id: 1 }.into(),
            saved_peer_id: None,
            fwd_from: None,
            via_bot_id: None,
            via_business_bot_id: None,
            reply_to,
            date: 0,
            message: text.to_string(),
            media: None,
            reply_markup: None,
            entities: None,
            views: None,
            forwards: None,
            replies: None,
            edit_date: None,
            post_author: None,
            grouped_id: None,
            reactions: None,
            restriction_reason: None,
            ttl_period: None,
            quick_reply_shortcut_id: None,
            effect: None,
            factcheck: None,
            report_delivery_until_date: None,
            paid_message_stars: None,
            suggested_post: None,
        }
        .into()
    }

    fn topic_created(id: i32, title: &str) -> tl::enums::Message {
        tl::types::MessageService {
            out: false,
            mentioned: false,
            media_unread: false,
            reactions_are_possible: false,
            silent: false,
            post: false,
            legacy: false,
            id,
            from_id: None,
            peer_id: tl::types::PeerChannel { channel_id: 1 }.into(),
            saved_peer_id: None,
            reply_to: None,
            date: 0,
            action: tl::types::MessageActionTopicCreate {
                title_missing: false,
                title: title.to_string(),
                icon_color: 0,
                icon_emoji_id: None,
            }
            .into(),
            reactions: None,
            ttl_period: None,
        }
        .into()
    }

    #[test]
    fn user_title_is_first_and_last_name() {
        assert_eq!(peer_title(&user(Some("Alice"), Some("Smith"), None)), "Alice Smith");
        assert_eq!(peer_title(&user(Some("Alice"), None, None)), "Alice");
        assert_eq!(peer_title(&user(Some(" Bob "), Some(""), None)), "Bob");
    }

    #[test]
    fn nameless_user_falls_back_to_username_then_unknown() {
        assert_eq!(peer_title(&user(None, None, Some("ghost"))), "ghost");
        assert_eq!(peer_title(&user(Some("  "), None, None)), "Unknown");
    }

    #[test]
    fn user_chat_info() {
        let info = chat_info(&user(Some("Alice"), Some("Smith"), None));
        assert_eq!(
            info,
            ChatInfo {
                id: 42,
                title: "Alice Smith".into(),
                kind: TargetKind::User,
                is_forum: false,
            }
        );
    }

    #[test]
    fn broadcast_channel_is_channel_kind() {
        let peer = channel(900, "News", true, false);
        assert!(matches!(peer, Peer::Channel(_)));
        assert_eq!(peer_id(&peer), 900);
        assert_eq!(peer_kind(&peer), TargetKind::Channel);
        assert!(!is_forum(&peer));
        assert_eq!(peer_title(&peer), "News");
    }

    #[test]
    fn forum_supergroup_uses_channel_namespace() {
        let peer = channel(901, "Dev Forum", false, true);
        assert!(matches!(peer, Peer::Group(_)));
        assert_eq!(peer_id(&peer), 901);
        assert_eq!(peer_kind(&peer), TargetKind::Channel);
        assert!(is_forum(&peer));
    }

    #[test]
    fn basic_group_kind() {
        let peer = basic_group(77, "Family");
        assert_eq!(peer_id(&peer), 77);
        assert_eq!(peer_kind(&peer), TargetKind::Group);
        assert!(!is_forum(&peer));
        assert_eq!(peer_title(&peer), "Family");
    }

    #[test]
    fn message_info_reads_topic_reply_header() {
        let raw = text_message(120, "hello", Some(reply(true, Some(7), Some(5))));
        let info = message_info(&raw);
        assert_eq!(info.id, 120);
        assert_eq!(info.text, "hello");
        assert_eq!(
            info.reply,
            Some(ReplyHeader {
                forum_topic: true,
                reply_to_msg_id: Some(7),
                reply_to_top_id: Some(5),
            })
        );
        assert_eq!(info.topic_created_title, None);
    }

    #[test]
    fn message_info_without_reply() {
        let info = message_info(&text_message(3, "plain", None));
        assert_eq!(info.reply, None);
    }

    #[test]
    fn service_message_carries_topic_title() {
        let info = message_info(&topic_created(5, "Releases"));
        assert_eq!(info.id, 5);
        assert!(info.text.is_empty());
        assert_eq!(info.topic_created_title.as_deref(), Some("Releases"));
    }

    #[test]
    fn empty_message_keeps_only_id() {
        let raw: tl::enums::Message = tl::types::MessageEmpty { id: 9, peer_id: None }.into();
        assert_eq!(
            message_info(&raw),
            MessageInfo {
                id: 9,
                ..Default::default()
            }
        );
    }

    #[test]
    fn cached_ids_follow_target_kind() {
        assert_eq!(cached_peer_ids(42, TargetKind::User), vec![PeerId::user(42)]);
        assert_eq!(cached_peer_ids(42, TargetKind::Group), vec![PeerId::chat(42)]);
        assert_eq!(cached_peer_ids(42, TargetKind::Channel), vec![PeerId::channel(42)]);
        assert_eq!(cached_peer_ids(42, TargetKind::Unknown).len(), 3);
    }

    #[test]
    fn cached_ids_skip_out_of_range_values() {
        assert!(cached_peer_ids(0, TargetKind::Unknown).is_empty());
        assert!(cached_peer_ids(-5, TargetKind::Unknown).is_empty());
        assert!(cached_peer_ids(5_000_000_000_000, TargetKind::Unknown).is_empty());
        assert_eq!(
            cached_peer_ids(1_500_000_000_000, TargetKind::Unknown),
            vec![PeerId::channel(1_500_000_000_000)]
        );
    }

    #[test]
    fn peer_info_keeps_self_flag_and_skips_min_users() {
        let mut me = raw_user(42, Some("Me"), None, None);
        me.is_self = true;
        let info = peer_info(&Peer::User(User::from_raw(me.into())));
        assert_eq!(
            info,
            Some(PeerInfo::User {
                id: 42,
                auth: Some(PeerAuth::from_hash(777)),
                bot: Some(false),
                is_self: Some(true),
            })
        );

        let mut min = raw_user(43, Some("Min"), None, None);
        min.min = true;
        assert_eq!(peer_info(&Peer::User(User::from_raw(min.into()))), None);
    }

    #[test]
    fn peer_info_for_chats() {
        assert_eq!(
            peer_info(&channel(901, "Forum", false, true)),
            Some(PeerInfo::Channel {
                id: 901,
                auth: Some(PeerAuth::from_hash(555)),
                kind: Some(ChannelKind::Megagroup),
            })
        );
        assert_eq!(
            peer_info(&basic_group(77, "Family")),
            Some(PeerInfo::Chat { id: 77 })
        );
    }

    #[test]
    fn resolved_peers_survive_in_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.session");
        let peer = user(Some("Alice"), Some("Smith"), Some("alice"));

        {
            let session = SqliteSession::open(&path).unwrap();
            session.cache_peer(&peer_info(&peer).unwrap());
        }

        let session = SqliteSession::open(&path).unwrap();
        let ids = cached_peer_ids(42, TargetKind::User);
        let info = session.peer(ids[0]).expect("cached user");
        assert_eq!(PeerRef::from(info), PeerRef::from(&peer));
    }

    #[test]
    fn forward_request_targets_topic() {
        let destination = channel(901, "Forum", false, true);
        let source = channel(900, "News", true, false);

        let request = forward_request(&destination, &source, 120, Some(5));
        assert_eq!(request.id, vec![120]);
        assert_eq!(request.top_msg_id, Some(5));
        assert_eq!(request.random_id.len(), 1);
        let to_peer: tl::enums::InputPeer = PeerRef::from(&destination).into();
        let from_peer: tl::enums::InputPeer = PeerRef::from(&source).into();
        assert_eq!(request.to_peer, to_peer);
        assert_eq!(request.from_peer, from_peer);

        let plain = forward_request(&destination, &source, 120, None);
        assert_eq!(plain.top_msg_id, None);
    }
}
