//! Tests for the broadcast loop through a recording messenger

use std::sync::Mutex;
use std::time::Duration;

use moontele::broadcast::{BroadcastEvent, SendMode};
use moontele::link::MessageLink;
use moontele::messenger::{ChatInfo, MessageInfo};
use moontele::target::ChatRef;
use moontele::{broadcast, BroadcastOptions, Error, Messenger, Payload, Result, Target, TargetKind};

/// Records deliveries; chats listed in `blocked` fail.
#[derive(Default)]
struct Recorder {
    blocked: Vec<i64>,
    sent: Mutex<Vec<(i64, Option<i32>, &'static str)>>,
}

impl Recorder {
    fn push(&self, target: &Target, what: &'static str) -> Result<()> {
        if self.blocked.contains(&target.chat_id) {
            return Err(Error::TelegramError("USER_BANNED_IN_CHANNEL".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((target.chat_id, target.topic_id, what));
        Ok(())
    }
}

impl Messenger for Recorder {
    type Message = ();

    async fn find_chat(&self, _chat: &ChatRef) -> Result<Option<ChatInfo>> {
        Ok(None)
    }

    async fn message_info(&self, _chat: &ChatInfo, _id: i32) -> Result<Option<MessageInfo>> {
        Ok(None)
    }

    async fn fetch_message(&self, _link: &MessageLink) -> Result<Option<()>> {
        Ok(Some(()))
    }

    async fn send_text(&self, target: &Target, _text: &str) -> Result<()> {
        self.push(target, "text")
    }

    async fn send_copy(&self, target: &Target, _message: &()) -> Result<()> {
        self.push(target, "copy")
    }

    async fn forward(&self, target: &Target, _message: &()) -> Result<()> {
        self.push(target, "forward")
    }
}

fn targets() -> Vec<Target> {
    let mut topic = Target::new(3, "Forum", TargetKind::Channel);
    topic.topic_id = Some(11);
    vec![
        Target::new(1, "One", TargetKind::User),
        Target::new(2, "Two", TargetKind::Group),
        topic,
    ]
}

#[tokio::test]
async fn test_forward_reaches_every_target_despite_failures() {
    let recorder = Recorder {
        blocked: vec![2],
        ..Default::default()
    };
    let payload = Payload::Existing {
        message: (),
        as_forward: true,
    };

    let mut delivered = Vec::new();
    let report = broadcast(
        &recorder,
        &targets(),
        &payload,
        BroadcastOptions::from_secs(0.0).unwrap(),
        |event| {
            if let BroadcastEvent::Delivered { target, mode } = event {
                assert_eq!(*mode, SendMode::Forward);
                delivered.push(target.chat_id);
            }
        },
    )
    .await;

    assert_eq!(report.sent, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(delivered, vec![1, 3]);
    assert_eq!(
        *recorder.sent.lock().unwrap(),
        vec![(1, None, "forward"), (3, Some(11), "forward")]
    );
    assert_eq!(report.summary(), "Finished! Sent to 2/3 targets (1 failed).");
}

#[tokio::test(start_paused = true)]
async fn test_delay_applies_between_and_after_sends() {
    let recorder = Recorder::default();
    let payload = Payload::Text("hello".to_string());
    let options = BroadcastOptions::from_secs(2.0).unwrap();

    let start = tokio::time::Instant::now();
    broadcast(&recorder, &targets(), &payload, options, |_| {}).await;

    assert!(start.elapsed() >= Duration::from_secs(6));
}
