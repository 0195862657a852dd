//! Sequential send loop over a template's targets
//!
//! Fire-and-forget: one attempt per target, failures are recorded and
//! skipped, and the loop sleeps for the configured delay after every target.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::messenger::Messenger;
use crate::metrics;
use crate::target::Target;

/// What gets delivered to every target.
pub enum Payload<M> {
    Text(String),
    Existing { message: M, as_forward: bool },
}

impl<M> Payload<M> {
    pub fn mode(&self) -> SendMode {
        match self {
            Payload::Text(_) => SendMode::Text,
            Payload::Existing {
                as_forward: true, ..
            } => SendMode::Forward,
            Payload::Existing { .. } => SendMode::Copy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    Text,
    Copy,
    Forward,
}

impl SendMode {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            SendMode::Text => "text",
            SendMode::Copy => "copy",
            SendMode::Forward => "forward",
        }
    }

    /// Verb used in outcome lines.
    pub fn verb(&self) -> &'static str {
        match self {
            SendMode::Text => "Sent",
            SendMode::Copy => "Sent Copy",
            SendMode::Forward => "Forwarded",
        }
    }

    /// Verb used in failure lines.
    pub fn failure_verb(&self) -> &'static str {
        match self {
            SendMode::Text => "send to",
            SendMode::Copy | SendMode::Forward => "process",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BroadcastOptions {
    pub delay: Duration,
}

impl BroadcastOptions {
    /// Build options from a delay in seconds; negative, non-finite or oversized values are rejected.
    pub fn from_secs(delay_secs: f64) -> Result<Self> {
        let delay = Duration::try_from_secs_f64(delay_secs).map_err(|e| {
            Error::InvalidArgument(format!(
                "delay must be a non-negative number of seconds, got {}: {}",
                delay_secs, e
            ))
        })?;
        Ok(Self { delay })
    }
}

/// Progress notifications emitted while the loop runs.
#[derive(Debug)]
pub enum BroadcastEvent<'a> {
    Sending {
        index: usize,
        total: usize,
        target: &'a Target,
    },
    Delivered {
        target: &'a Target,
        mode: SendMode,
    },
    Failed {
        target: &'a Target,
        mode: SendMode,
        error: &'a Error,
    },
}

impl BroadcastEvent<'_> {
    /// Console line for delivery outcomes; `None` for progress events.
    pub fn outcome_line(&self) -> Option<String> {
        match self {
            BroadcastEvent::Sending { .. } => None,
            BroadcastEvent::Delivered { target, mode } => {
                Some(format!("✅ {} to: {}", mode.verb(), target.describe()))
            }
            BroadcastEvent::Failed {
                target,
                mode,
                error,
            } => Some(format!(
                "❌ Failed to {} {}: {}",
                mode.failure_verb(),
                target.chat_title,
                error
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedTarget {
    pub target: Target,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastReport {
    pub total: usize,
    pub sent: usize,
    pub failed: Vec<FailedTarget>,
}

impl BroadcastReport {
    pub fn summary(&self) -> String {
        format!(
            "Finished! Sent to {}/{} targets ({} failed).",
            self.sent,
            self.total,
            self.failed.len()
        )
    }
}

async fn deliver<M: Messenger>(
    messenger: &M,
    target: &Target,
    payload: &Payload<M::Message>,
) -> Result<()> {
    match payload {
        Payload::Text(text) => messenger.send_text(target, text).await,
        Payload::Existing {
            message,
            as_forward: false,
        } => messenger.send_copy(target, message).await,
        Payload::Existing {
            message,
            as_forward: true,
        } => messenger.forward(target, message).await,
    }
}

/// Deliver `payload` to each target in order, sleeping `options.delay` after each one.
pub async fn broadcast<M, F>(
    messenger: &M,
    targets: &[Target],
    payload: &Payload<M::Message>,
    options: BroadcastOptions,
    mut observer: F,
) -> BroadcastReport
where
    M: Messenger,
    F: FnMut(&BroadcastEvent<'_>),
{
    let mode = payload.mode();
    let total = targets.len();
    let mut report = BroadcastReport {
        total,
        ..Default::default()
    };

    info!(total, mode = mode.label(), delay = ?options.delay, "Starting broadcast");

    for (index, target) in targets.iter().enumerate() {
        observer(&BroadcastEvent::Sending {
            index,
            total,
            target,
        });

        match deliver(messenger, target, payload).await {
            Ok(()) => {
                report.sent += 1;
                metrics::record_broadcast_target(mode.label(), true);
                observer(&BroadcastEvent::Delivered { target, mode });
            }
            Err(error) => {
                warn!(chat_id = target.chat_id, chat = %target.chat_title, error = %error, "Send failed");
                metrics::record_broadcast_target(mode.label(), false);
                observer(&BroadcastEvent::Failed {
                    target,
                    mode,
                    error: &error,
                });
                report.failed.push(FailedTarget {
                    target: target.clone(),
                    error: error.to_string(),
                });
            }
        }

        sleep(options.delay).await;
    }

    info!(sent = report.sent, failed = report.failed.len(), "Broadcast finished");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::fake::FakeMessenger;
    use crate::target::TargetKind;

    fn targets() -> Vec<Target> {
        let mut topic = Target::new(30, "Forum", TargetKind::Channel);
        topic.topic_id = Some(4);
        topic.topic_title = Some("Releases".into());
        vec![
            Target::new(10, "Alice", TargetKind::User),
            Target::new(20, "Team", TargetKind::Group),
            topic,
        ]
    }

    fn no_delay() -> BroadcastOptions {
        BroadcastOptions::from_secs(0.0).unwrap()
    }

    #[tokio::test]
    async fn sends_text_to_every_target_in_order() {
        let fake = FakeMessenger::default();
        let payload = Payload::Text("hi".to_string());

        let report = broadcast(&fake, &targets(), &payload, no_delay(), |_| {}).await;

        assert_eq!(report.total, 3);
        assert_eq!(report.sent, 3);
        assert!(report.failed.is_empty());
        assert_eq!(
            fake.log(),
            vec!["text:hi@10#0", "text:hi@20#0", "text:hi@30#4"]
        );
    }

    #[tokio::test]
    async fn failures_are_swallowed_and_reported() {
        let fake = FakeMessenger::default().failing(20);
        let payload = Payload::Text("hi".to_string());

        let mut lines = Vec::new();
        let report = broadcast(&fake, &targets(), &payload, no_delay(), |event| {
            if let Some(line) = event.outcome_line() {
                lines.push(line);
            }
        })
        .await;

        assert_eq!(report.sent, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].target.chat_id, 20);
        assert!(report.failed[0].error.contains("CHAT_WRITE_FORBIDDEN"));
        assert_eq!(fake.log().len(), 2);

        assert_eq!(lines[0], "✅ Sent to: Alice");
        assert!(lines[1].starts_with("❌ Failed to send to Team:"));
        assert_eq!(lines[2], "✅ Sent to: Forum (Topic: Releases)");
    }

    #[tokio::test]
    async fn existing_message_is_copied_or_forwarded() {
        let fake = FakeMessenger::default();
        let copy = Payload::Existing {
            message: "promo".to_string(),
            as_forward: false,
        };
        let forward = Payload::Existing {
            message: "promo".to_string(),
            as_forward: true,
        };

        let all = targets();
        let one = &all[..1];
        broadcast(&fake, one, &copy, no_delay(), |_| {}).await;
        broadcast(&fake, one, &forward, no_delay(), |_| {}).await;

        assert_eq!(fake.log(), vec!["copy:promo@10#0", "forward:promo@10#0"]);
    }

    #[tokio::test]
    async fn sending_events_carry_position() {
        let fake = FakeMessenger::default();
        let payload = Payload::Text("x".to_string());
        let mut seen = Vec::new();

        broadcast(&fake, &targets(), &payload, no_delay(), |event| {
            if let BroadcastEvent::Sending { index, total, .. } = event {
                seen.push((*index, *total));
            }
        })
        .await;

        assert_eq!(seen, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_after_every_target() {
        let fake = FakeMessenger::default();
        let payload = Payload::Text("x".to_string());
        let options = BroadcastOptions::from_secs(5.0).unwrap();

        let start = tokio::time::Instant::now();
        broadcast(&fake, &targets(), &payload, options, |_| {}).await;

        assert!(start.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test]
    async fn empty_target_list_is_a_no_op() {
        let fake = FakeMessenger::default();
        let payload = Payload::Text("x".to_string());
        let report = broadcast(&fake, &[], &payload, no_delay(), |_| {}).await;
        assert_eq!(report, BroadcastReport::default());
    }

    #[test]
    fn rejects_negative_and_nan_delays() {
        assert!(BroadcastOptions::from_secs(-1.0).is_err());
        assert!(BroadcastOptions::from_secs(f64::NAN).is_err());
        assert!(BroadcastOptions::from_secs(f64::INFINITY).is_err());
        assert!(BroadcastOptions::from_secs(1e30).is_err());
        assert!(BroadcastOptions::from_secs(-0.5).is_err());
        assert_eq!(
            BroadcastOptions::from_secs(1.5).unwrap().delay,
            Duration::from_millis(1500)
        );
    }

    #[tokio::test]
    async fn copy_and_forward_failures_use_process_wording() {
        let fake = FakeMessenger::default().failing(10);
        let all = targets();
        let one = &all[..1];

        for as_forward in [false, true] {
            let payload = Payload::Existing {
                message: "promo".to_string(),
                as_forward,
            };
            let mut lines = Vec::new();
            broadcast(&fake, one, &payload, no_delay(), |event| {
                if let Some(line) = event.outcome_line() {
                    lines.push(line);
                }
            })
            .await;
            assert!(lines[0].starts_with("❌ Failed to process Alice:"), "{}", lines[0]);
        }
    }

    #[test]
    fn payload_mode_and_verbs() {
        let text: Payload<String> = Payload::Text(String::new());
        assert_eq!(text.mode(), SendMode::Text);
        let fwd = Payload::Existing {
            message: String::new(),
            as_forward: true,
        };
        assert_eq!(fwd.mode().verb(), "Forwarded");
        let copy = Payload::Existing {
            message: String::new(),
            as_forward: false,
        };
        assert_eq!(copy.mode().verb(), "Sent Copy");
    }

    #[test]
    fn report_summary() {
        let report = BroadcastReport {
            total: 4,
            sent: 3,
            failed: vec![FailedTarget {
                target: Target::new(1, "x", TargetKind::User),
                error: "boom".into(),
            }],
        };
        assert_eq!(report.summary(), "Finished! Sent to 3/4 targets (1 failed).");
    }
}
