use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use upwatch_store::{MentionRef, WatchTarget};

use crate::classify::{self, Event, EventClass};
use crate::snapshot::Snapshot;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Best-effort delivery of one composed message to a notification target.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, target_id: &str, text: &str) -> Result<(), NotifyError>;
}

/// Resolves a target's configured mention refs into mention strings.
/// Only consulted when a warning-class event fired.
#[async_trait]
pub trait MentionResolver: Send + Sync {
    async fn resolve_mentions(&self, target: &WatchTarget) -> Vec<String>;
}

/// Notifier that writes messages to the log. Default wiring for running
/// without a chat integration.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, target_id: &str, text: &str) -> Result<(), NotifyError> {
        info!(target_id, %text, "notification");
        Ok(())
    }
}

/// Renders the mention refs stored on the target without any lookup.
pub struct ConfiguredMentions;

#[async_trait]
impl MentionResolver for ConfiguredMentions {
    async fn resolve_mentions(&self, target: &WatchTarget) -> Vec<String> {
        target
            .mentions
            .iter()
            .map(|r| match r {
                MentionRef::Role(id) => format!("<@&{id}>"),
                MentionRef::Member(id) => format!("<@{id}>"),
            })
            .collect()
    }
}

/// Run matcher and classifier over every tracked server of one target,
/// writing the new states back, and send at most one composed message.
///
/// Events are ordered by class priority (stable within a class), each line
/// prefixed with its class glyph. A warning-class event triggers mention
/// resolution; the mentions are appended as a trailing line. Delivery is
/// best-effort: a failed send is logged and does not fail the tick.
pub async fn check_target(
    target: &mut WatchTarget,
    snapshot: &Snapshot,
    notifier: &dyn Notifier,
    resolver: &dyn MentionResolver,
) {
    let mut events: Vec<Event> = Vec::new();
    for server in &mut target.servers {
        let entry = classify::find_entry(&server.name, snapshot);
        let (state, event) = classify::classify(&server.name, &server.state, entry);
        server.state = state;
        events.extend(event);
    }

    if events.is_empty() {
        return;
    }

    let should_ping = events.iter().any(|e| e.class == EventClass::Warning);
    events.sort_by_key(|e| e.class);

    let mut text = events
        .iter()
        .map(|e| format!("{} {}", e.class.glyph(), e.message))
        .collect::<Vec<_>>()
        .join("\n");

    if should_ping {
        let mentions = resolver.resolve_mentions(target).await;
        if !mentions.is_empty() {
            text.push('\n');
            text.push_str(&mentions.join(" "));
        }
    }

    if let Err(err) = notifier.notify(&target.id, &text).await {
        warn!(target_id = %target.id, %err, "failed to deliver notification");
    }
}
