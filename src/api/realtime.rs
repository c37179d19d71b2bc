// Change notifications for the favorites table
//
// Events are only a "something changed" signal; the favorites manager
// re-fetches instead of applying them.

use crate::models::{ServiceId, UserId};
use crate::utils::error_handling::safe_lock;
use crate::utils::errors::GatewayError;
use crate::utils::http;
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use std::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    #[serde(other)]
    Unknown,
}

/// A change to some user's favorites; every field is best effort
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub user_id: Option<UserId>,
    pub service_id: Option<ServiceId>,
}

impl ChangeEvent {
    /// Event whose payload could not be read
    pub fn unknown() -> Self {
        Self {
            kind: ChangeKind::Unknown,
            user_id: None,
            service_id: None,
        }
    }

    /// Events without a user are delivered to everyone
    pub fn concerns(&self, user_id: &UserId) -> bool {
        self.user_id.as_ref().map_or(true, |u| u == user_id)
    }
}

/// Live feed of change events for one user
///
/// Dropping it unsubscribes.
pub struct Subscription {
    rx: UnboundedReceiver<ChangeEvent>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(rx: UnboundedReceiver<ChangeEvent>) -> Self {
        Self { rx, task: None }
    }

    /// Subscription fed by a background forwarding task
    pub fn with_task(rx: UnboundedReceiver<ChangeEvent>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Wait for the next event; `None` once the feed has ended
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Take every event already queued without waiting
    pub fn drain_pending(&mut self) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Subscribe to changes of `user_id`'s favorites
    async fn subscribe(&self, user_id: &UserId) -> Result<Subscription, GatewayError>;
}

/// In-process notifier; whoever mutates favorites calls `publish`
#[derive(Default)]
pub struct LocalNotifier {
    subscribers: Mutex<Vec<(UserId, UnboundedSender<ChangeEvent>)>>,
}

impl LocalNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, event: ChangeEvent) {
        let mut subscribers = safe_lock(&self.subscribers, "Realtime");
        subscribers.retain(|(_, tx)| !tx.is_closed());
        for (user_id, tx) in subscribers.iter() {
            if event.concerns(user_id) {
                let _ = tx.send(event.clone());
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = safe_lock(&self.subscribers, "Realtime");
        subscribers.retain(|(_, tx)| !tx.is_closed());
        subscribers.len()
    }
}

#[async_trait]
impl ChangeNotifier for LocalNotifier {
    async fn subscribe(&self, user_id: &UserId) -> Result<Subscription, GatewayError> {
        let (tx, rx) = mpsc::unbounded_channel();
        safe_lock(&self.subscribers, "Realtime").push((user_id.clone(), tx));
        log::debug!("[Realtime] Local subscription for {}", user_id);
        Ok(Subscription::new(rx))
    }
}

/// Notifier reading a server-sent event stream of favorites changes
///
/// The stream is requested with a `user_id=eq.<id>` filter. It is not
/// reconnected: when it ends the subscription ends too.
pub struct EventStreamNotifier {
    url: String,
    anon_key: String,
    token: String,
}

impl EventStreamNotifier {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl ChangeNotifier for EventStreamNotifier {
    async fn subscribe(&self, user_id: &UserId) -> Result<Subscription, GatewayError> {
        match reqwest::Url::parse(&self.url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                return Err(GatewayError::Config(format!(
                    "realtime URL is not an http(s) URL: {}",
                    self.url
                )))
            }
        }

        let separator = if self.url.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}user_id={}",
            self.url,
            separator,
            http::eq_filter(user_id.as_str())
        );

        log::info!("[Realtime] Opening change stream for {}", user_id);
        let request = http::STREAM_CLIENT
            .get(&url)
            .header("Accept", "text/event-stream");
        let response = http::with_auth(request, &self.anon_key, &self.token)
            .send()
            .await?;
        let response = http::ensure_success(response).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut decoder = SseDecoder::default();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        log::warn!("[Realtime] Change stream failed: {}", e);
                        break;
                    }
                };
                for data in decoder.push(&chunk) {
                    if tx.send(parse_event(&data)).is_err() {
                        // subscriber went away
                        return;
                    }
                }
            }
            log::info!("[Realtime] Change stream closed");
        });

        Ok(Subscription::with_task(rx, task))
    }
}

#[derive(Deserialize)]
struct WireRecord {
    user_id: Option<UserId>,
    service_id: Option<ServiceId>,
}

#[derive(Deserialize)]
struct WireEvent {
    #[serde(rename = "type", alias = "eventType")]
    kind: Option<ChangeKind>,
    #[serde(alias = "new")]
    record: Option<WireRecord>,
    #[serde(alias = "old")]
    old_record: Option<WireRecord>,
}

/// Map an event payload to a `ChangeEvent`; unreadable payloads still count
pub fn parse_event(data: &str) -> ChangeEvent {
    let wire: WireEvent = match serde_json::from_str(data) {
        Ok(w) => w,
        Err(e) => {
            log::debug!("[Realtime] Unreadable event payload ({}): {}", e, data);
            return ChangeEvent::unknown();
        }
    };

    // deletes only carry the old row
    let (user_id, service_id) = match wire.record.or(wire.old_record) {
        Some(r) => (r.user_id, r.service_id),
        None => (None, None),
    };

    ChangeEvent {
        kind: wire.kind.unwrap_or(ChangeKind::Unknown),
        user_id,
        service_id,
    }
}

/// Incremental `text/event-stream` decoder yielding each event's data
#[derive(Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
            // comments (":"), "event:", "id:" and "retry:" lines carry nothing we use
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_handles_split_chunks_and_heartbeats() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b": keep-alive\n\ndata: {\"type\":").is_empty());
        let events = decoder.push(b"\"INSERT\"}\r\n\r\ndata: x\n");
        assert_eq!(events, vec!["{\"type\":\"INSERT\"}".to_string()]);
        assert_eq!(decoder.push(b"data: y\n\n"), vec!["x\ny".to_string()]);
    }

    #[test]
    fn parses_insert_and_delete_payloads() {
        let insert = parse_event(r#"{"type":"INSERT","record":{"user_id":"u1","service_id":"s1"}}"#);
        assert_eq!(insert.kind, ChangeKind::Insert);
        assert_eq!(insert.user_id, Some(UserId::from("u1")));
        assert_eq!(insert.service_id, Some(ServiceId::from("s1")));

        let delete = parse_event(r#"{"eventType":"DELETE","old":{"user_id":"u1","service_id":"s1"}}"#);
        assert_eq!(delete.kind, ChangeKind::Delete);
        assert_eq!(delete.service_id, Some(ServiceId::from("s1")));
    }

    #[test]
    fn odd_payloads_still_signal_a_change() {
        assert_eq!(parse_event("not json"), ChangeEvent::unknown());
        assert_eq!(parse_event(r#"{"type":"TRUNCATE"}"#).kind, ChangeKind::Unknown);
    }

    #[tokio::test]
    async fn local_notifier_scopes_events_to_user() {
        let notifier = LocalNotifier::new();
        let mut alice = notifier.subscribe(&UserId::from("alice")).await.unwrap();
        let mut bob = notifier.subscribe(&UserId::from("bob")).await.unwrap();

        notifier.publish(ChangeEvent {
            kind: ChangeKind::Insert,
            user_id: Some(UserId::from("alice")),
            service_id: None,
        });
        notifier.publish(ChangeEvent::unknown());

        assert_eq!(alice.drain_pending().len(), 2);
        assert_eq!(bob.drain_pending(), vec![ChangeEvent::unknown()]);
    }

    #[tokio::test]
    async fn malformed_stream_url_is_a_config_error() {
        let notifier = EventStreamNotifier::new("not a url", "anon", "token");
        let err = notifier.subscribe(&UserId::from("alice")).await.err().unwrap();
        assert!(matches!(err, GatewayError::Config(_)));

        let notifier = EventStreamNotifier::new("ftp://feed.example/changes", "anon", "token");
        let err = notifier.subscribe(&UserId::from("alice")).await.err().unwrap();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[tokio::test]
    async fn dropped_subscriptions_are_pruned() {
        let notifier = LocalNotifier::new();
        let sub = notifier.subscribe(&UserId::from("alice")).await.unwrap();
        assert_eq!(notifier.subscriber_count(), 1);
        drop(sub);
        assert_eq!(notifier.subscriber_count(), 0);
    }
}
