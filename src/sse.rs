// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Server-sent events: a line parser over any `BufRead`, a reconnect backoff,
//! and a background subscription that turns the push stream into typed
//! [`FeedEvent`]s on a channel.

use std::io::{self, BufRead, BufReader};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use reqwest::blocking::{Client, Response};

use crate::config::{Config, ReconnectPolicy};
use crate::error::{ApiError, ApiResult};
use crate::models::{Notification, NotificationKind};
use crate::utils::stream_client;

const DEFAULT_EVENT: &str = "message";
const STOP_POLL: Duration = Duration::from_millis(100);
const MIN_RETRY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

/// Incremental SSE frame parser.
pub struct EventReader<R> {
    inner: R,
    line: String,
    event: Option<String>,
    data: String,
    has_data: bool,
    last_event_id: Option<String>,
    retry: Option<Duration>,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: String::new(),
            event: None,
            data: String::new(),
            has_data: false,
            last_event_id: None,
            retry: None,
        }
    }

    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Reconnection delay most recently requested by the server.
    pub fn retry(&self) -> Option<Duration> {
        self.retry
    }

    /// Reads until the next dispatched event. `Ok(None)` at end of stream; a
    /// trailing event without its blank line is discarded.
    pub fn next_event(&mut self) -> io::Result<Option<SseEvent>> {
        loop {
            self.line.clear();
            if self.inner.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let line = self.line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                if let Some(ev) = self.dispatch() {
                    return Ok(Some(ev));
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }
            let (field, value) = match line.split_once(':') {
                Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => {
                    self.data.push_str(value);
                    self.data.push('\n');
                    self.has_data = true;
                }
                "id" if !value.contains('\0') => {
                    self.last_event_id = Some(value.to_string());
                }
                "retry" => {
                    if let Ok(ms) = value.parse::<u64>() {
                        self.retry = Some(Duration::from_millis(ms));
                    }
                }
                _ => {}
            }
        }
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if !self.has_data {
            self.data.clear();
            return None;
        }
        self.has_data = false;
        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }
        Some(SseEvent {
            event: event
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
            id: self.last_event_id.clone(),
        })
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = io::Result<SseEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

/// Exponential reconnect delay: doubles per failure up to `max`, back to the
/// initial value after a successful connect.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            initial: policy.initial,
            max: policy.max.max(policy.initial),
            current: policy.initial,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// Applies a server `retry:` hint as the new base delay, kept between
    /// `MIN_RETRY` and the configured maximum.
    pub fn set_initial(&mut self, initial: Duration) {
        self.initial = initial.max(MIN_RETRY).min(self.max);
        self.current = self.initial;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Connected(NotificationKind),
    Notification(NotificationKind, Notification),
    Disconnected {
        kind: NotificationKind,
        reason: String,
    },
}

/// Background push connection for one notification category.
///
/// Dropping the subscription asks the worker to stop; it exits at its next
/// received line or backoff tick, or as soon as the event receiver is gone.
pub struct Subscription {
    kind: NotificationKind,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn open(
        config: &Config,
        member_id: i64,
        kind: NotificationKind,
        events: Sender<FeedEvent>,
    ) -> ApiResult<Self> {
        let url = format!("{}/sse/connect?memberId={}", config.base_url, member_id);
        let client = stream_client(config.timeout).map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        let stop = Arc::new(AtomicBool::new(false));
        let worker = StreamWorker {
            client,
            url,
            kind,
            events,
            stop: Arc::clone(&stop),
            backoff: Backoff::new(config.reconnect),
            last_event_id: None,
        };
        let handle = thread::Builder::new()
            .name(format!("sse-{}", kind))
            .spawn(move || worker.run())
            .map_err(|e| ApiError::Stream(format!("could not start {} stream: {}", kind, e)))?;
        log::info!("Opened {} notification stream for member {}", kind, member_id);
        Ok(Self {
            kind,
            stop,
            handle: Some(handle),
        })
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn close(&mut self) {
        if !self.stop.swap(true, Ordering::SeqCst) {
            log::info!("Closing {} notification stream", self.kind);
        }
        // The worker may sit in a blocking read; let it finish on its own.
        self.handle.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

struct StreamWorker {
    client: Client,
    url: String,
    kind: NotificationKind,
    events: Sender<FeedEvent>,
    stop: Arc<AtomicBool>,
    backoff: Backoff,
    last_event_id: Option<String>,
}

impl StreamWorker {
    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn run(mut self) {
        while !self.stopped() {
            let reason = match self.connect() {
                Ok(resp) => {
                    self.backoff.reset();
                    if self.events.send(FeedEvent::Connected(self.kind)).is_err() {
                        return;
                    }
                    match self.consume(resp) {
                        Some(reason) => reason,
                        None => return,
                    }
                }
                Err(e) => e.to_string(),
            };
            if self.stopped() {
                return;
            }
            let delay = self.backoff.next_delay();
            log::warn!(
                "{} notification stream dropped ({}); reconnecting in {:?}",
                self.kind,
                reason,
                delay
            );
            let notice = FeedEvent::Disconnected {
                kind: self.kind,
                reason,
            };
            if self.events.send(notice).is_err() {
                return;
            }
            self.sleep(delay);
        }
    }

    fn connect(&self) -> ApiResult<Response> {
        let mut req = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        if let Some(id) = &self.last_event_id {
            req = req.header("Last-Event-ID", id.as_str());
        }
        let resp = req.send().map_err(|source| ApiError::Transport {
            url: self.url.clone(),
            source,
        })?;
        if !resp.status().is_success() {
            return Err(ApiError::Status {
                method: "GET".to_string(),
                url: self.url.clone(),
                status: resp.status().as_u16(),
            });
        }
        Ok(resp)
    }

    /// Pumps one connection. `Some(reason)` when the stream ended and should
    /// be retried, `None` when the worker should exit.
    fn consume(&mut self, resp: Response) -> Option<String> {
        let mut reader = EventReader::new(BufReader::new(resp));
        let outcome = loop {
            if self.stopped() {
                return None;
            }
            match reader.next_event() {
                Ok(Some(ev)) => {
                    if ev.event != self.kind.event_name() {
                        continue;
                    }
                    match serde_json::from_str::<Notification>(&ev.data) {
                        Ok(n) => {
                            log::debug!("{} notification {} pushed", self.kind, n.id);
                            if self.events.send(FeedEvent::Notification(self.kind, n)).is_err() {
                                return None;
                            }
                        }
                        Err(e) => log::warn!("Skipping malformed {} event: {}", self.kind, e),
                    }
                }
                Ok(None) => break "stream closed by server".to_string(),
                Err(e) => break e.to_string(),
            }
        };
        if let Some(retry) = reader.retry() {
            self.backoff.set_initial(retry);
        }
        if let Some(id) = reader.last_event_id() {
            self.last_event_id = Some(id.to_string());
        }
        Some(outcome)
    }

    fn sleep(&self, delay: Duration) {
        let mut left = delay;
        while !left.is_zero() && !self.stopped() {
            let step = left.min(STOP_POLL);
            thread::sleep(step);
            left -= step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn events(raw: &str) -> Vec<SseEvent> {
        EventReader::new(Cursor::new(raw.as_bytes().to_vec()))
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn parses_named_events_and_multiline_data() {
        let evs = events(
            "event: commentNotification\ndata: {\"id\":1,\ndata: \"content\":\"hi\"}\n\n\
             data: plain\n\n",
        );
        assert_eq!(evs.len(), 2);
        assert_eq!(evs[0].event, "commentNotification");
        assert_eq!(evs[0].data, "{\"id\":1,\n\"content\":\"hi\"}");
        assert_eq!(evs[1].event, "message");
        assert_eq!(evs[1].data, "plain");
    }

    #[test]
    fn ignores_comments_and_handles_crlf() {
        let evs = events(": heartbeat\r\nevent: keywordNotification\r\nid: 9\r\ndata:x\r\n\r\n");
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].event, "keywordNotification");
        assert_eq!(evs[0].data, "x");
        assert_eq!(evs[0].id.as_deref(), Some("9"));
    }

    #[test]
    fn event_without_data_is_not_dispatched() {
        let evs = events("event: connect\n\nevent: keywordNotification\ndata: {}\n\n");
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].event, "keywordNotification");
    }

    #[test]
    fn trailing_partial_event_is_dropped() {
        let evs = events("data: complete\n\ndata: partial\n");
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].data, "complete");
    }

    #[test]
    fn retry_field_is_recorded() {
        let mut reader = EventReader::new(Cursor::new(b"retry: 2500\n\n".to_vec()));
        assert!(reader.next_event().unwrap().is_none());
        assert_eq!(reader.retry(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn backoff_doubles_to_cap_and_resets() {
        let mut b = Backoff::new(ReconnectPolicy {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(500),
        });
        let seq: Vec<u128> = (0..5).map(|_| b.next_delay().as_millis()).collect();
        assert_eq!(seq, vec![100, 200, 400, 500, 500]);
        b.reset();
        assert_eq!(b.next_delay(), Duration::from_millis(100));
    }

    #[test]
    fn retry_hint_replaces_base_delay_within_cap() {
        let mut b = Backoff::new(ReconnectPolicy {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(1000),
        });
        b.set_initial(Duration::from_millis(300));
        assert_eq!(b.next_delay(), Duration::from_millis(300));
        b.set_initial(Duration::from_secs(60));
        assert_eq!(b.next_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn zero_retry_hint_still_backs_off() {
        let mut b = Backoff::new(ReconnectPolicy {
            initial: Duration::from_millis(1000),
            max: Duration::from_secs(30),
        });
        b.set_initial(Duration::ZERO);
        let seq: Vec<u128> = (0..4).map(|_| b.next_delay().as_millis()).collect();
        assert_eq!(seq, vec![100, 200, 400, 800]);
    }
}
