// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crate::api::NotificationApi;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{Notification, NotificationKind};
use crate::session::Session;
use crate::sse::{FeedEvent, Subscription};

/// One category's entries, newest first, plus the ids that arrived by push
/// and have not been confirmed by a history fetch yet.
#[derive(Debug, Clone, Default)]
struct Stream {
    entries: Vec<Notification>,
    pending_pushed: HashSet<i64>,
}

/// Merged notification state for both categories.
#[derive(Debug, Clone, Default)]
pub struct NotificationFeed {
    comment: Stream,
    keyword: Stream,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn stream(&self, kind: NotificationKind) -> &Stream {
        match kind {
            NotificationKind::Comment => &self.comment,
            NotificationKind::Keyword => &self.keyword,
        }
    }

    fn stream_mut(&mut self, kind: NotificationKind) -> &mut Stream {
        match kind {
            NotificationKind::Comment => &mut self.comment,
            NotificationKind::Keyword => &mut self.keyword,
        }
    }

    pub fn entries(&self, kind: NotificationKind) -> &[Notification] {
        &self.stream(kind).entries
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Adds a pushed notification at the front. A known id is updated in
    /// place instead; a locally confirmed read flag survives.
    pub fn apply_pushed(&mut self, kind: NotificationKind, mut notification: Notification) {
        let stream = self.stream_mut(kind);
        if let Some(existing) = stream
            .entries
            .iter_mut()
            .find(|n| n.id == notification.id)
        {
            notification.is_read |= existing.is_read;
            *existing = notification;
            return;
        }
        stream.pending_pushed.insert(notification.id);
        stream.entries.insert(0, notification);
    }

    /// Replaces a category with the server's history, keeping pushed entries
    /// the server has not returned yet.
    pub fn replace_history(&mut self, kind: NotificationKind, history: Vec<Notification>) {
        let stream = self.stream_mut(kind);
        let previous = std::mem::take(&mut stream.entries);

        let mut seen = HashSet::with_capacity(history.len());
        let mut from_server = Vec::with_capacity(history.len());
        for mut n in history {
            if !seen.insert(n.id) {
                continue;
            }
            if previous.iter().any(|p| p.id == n.id && p.is_read) {
                n.is_read = true;
            }
            from_server.push(n);
        }

        let mut merged: Vec<Notification> = previous
            .into_iter()
            .filter(|p| stream.pending_pushed.contains(&p.id) && !seen.contains(&p.id))
            .collect();
        stream.pending_pushed.retain(|id| !seen.contains(id));
        merged.extend(from_server);
        stream.entries = merged;
    }

    pub fn unread_count(&self) -> usize {
        NotificationKind::ALL
            .into_iter()
            .map(|k| self.unread_count_for(k))
            .sum()
    }

    pub fn unread_count_for(&self, kind: NotificationKind) -> usize {
        self.entries(kind).iter().filter(|n| !n.is_read).count()
    }

    pub fn unread(&self, kind: NotificationKind) -> Vec<&Notification> {
        self.entries(kind).iter().filter(|n| !n.is_read).collect()
    }

    pub fn find(&self, kind: NotificationKind, id: i64) -> Option<&Notification> {
        self.entries(kind).iter().find(|n| n.id == id)
    }

    /// Flips `is_read` on the entry with `id` only. Returns false when the id
    /// is unknown.
    pub fn mark_local_read(&mut self, kind: NotificationKind, id: i64) -> bool {
        match self.stream_mut(kind).entries.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn apply_event(&mut self, event: &FeedEvent) {
        if let FeedEvent::Notification(kind, n) = event {
            self.apply_pushed(*kind, n.clone());
        }
    }
}

/// The header's notification feed: merged state plus the push
/// subscriptions of the signed-in member.
pub struct Feed {
    state: NotificationFeed,
    member_id: Option<i64>,
    subscriptions: Vec<Subscription>,
    events: Option<Receiver<FeedEvent>>,
}

impl Default for Feed {
    fn default() -> Self {
        Self::new()
    }
}

impl Feed {
    pub fn new() -> Self {
        Self {
            state: NotificationFeed::new(),
            member_id: None,
            subscriptions: Vec::new(),
            events: None,
        }
    }

    pub fn state(&self) -> &NotificationFeed {
        &self.state
    }

    pub fn member_id(&self) -> Option<i64> {
        self.member_id
    }

    pub fn is_subscribed(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Opens one push connection per category for the session's member.
    /// Re-attaching the same member is a no-op; a different member (or none)
    /// tears down the old subscriptions and clears the merged state.
    pub fn attach(&mut self, config: &Config, session: &Session) -> ApiResult<()> {
        let member = session.member_id();
        if member.is_some() && member == self.member_id && self.is_subscribed() {
            return Ok(());
        }
        self.detach();
        let Some(member_id) = member else {
            return Ok(());
        };
        let (tx, rx) = mpsc::channel();
        for kind in NotificationKind::ALL {
            match Subscription::open(config, member_id, kind, tx.clone()) {
                Ok(sub) => self.subscriptions.push(sub),
                Err(e) => {
                    log::error!("Could not open {} notification stream: {}", kind, e);
                    self.detach();
                    return Err(e);
                }
            }
        }
        self.member_id = Some(member_id);
        self.events = Some(rx);
        Ok(())
    }

    pub fn detach(&mut self) {
        for sub in &mut self.subscriptions {
            sub.close();
        }
        self.subscriptions.clear();
        self.events = None;
        self.member_id = None;
        self.state.clear();
    }

    /// Fetches both categories' history. Both are attempted; the first
    /// failure is returned after logging each.
    pub fn load_history(&mut self, api: &impl NotificationApi, session: &Session) -> ApiResult<()> {
        let mut first_err: Option<ApiError> = None;
        for kind in NotificationKind::ALL {
            match api.fetch_notifications(session, kind) {
                Ok(history) => self.state.replace_history(kind, history),
                Err(e) => {
                    log::error!("Failed to load {} notifications: {}", kind, e);
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Applies every event already waiting on the channel.
    pub fn pump(&mut self) -> Vec<FeedEvent> {
        let mut applied = Vec::new();
        let Some(rx) = &self.events else {
            return applied;
        };
        loop {
            match rx.try_recv() {
                Ok(ev) => {
                    self.state.apply_event(&ev);
                    applied.push(ev);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Notification streams ended");
                    break;
                }
            }
        }
        applied
    }

    /// Waits up to `timeout` for the next event and applies it.
    pub fn next_event(&mut self, timeout: Duration) -> Option<FeedEvent> {
        let rx = self.events.as_ref()?;
        match rx.recv_timeout(timeout) {
            Ok(ev) => {
                self.state.apply_event(&ev);
                Some(ev)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Marks a notification read on the server, then locally. Returns the
    /// referenced post id, which the caller should open and re-fetch.
    pub fn mark_read(
        &mut self,
        api: &impl NotificationApi,
        session: &Session,
        kind: NotificationKind,
        id: i64,
    ) -> ApiResult<Option<i64>> {
        if let Err(e) = api.mark_notification_read(session, kind, id) {
            log::error!("Failed to mark {} notification {} read: {}", kind, id, e);
            return Err(e);
        }
        if !self.state.mark_local_read(kind, id) {
            log::debug!("{} notification {} not in local feed", kind, id);
        }
        Ok(self.state.find(kind, id).and_then(|n| n.post_id))
    }

    /// Test and replay hook: feed an event as if it came off the stream.
    pub fn inject(&mut self, event: FeedEvent) {
        self.state.apply_event(&event);
    }
}
