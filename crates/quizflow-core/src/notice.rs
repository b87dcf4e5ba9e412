//! Transient user-facing notices.
//!
//! A notice carries a token and a deadline. The host schedules a dismissal
//! for that token; showing a new notice replaces the old one and makes the
//! old token stale, so a late dismissal of a replaced notice does nothing.

use std::time::{Duration, Instant};

/// Identifies one shown notice for a later dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeToken(u64);

/// A notice and its auto-dismiss deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub token: NoticeToken,
    pub expires_at: Instant,
}

/// Holds at most one notice; last notice wins.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    ttl: Duration,
    current: Option<Notice>,
    next_token: u64,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

impl NoticeBoard {
    pub const DEFAULT_TTL: Duration = Duration::from_millis(2200);

    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: None,
            next_token: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Show a notice now, replacing any pending one.
    pub fn show(&mut self, text: impl Into<String>) -> NoticeToken {
        self.show_at(text, Instant::now())
    }

    /// Show a notice as of `now`, replacing any pending one.
    pub fn show_at(&mut self, text: impl Into<String>, now: Instant) -> NoticeToken {
        self.next_token += 1;
        let token = NoticeToken(self.next_token);
        let notice = Notice {
            text: text.into(),
            token,
            expires_at: now + self.ttl,
        };
        if let Some(previous) = self.current.replace(notice) {
            tracing::trace!(token = previous.token.0, "notice replaced");
        }
        token
    }

    /// The pending notice, regardless of its deadline.
    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    /// The notice still visible at `now`.
    pub fn visible_at(&self, now: Instant) -> Option<&Notice> {
        self.current.as_ref().filter(|n| now < n.expires_at)
    }

    /// Dismiss the notice identified by `token`.
    ///
    /// Returns `false` when the token is stale (the notice was already
    /// replaced or dismissed).
    pub fn dismiss(&mut self, token: NoticeToken) -> bool {
        if self.current.as_ref().is_some_and(|n| n.token == token) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Drop the notice if its deadline has passed at `now`.
    pub fn dismiss_expired(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
