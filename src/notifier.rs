use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::warn;

/// Longest a notice may stay on screen.
pub const NOTICE_TTL_MAX_SECS: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Transient notices shown to the user; they expire after `ttl`.
#[derive(Debug, Clone)]
pub struct Notifier {
    ttl: TimeDelta,
    notices: Vec<Notice>,
}

impl Notifier {
    /// `ttl_secs` must be within `1..=NOTICE_TTL_MAX_SECS`; a zero TTL would
    /// expire every notice before it is shown.
    pub fn new(ttl_secs: u64) -> Result<Self> {
        if !(1..=NOTICE_TTL_MAX_SECS).contains(&ttl_secs) {
            return Err(anyhow!("notice ttl must be within [1, {NOTICE_TTL_MAX_SECS}] seconds, got {ttl_secs}"));
        }
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| anyhow!("notice ttl out of range: {ttl_secs}"))?;
        Ok(Self { ttl, notices: Vec::new() })
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push_at(NoticeLevel::Info, text.into(), Utc::now());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        warn!(notice = %text, "notifier.error");
        self.push_at(NoticeLevel::Error, text, Utc::now());
    }

    pub fn push_at(&mut self, level: NoticeLevel, text: String, created_at: DateTime<Utc>) {
        self.notices.push(Notice { level, text, created_at });
    }

    /// Drops expired notices and returns the rest.
    pub fn active(&mut self, now: DateTime<Utc>) -> &[Notice] {
        let ttl = self.ttl;
        self.notices.retain(|n| now - n.created_at < ttl);
        &self.notices
    }
}
