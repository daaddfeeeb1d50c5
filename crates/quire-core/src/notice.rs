//! Transient notifications
//!
//! Sessions queue a [`Notice`] when something the user asked for degraded
//! or failed (a media file that could not be read, read-aloud that could
//! not start). Hosts drain the queue and show them briefly.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub created_at: Instant,
}

impl Notice {
    /// How long hosts are expected to keep a notice on screen
    pub const DISPLAY_FOR: Duration = Duration::from_secs(4);

    pub fn new(message: impl Into<String>, level: NoticeLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Error)
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= Self::DISPLAY_FOR
    }
}

/// Queue of pending notices
#[derive(Debug, Default)]
pub struct Notices {
    pending: Vec<Notice>,
}

impl Notices {
    pub fn push(&mut self, notice: Notice) {
        self.pending.push(notice);
    }

    /// Take all pending notices, oldest first
    pub fn take(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_drains_in_order() {
        let mut notices = Notices::default();
        notices.push(Notice::info("first"));
        notices.push(Notice::error("second"));

        let taken = notices.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].message, "first");
        assert_eq!(taken[1].level, NoticeLevel::Error);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_fresh_notice_not_expired() {
        assert!(!Notice::warning("careful").is_expired());
    }
}
