//! Transient submit banner

use std::time::{Duration, Instant};

/// How long a notice stays visible
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    raised_at: Instant,
}

impl Notice {
    pub(crate) fn new(kind: NoticeKind, message: impl Into<String>, raised_at: Instant) -> Self {
        Self { kind, message: message.into(), raised_at }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < NOTICE_LIFETIME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_expires() {
        let start = Instant::now();
        let notice = Notice::new(NoticeKind::Success, "saved", start);
        assert!(notice.is_visible(start));
        assert!(notice.is_visible(start + Duration::from_millis(2999)));
        assert!(!notice.is_visible(start + NOTICE_LIFETIME));
    }
}
