//! Transient notice board.
//!
//! Holds the latest notice until it is replaced or its display time runs out.
//! Expiry never feeds back into the interaction state.

use std::sync::Arc;

use lpbd_shared::time::Clock;

use crate::domain::Notice;

/// How long a notice stays up.
pub const NOTICE_TTL_MILLIS: i64 = 5_000;

pub struct NoticeBoard {
    clock: Arc<dyn Clock>,
    current: Option<(Notice, i64)>,
}

impl NoticeBoard {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            current: None,
        }
    }

    /// Show `notice`, replacing whatever was up.
    pub fn post(&mut self, notice: Notice) {
        let expires_at = self.clock.now_millis() + NOTICE_TTL_MILLIS;
        self.current = Some((notice, expires_at));
    }

    /// The notice currently up, if it has not expired.
    pub fn current(&self) -> Option<&Notice> {
        let now = self.clock.now_millis();
        self.current
            .as_ref()
            .filter(|(_, expires_at)| now < *expires_at)
            .map(|(notice, _)| notice)
    }

    /// Drop the notice if its time is up. Returns the dismissed notice.
    pub fn expire(&mut self) -> Option<Notice> {
        let now = self.clock.now_millis();
        match &self.current {
            Some((_, expires_at)) if now >= *expires_at => {
                self.current.take().map(|(notice, _)| notice)
            }
            _ => None,
        }
    }
}
