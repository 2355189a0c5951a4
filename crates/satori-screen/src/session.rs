//! Hour-long device session.
//!
//! The device restarts once per session whether or not the panel changed,
//! so the network and clock are re-established from scratch every hour.

use core::time::Duration;

pub const DEFAULT_SESSION_LENGTH: Duration = Duration::from_secs(3_600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    length: Duration,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_LENGTH)
    }
}

impl Session {
    pub fn new(length: Duration) -> Self {
        Self { length }
    }

    pub fn length(&self) -> Duration {
        self.length
    }

    /// Whether `uptime` has used up the session
    pub fn is_over(&self, uptime: Duration) -> bool {
        uptime >= self.length
    }

    /// Time left for the low-power wait before the restart
    pub fn remaining(&self, uptime: Duration) -> Duration {
        self.length.saturating_sub(uptime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_after_an_hour_of_uptime() {
        let session = Session::default();
        assert!(!session.is_over(Duration::from_secs(3_599)));
        assert!(session.is_over(Duration::from_secs(3_600)));
        assert!(session.is_over(Duration::from_secs(7_200)));
    }

    #[test]
    fn remaining_time_never_underflows() {
        let session = Session::new(Duration::from_secs(60));
        assert_eq!(session.remaining(Duration::from_secs(45)), Duration::from_secs(15));
        assert_eq!(session.remaining(Duration::from_secs(90)), Duration::ZERO);
    }
}
