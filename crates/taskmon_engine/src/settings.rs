use std::time::Duration;

use crate::SettleKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Server root, e.g. `http://127.0.0.1:5000/`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Budget for the "needed?" check before failing open.
    pub check_timeout: Duration,
    /// Longest a progress channel may go without a terminal event.
    pub fallback_deadline: Duration,
    pub settle_success: Duration,
    pub settle_error: Duration,
    /// Grace period after the stream closes before any terminal event.
    pub disconnect_grace: Duration,
    pub page_size: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            check_timeout: Duration::from_secs(2),
            fallback_deadline: Duration::from_secs(5 * 60),
            settle_success: Duration::from_millis(1500),
            settle_error: Duration::from_millis(2000),
            disconnect_grace: Duration::from_millis(1000),
            page_size: 50,
        }
    }
}

impl MonitorSettings {
    pub fn settle_delay(&self, kind: SettleKind) -> Duration {
        match kind {
            SettleKind::Success => self.settle_success,
            SettleKind::Failure => self.settle_error,
            SettleKind::Disconnect => self.disconnect_grace,
            SettleKind::Immediate => Duration::ZERO,
        }
    }
}
