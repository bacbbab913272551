use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use taskmon_core::DEFAULT_SORT;
use taskmon_engine::MonitorSettings;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "taskmon.ron";

/// Settings read from `taskmon.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub check_timeout_ms: u64,
    pub fallback_deadline_ms: u64,
    pub settle_success_ms: u64,
    pub settle_error_ms: u64,
    pub disconnect_grace_ms: u64,
    pub page_size: usize,
    pub sort_by: String,
    pub log: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings = MonitorSettings::default();
        Self {
            server: settings.base_url,
            connect_timeout_ms: millis(settings.connect_timeout),
            request_timeout_ms: millis(settings.request_timeout),
            check_timeout_ms: millis(settings.check_timeout),
            fallback_deadline_ms: millis(settings.fallback_deadline),
            settle_success_ms: millis(settings.settle_success),
            settle_error_ms: millis(settings.settle_error),
            disconnect_grace_ms: millis(settings.disconnect_grace),
            page_size: settings.page_size,
            sort_by: DEFAULT_SORT.to_string(),
            log: LogDestination::default(),
        }
    }
}

impl AppConfig {
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            base_url: self.server.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            check_timeout: Duration::from_millis(self.check_timeout_ms),
            fallback_deadline: Duration::from_millis(self.fallback_deadline_ms),
            settle_success: Duration::from_millis(self.settle_success_ms),
            settle_error: Duration::from_millis(self.settle_error_ms),
            disconnect_grace: Duration::from_millis(self.disconnect_grace_ms),
            page_size: self.page_size.max(1),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Reads a config file. `Ok(None)` means the file does not exist.
pub(crate) fn load(path: &Path) -> anyhow::Result<Option<AppConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    };
    let config = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(Some(config))
}
