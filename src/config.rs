use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::WmfResult;

/// What the interpreter does after a record fails to decode or replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Record the failure and keep going.
    #[default]
    Continue,
    /// Abort the session with the first failure.
    Stop,
}

/// Per-session replay and output settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplaySettings {
    /// Output width in pixels; height follows the aspect ratio when unset.
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Multiplier over the natural size when neither dimension is given.
    pub scale: f64,
    /// Straight RGBA clear color; `None` leaves the surface transparent.
    pub clear_rgba: Option<[u8; 4]>,
    pub on_error: ErrorPolicy,
    /// Stop after this many records.
    pub max_records: Option<usize>,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            scale: 1.0,
            clear_rgba: Some([255, 255, 255, 255]),
            on_error: ErrorPolicy::Continue,
            max_records: None,
        }
    }
}

impl ReplaySettings {
    pub fn from_json_str(s: &str) -> WmfResult<Self> {
        let settings: Self = serde_json::from_str(s).context("parse replay settings")?;
        Ok(settings)
    }

    pub fn from_json_path(path: &Path) -> WmfResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Apply `WMF_REPLAY_MAX_RECORDS` and `WMF_REPLAY_STOP_ON_ERROR`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var("WMF_REPLAY_MAX_RECORDS").ok().as_deref(),
            std::env::var("WMF_REPLAY_STOP_ON_ERROR").ok().as_deref(),
        )
    }

    fn with_overrides(mut self, max_records: Option<&str>, stop_on_error: Option<&str>) -> Self {
        if let Some(n) = max_records
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            self.max_records = Some(n);
        }
        match stop_on_error.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("1" | "true" | "yes") => self.on_error = ErrorPolicy::Stop,
            Some("0" | "false" | "no") => self.on_error = ErrorPolicy::Continue,
            _ => {}
        }
        self
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
