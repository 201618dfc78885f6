use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub backend_url: String,
    /// 0 disables the per-fetch timeout.
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub default_series: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            fetch_timeout_secs: 30,
            user_agent: "EconDashboard/1.0".to_string(),
            default_series: vec!["GDP".to_string(), "UNRATE".to_string()],
        }
    }
}

impl Settings {
    /// Load settings from the process environment (and a `.env` file if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(url) = lookup("ECONDATA_BACKEND_URL").filter(|v| !v.trim().is_empty()) {
            settings.backend_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("ECONDATA_TIMEOUT_SECS") {
            settings.fetch_timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("ECONDATA_TIMEOUT_SECS must be a whole number of seconds, got '{}'", raw))?;
        }

        if let Some(agent) = lookup("ECONDATA_USER_AGENT").filter(|v| !v.trim().is_empty()) {
            settings.user_agent = agent;
        }

        if let Some(list) = lookup("ECONDATA_DEFAULT_SERIES") {
            settings.default_series = list
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(settings)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        match self.fetch_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn econdata_url(&self) -> String {
        format!("{}/econdata", self.backend_url.trim_end_matches('/'))
    }
}
