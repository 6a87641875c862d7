// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8090";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_RECONNECT_INITIAL_MS: u64 = 1_000;
pub const DEFAULT_RECONNECT_MAX_MS: u64 = 30_000;

const ENV_BASE_URL: &str = "STOCKNOTE_API_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "STOCKNOTE_TIMEOUT_SECS";
const ENV_RECONNECT_INITIAL_MS: &str = "STOCKNOTE_RECONNECT_INITIAL_MS";
const ENV_RECONNECT_MAX_MS: &str = "STOCKNOTE_RECONNECT_MAX_MS";

/// Delay bounds for re-opening a dropped notification stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(DEFAULT_RECONNECT_INITIAL_MS),
            max: Duration::from_millis(DEFAULT_RECONNECT_MAX_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(&url);
        }
        if let Some(secs) = parse_u64(&lookup, ENV_TIMEOUT_SECS) {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_u64(&lookup, ENV_RECONNECT_INITIAL_MS) {
            config.reconnect.initial = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_u64(&lookup, ENV_RECONNECT_MAX_MS) {
            config.reconnect.max = Duration::from_millis(ms);
        }
        if config.reconnect.max < config.reconnect.initial {
            log::warn!(
                "{} is below {}; using {:?} for both",
                ENV_RECONNECT_MAX_MS,
                ENV_RECONNECT_INITIAL_MS,
                config.reconnect.initial
            );
            config.reconnect.max = config.reconnect.initial;
        }
        config
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        let trimmed = url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            log::warn!("Ignoring empty API base URL; keeping {}", self.base_url);
        } else {
            self.base_url = trimmed.to_string();
        }
        self
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => {
            log::warn!("Invalid value '{}' for {}; using default", raw, key);
            None
        }
        Ok(v) => Some(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, "http://localhost:8090");
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn reads_overrides_and_trims_trailing_slash() {
        let config = Config::from_lookup(lookup_from(&[
            ("STOCKNOTE_API_BASE_URL", " https://api.stocknote.dev/ "),
            ("STOCKNOTE_TIMEOUT_SECS", "5"),
            ("STOCKNOTE_RECONNECT_INITIAL_MS", "250"),
            ("STOCKNOTE_RECONNECT_MAX_MS", "4000"),
        ]));
        assert_eq!(config.base_url, "https://api.stocknote.dev");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.reconnect.initial, Duration::from_millis(250));
        assert_eq!(config.reconnect.max, Duration::from_millis(4000));
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("STOCKNOTE_TIMEOUT_SECS", "soon"),
            ("STOCKNOTE_RECONNECT_INITIAL_MS", "0"),
        ]));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(
            config.reconnect.initial,
            Duration::from_millis(DEFAULT_RECONNECT_INITIAL_MS)
        );
    }

    #[test]
    fn reconnect_max_never_below_initial() {
        let config = Config::from_lookup(lookup_from(&[
            ("STOCKNOTE_RECONNECT_INITIAL_MS", "5000"),
            ("STOCKNOTE_RECONNECT_MAX_MS", "100"),
        ]));
        assert_eq!(config.reconnect.max, Duration::from_millis(5000));
    }

    #[test]
    fn empty_base_url_is_ignored() {
        let config = Config::default().with_base_url("  / ");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
