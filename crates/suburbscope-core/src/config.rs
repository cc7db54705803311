//! Process configuration, read once from the environment at startup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::eligibility::{EligibilityClassifier, FixedDecision, PartitionRule, SourceDecision};
use crate::{Region, SuburbId, ValidationError};

pub const DEFAULT_BASE_URL: &str = "https://www.microburbs.com.au/report_generator/api";
pub const DEFAULT_TOKEN: &str = "test";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;

/// Connection settings for the live provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveApiSettings {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl Default for LiveApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            token: DEFAULT_TOKEN.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub live: LiveApiSettings,
    /// Forces every routing decision to the fixture path.
    pub use_mock_data: bool,
    pub data_dir: PathBuf,
    pub live_regions: Vec<Region>,
    pub live_suburbs: Vec<SuburbId>,
    pub max_retries: u32,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            live: LiveApiSettings::default(),
            use_mock_data: false,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            live_regions: vec![Region::Nsw],
            live_suburbs: Vec::new(),
            max_retries: 0,
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
        }
    }
}

impl Settings {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let mut settings = Self::default();

        if let Some(base_url) = read("MICROBURBS_API_BASE_URL") {
            settings.live.base_url = base_url;
        }
        if let Some(token) = read("MICROBURBS_API_TOKEN") {
            settings.live.token = token;
        }
        if let Some(raw) = read("API_TIMEOUT") {
            let seconds = raw
                .parse::<u64>()
                .ok()
                .filter(|seconds| *seconds > 0)
                .ok_or(ValidationError::InvalidSetting {
                    name: "API_TIMEOUT",
                    value: raw,
                })?;
            settings.live.timeout = Duration::from_secs(seconds);
        }
        if let Some(raw) = read("USE_MOCK_DATA") {
            settings.use_mock_data = parse_flag("USE_MOCK_DATA", &raw)?;
        }
        if let Some(data_dir) = read("DATA_DIR") {
            settings.data_dir = PathBuf::from(data_dir);
        }
        if let Some(raw) = read("LIVE_REGIONS") {
            settings.live_regions = split_list(&raw)
                .map(str::parse::<Region>)
                .collect::<Result<_, _>>()?;
        }
        if let Some(raw) = read("LIVE_SUBURBS") {
            settings.live_suburbs = split_list(&raw)
                .map(SuburbId::parse)
                .collect::<Result<_, _>>()?;
        }
        if let Some(raw) = read("RESOLVER_MAX_RETRIES") {
            settings.max_retries = raw.parse().map_err(|_| ValidationError::InvalidSetting {
                name: "RESOLVER_MAX_RETRIES",
                value: raw.clone(),
            })?;
        }
        if let Some(host) = read("HOST") {
            settings.host = host;
        }
        if let Some(raw) = read("PORT") {
            settings.port = raw.parse().map_err(|_| ValidationError::InvalidSetting {
                name: "PORT",
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = read("CORS_ORIGINS") {
            settings.cors_origins = split_list(&raw).map(str::to_owned).collect();
        }

        Ok(settings)
    }

    pub fn partition_rule(&self) -> PartitionRule {
        PartitionRule::new(self.live_regions.clone(), self.live_suburbs.clone())
    }

    /// Classifier the resolver should use; the mock-data override wins.
    pub fn classifier(&self) -> Arc<dyn EligibilityClassifier> {
        if self.use_mock_data {
            Arc::new(FixedDecision(SourceDecision::Fallback))
        } else {
            Arc::new(self.partition_rule())
        }
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ValidationError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ValidationError::InvalidSetting {
            name,
            value: raw.to_owned(),
        }),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}
