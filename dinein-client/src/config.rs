//! Client configuration

use chrono::FixedOffset;
use shared::money::TaxConfig;
use std::path::PathBuf;

use crate::error::{ClientError, ClientResult};
use crate::reconciler::ReconcilePolicy;

/// Client configuration
///
/// # Environment variables
///
/// | variable | default | meaning |
/// |----------|---------|---------|
/// | API_BASE_URL | http://localhost:3000 | REST backend |
/// | API_TOKEN | - | bearer token |
/// | REQUEST_TIMEOUT_SECS | 30 | HTTP timeout |
/// | TAX_RATE | 0 | proportional tax rate |
/// | TAX_FIXED_FEE | 0 | fixed tax fee |
/// | UTC_OFFSET_MINUTES | 0 | restaurant local-day offset |
/// | RECONCILE_POLICY | last_write_wins | or `monotonic` |
/// | SESSION_DIR | ./.dinein | file session store directory |
/// | LOG_LEVEL | info | default log level |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:3000")
    pub base_url: String,
    /// Bearer token for authentication
    pub token: Option<String>,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Tax formula used for local total checks
    pub tax: TaxConfig,
    /// Restaurant local-day offset from UTC, in minutes
    pub utc_offset_minutes: i32,
    /// How real-time updates are merged into cached orders
    pub reconcile_policy: ReconcilePolicy,
    /// Directory of the file session store
    pub session_dir: PathBuf,
    /// Default log level when RUST_LOG is unset
    pub log_level: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
            tax: TaxConfig::default(),
            utc_offset_minutes: 0,
            reconcile_policy: ReconcilePolicy::default(),
            session_dir: PathBuf::from("./.dinein"),
            log_level: "info".to_string(),
        }
    }

    /// Load configuration from the environment (and a `.env` file if present)
    ///
    /// Missing or unparseable values fall back to defaults, except
    /// `RECONCILE_POLICY` which must name a known policy.
    pub fn from_env() -> ClientResult<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::new(
            std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into()),
        );
        config.token = std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty());
        config.timeout = env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(30);
        config.tax = TaxConfig::new(
            env_parse("TAX_RATE").unwrap_or(0.0),
            env_parse("TAX_FIXED_FEE").unwrap_or(0.0),
        );
        config.utc_offset_minutes = env_parse("UTC_OFFSET_MINUTES").unwrap_or(0);
        if let Ok(policy) = std::env::var("RECONCILE_POLICY") {
            config.reconcile_policy = policy.parse()?;
        }
        if let Ok(dir) = std::env::var("SESSION_DIR") {
            config.session_dir = PathBuf::from(dir);
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }
        Ok(config)
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_tax(mut self, tax: TaxConfig) -> Self {
        self.tax = tax;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn with_reconcile_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.reconcile_policy = policy;
        self
    }

    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = dir.into();
        self
    }

    /// Restaurant local-day offset as a chrono offset
    pub fn local_offset(&self) -> ClientResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ClientError::Config(format!(
                "UTC offset out of range: {} minutes",
                self.utc_offset_minutes
            ))
        })
    }

    /// Create an HTTP API client from this configuration
    pub fn build_http_client(&self) -> ClientResult<crate::api::HttpApiClient> {
        crate::api::HttpApiClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
