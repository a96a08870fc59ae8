//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development. The Strava access token
//! is not configuration: it arrives with every request.

use crate::services::cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use crate::services::fetcher::{RetryPolicy, STRAVA_API_URL};
use crate::services::ftp::{CalibrationError, FtpCalendar};
use chrono::NaiveDate;
use std::env;
use std::time::Duration;

/// First day included in load tables unless `ANALYSIS_START` says otherwise.
pub const DEFAULT_ANALYSIS_START: &str = "2022-01-01";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava API base URL
    pub strava_api_url: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,

    // --- Retrieval ---
    /// Attempts per request while rate limited (including the first)
    pub retry_attempts: u32,
    /// Delay between rate-limited attempts on profile/stats/listing endpoints
    pub retry_delay: Duration,
    /// Delay between rate-limited attempts on stream endpoints
    pub stream_retry_delay: Duration,
    pub activities_page_size: u32,
    /// Stream requests in flight per batch
    pub stream_concurrency: usize,
    /// Memoize successful Strava payloads per token and parameters
    pub cache_responses: bool,
    /// How long a memoized payload is served
    pub cache_ttl: Duration,
    pub cache_capacity: usize,

    // --- Analytics ---
    pub analysis_start: NaiveDate,
    pub ftp_calendar: FtpCalendar,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_api_url: STRAVA_API_URL.to_string(),
            frontend_url: "http://localhost:8501".to_string(),
            port: 8080,
            retry_attempts: 5,
            retry_delay: Duration::ZERO,
            stream_retry_delay: Duration::ZERO,
            activities_page_size: 200,
            stream_concurrency: 1,
            cache_responses: false,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            analysis_start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            ftp_calendar: FtpCalendar::default(),
        }
    }
}

impl Config {
    /// Config for tests: no retry delays, no caching.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let analysis_start_raw =
            env::var("ANALYSIS_START").unwrap_or_else(|_| DEFAULT_ANALYSIS_START.to_string());
        let analysis_start = NaiveDate::parse_from_str(analysis_start_raw.trim(), "%Y-%m-%d")
            .map_err(|_| ConfigError::Invalid {
                var: "ANALYSIS_START",
                reason: format!("'{}' is not a YYYY-MM-DD date", analysis_start_raw),
            })?;

        let ftp_calendar = match env::var("FTP_CALIBRATION") {
            Ok(raw) => FtpCalendar::parse(&raw)?,
            Err(_) => FtpCalendar::default(),
        };

        Ok(Self {
            strava_api_url: env::var("STRAVA_API_URL")
                .unwrap_or_else(|_| STRAVA_API_URL.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8501".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            retry_attempts: parse_or("STRAVA_RETRY_ATTEMPTS", 5)?,
            retry_delay: Duration::from_secs(parse_or("STRAVA_RETRY_DELAY_SECS", 10)?),
            stream_retry_delay: Duration::from_secs(parse_or(
                "STRAVA_STREAM_RETRY_DELAY_SECS",
                60,
            )?),
            activities_page_size: parse_or("ACTIVITIES_PAGE_SIZE", 200)?,
            stream_concurrency: parse_or("STREAM_CONCURRENCY", 1)?,
            cache_responses: parse_or("CACHE_RESPONSES", true)?,
            cache_ttl: Duration::from_secs(parse_or(
                "CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL.as_secs(),
            )?),
            cache_capacity: parse_or("CACHE_MAX_ENTRIES", DEFAULT_CACHE_CAPACITY)?,
            analysis_start,
            ftp_calendar,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            standard_delay: self.retry_delay,
            stream_delay: self.stream_retry_delay,
        }
    }
}

/// Read `var`, falling back to `default` when unset. A set but unparsable
/// value is an error rather than silently ignored.
fn parse_or<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            reason: format!("cannot parse '{}'", raw),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Invalid FTP_CALIBRATION: {0}")]
    Calibration(#[from] CalibrationError),
}
