use std::path::PathBuf;
use std::time::Duration;

use serenade_core::media_link::{MediaLinkValidator, DEFAULT_TRUSTED_HOSTS};

/// Fulfillment settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct FulfillmentConfig {
    /// Hosts whose links are accepted without an audio extension.
    pub trusted_media_hosts: Vec<String>,
    /// Poll period of every reconciliation loop.
    pub reconcile_interval: Duration,
    /// How long an unconfirmed optimistic record is kept.
    pub optimistic_timeout: Duration,
    /// Directory uploaded tracks are written to.
    pub media_root: PathBuf,
    /// URL prefix under which `media_root` is served.
    pub media_public_base_url: String,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            trusted_media_hosts: DEFAULT_TRUSTED_HOSTS.iter().map(|h| h.to_string()).collect(),
            reconcile_interval: Duration::from_secs(30),
            optimistic_timeout: Duration::from_secs(120),
            media_root: PathBuf::from("./media"),
            media_public_base_url: "http://localhost:3000/media".to_string(),
        }
    }
}

impl FulfillmentConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                             |
    /// |---------------------------|-------------------------------------|
    /// | `TRUSTED_MEDIA_HOSTS`     | suno.com, suno.ai, soundcloud.com, dropbox.com, drive.google.com |
    /// | `RECONCILE_INTERVAL_SECS` | `30`                                |
    /// | `OPTIMISTIC_TIMEOUT_SECS` | `120`                               |
    /// | `MEDIA_ROOT`              | `./media`                           |
    /// | `MEDIA_PUBLIC_BASE_URL`   | `http://localhost:3000/media`       |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let trusted_media_hosts = match std::env::var("TRUSTED_MEDIA_HOSTS") {
            Ok(raw) => parse_host_list(&raw),
            Err(_) => defaults.trusted_media_hosts,
        };

        let reconcile_interval: u64 = std::env::var("RECONCILE_INTERVAL_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("RECONCILE_INTERVAL_SECS must be a valid u64");

        let optimistic_timeout: u64 = std::env::var("OPTIMISTIC_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("OPTIMISTIC_TIMEOUT_SECS must be a valid u64");

        Self {
            trusted_media_hosts,
            reconcile_interval: Duration::from_secs(reconcile_interval.max(1)),
            optimistic_timeout: Duration::from_secs(optimistic_timeout),
            media_root: std::env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            media_public_base_url: std::env::var("MEDIA_PUBLIC_BASE_URL")
                .unwrap_or(defaults.media_public_base_url),
        }
    }

    pub fn validator(&self) -> MediaLinkValidator {
        MediaLinkValidator::new(&self.trusted_media_hosts)
    }

    /// The optimistic timeout as a chrono duration for the merge.
    pub fn optimistic_timeout_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.optimistic_timeout)
            .unwrap_or_else(|_| chrono::Duration::seconds(120))
    }
}

fn parse_host_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
