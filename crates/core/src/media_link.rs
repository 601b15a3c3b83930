//! Heuristic check on admin-supplied media links.
//!
//! A link is accepted when it points at a known audio file extension or is
//! hosted on a trusted domain. Anything else is downgraded to "needs
//! confirmation" rather than rejected; only an empty link is refused outright.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Audio extensions accepted without confirmation (compared lowercase).
pub const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".ogg", ".m4a", ".flac"];

/// Hosting domains trusted when `TRUSTED_MEDIA_HOSTS` is not configured.
pub const DEFAULT_TRUSTED_HOSTS: &[&str] = &[
    "suno.com",
    "suno.ai",
    "soundcloud.com",
    "dropbox.com",
    "drive.google.com",
];

/// Reason reported for blank input.
pub const EMPTY_LINK_REASON: &str = "empty link";

/// Captures the host of an absolute URL (scheme, optional userinfo, host).
static URL_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)[a-z][a-z0-9+.\-]*://(?:[^@/?#]*@)?([^/?#:]+)").expect("valid regex")
});

/// Outcome of validating a candidate link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum LinkVerdict {
    Accepted(String),
    /// Not recognised; usable only after explicit human confirmation.
    NeedsConfirmation(String),
    /// Unusable even with confirmation.
    Rejected(String),
}

impl LinkVerdict {
    pub fn is_ok(&self) -> bool {
        matches!(self, LinkVerdict::Accepted(_))
    }

    /// Whether a human override may turn this verdict into an acceptance.
    pub fn overridable(&self) -> bool {
        matches!(self, LinkVerdict::NeedsConfirmation(_))
    }

    pub fn reason(&self) -> &str {
        match self {
            LinkVerdict::Accepted(r) | LinkVerdict::NeedsConfirmation(r) | LinkVerdict::Rejected(r) => r,
        }
    }
}

/// Validates media links against the audio-extension list and the trusted
/// host allow-list.
#[derive(Debug, Clone)]
pub struct MediaLinkValidator {
    trusted_hosts: Vec<String>,
}

impl Default for MediaLinkValidator {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED_HOSTS.iter().copied())
    }
}

impl MediaLinkValidator {
    /// Build a validator trusting `hosts` and their subdomains.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let trusted_hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self { trusted_hosts }
    }

    pub fn trusted_hosts(&self) -> &[String] {
        &self.trusted_hosts
    }

    /// Check a candidate link. Pure; no network access.
    pub fn validate(&self, candidate: &str) -> LinkVerdict {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return LinkVerdict::Rejected(EMPTY_LINK_REASON.to_string());
        }

        if let Some(ext) = audio_extension(candidate) {
            return LinkVerdict::Accepted(format!("audio file ({ext})"));
        }

        if let Some(host) = url_host(candidate) {
            if self.is_trusted(&host) {
                return LinkVerdict::Accepted(format!("trusted host ({host})"));
            }
            return LinkVerdict::NeedsConfirmation(format!(
                "host '{host}' is not trusted and the link has no audio extension"
            ));
        }

        LinkVerdict::NeedsConfirmation("not a recognised audio link".to_string())
    }

    fn is_trusted(&self, host: &str) -> bool {
        self.trusted_hosts.iter().any(|trusted| {
            host == trusted
                || host
                    .strip_suffix(trusted.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// The matching audio extension of the link path, ignoring query and fragment.
fn audio_extension(candidate: &str) -> Option<&'static str> {
    let path = candidate
        .split(['?', '#'])
        .next()
        .unwrap_or(candidate)
        .to_lowercase();
    AUDIO_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| path.ends_with(ext))
}

fn url_host(candidate: &str) -> Option<String> {
    URL_HOST_RE
        .captures(candidate)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_lowercase())
}
