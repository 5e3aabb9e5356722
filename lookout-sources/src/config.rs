//! Source configuration with the upstream sites as defaults.
//!
//! [`SourceConfig`] controls the transport (timeout, User-Agent) and the
//! base URL of every site. Base URLs are only overridden in tests or when
//! pointing at a mirror; the path and query layout of each site is fixed.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SourceError;

/// Base URLs for every integrated site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteUrls {
    pub gamekult: String,
    pub gamekyo: String,
    pub smashing_magazine: String,
    pub tatoeba: String,
    pub howlongtobeat: String,
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            gamekult: "https://www.gamekult.com".into(),
            gamekyo: "https://www.gamekyo.com".into(),
            smashing_magazine: "https://www.smashingmagazine.com".into(),
            tatoeba: "https://tatoeba.org".into(),
            howlongtobeat: "https://howlongtobeat.com".into(),
        }
    }
}

impl SiteUrls {
    /// Point every site at the same base URL. Used by tests with a mock server.
    pub fn all(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            gamekult: base.clone(),
            gamekyo: base.clone(),
            smashing_magazine: base.clone(),
            tatoeba: base.clone(),
            howlongtobeat: base,
        }
    }

    fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("gamekult", &self.gamekult),
            ("gamekyo", &self.gamekyo),
            ("smashing_magazine", &self.smashing_magazine),
            ("tatoeba", &self.tatoeba),
            ("howlongtobeat", &self.howlongtobeat),
        ]
    }
}

/// Configuration shared by every source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Per-request timeout in seconds. `None` keeps the transport default,
    /// which has no overall deadline.
    pub timeout_seconds: Option<u64>,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of browser User-Agents.
    pub user_agent: Option<String>,
    /// Site base URLs.
    pub urls: SiteUrls,
}

impl SourceConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds`, when set, must be greater than 0
    /// - `user_agent`, when set, must not be blank
    /// - every base URL must be an absolute http(s) URL
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.timeout_seconds == Some(0) {
            return Err(SourceError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if let Some(ref ua) = self.user_agent {
            if ua.trim().is_empty() {
                return Err(SourceError::Config("user_agent must not be blank".into()));
            }
        }
        for (site, base) in self.urls.entries() {
            let parsed = Url::parse(base)
                .map_err(|e| SourceError::Config(format!("invalid {site} url {base:?}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(SourceError::Config(format!(
                    "{site} url must use http or https"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SourceConfig::default();
        assert!(config.timeout_seconds.is_none());
        assert!(config.user_agent.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_urls_point_at_upstream_sites() {
        let urls = SiteUrls::default();
        assert_eq!(urls.gamekult, "https://www.gamekult.com");
        assert_eq!(urls.gamekyo, "https://www.gamekyo.com");
        assert_eq!(urls.smashing_magazine, "https://www.smashingmagazine.com");
        assert_eq!(urls.tatoeba, "https://tatoeba.org");
        assert_eq!(urls.howlongtobeat, "https://howlongtobeat.com");
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SourceConfig {
            timeout_seconds: Some(0),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn blank_user_agent_rejected() {
        let config = SourceConfig {
            user_agent: Some("  ".into()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("user_agent"));
    }

    #[test]
    fn relative_url_rejected() {
        let mut config = SourceConfig::default();
        config.urls.tatoeba = "tatoeba.org".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tatoeba"));
    }

    #[test]
    fn non_http_scheme_rejected() {
        let mut config = SourceConfig::default();
        config.urls.gamekyo = "ftp://www.gamekyo.com".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn all_strips_trailing_slash() {
        let urls = SiteUrls::all("http://127.0.0.1:4000/");
        assert_eq!(urls.gamekult, "http://127.0.0.1:4000");
        assert_eq!(urls.howlongtobeat, "http://127.0.0.1:4000");
    }
}
