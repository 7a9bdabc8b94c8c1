use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{PickError, Result};
use crate::policy::{FallbackMode, ResponseMode, SelectionPolicy};

/// Label used for filenames and messages when no subreddit is known at all.
pub const FALLBACK_LABEL: &str = "reddit";

/// Settings recognised by the bot, as found in its configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickConfig {
    /// Command keyword the chat layer listens for.
    #[serde(default = "default_trigger")]
    pub trigger: String,
    #[serde(default)]
    pub default_subreddit: String,
    #[serde(default = "default_response_type")]
    pub response_type: ResponseMode,
    #[serde(default)]
    pub fallback: FallbackMode,
    /// Bound on random draws per selection.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default)]
    pub allow_nsfw: bool,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default)]
    pub feed: FeedSettings,
}

/// Where and how the listing is fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Prefix for the site-relative permalinks found in listings.
    #[serde(default = "default_permalink_base")]
    pub permalink_base: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        FeedSettings {
            api_base: default_api_base(),
            permalink_base: default_permalink_base(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PickConfig {
    fn default() -> Self {
        PickConfig {
            trigger: default_trigger(),
            default_subreddit: String::new(),
            response_type: default_response_type(),
            fallback: FallbackMode::None,
            retries: default_retries(),
            allow_nsfw: false,
            allowed_extensions: default_allowed_extensions(),
            feed: FeedSettings::default(),
        }
    }
}

impl PickConfig {
    pub fn trace_loaded(&self) {
        info!(
            trigger = %self.trigger,
            default_subreddit = %self.default_subreddit,
            response_type = %self.response_type,
            fallback = ?self.fallback,
            retries = self.retries,
            allow_nsfw = self.allow_nsfw,
            "Loaded PickConfig"
        );
        debug!(?self, "PickConfig loaded (full debug)");
    }

    /// Whether upload mode can run, as the primary mode or as the fallback.
    pub fn upload_reachable(&self) -> bool {
        self.response_type.requires_file() || self.fallback == FallbackMode::Upload
    }

    /// Validate and build the policy every selection call receives.
    pub fn selection_policy(&self) -> Result<SelectionPolicy> {
        if self.retries == 0 {
            error!(retries = self.retries, "retries must be at least 1");
            return Err(PickError::Config("retries must be at least 1".to_string()));
        }
        if self.upload_reachable() && self.allowed_extensions.is_empty() {
            error!("upload mode configured without any allowed extensions");
            return Err(PickError::Config(
                "allowed_extensions must not be empty when upload mode is used".to_string(),
            ));
        }
        Ok(SelectionPolicy::new(
            self.response_type,
            self.fallback,
            self.allow_nsfw,
            self.retries,
            &self.allowed_extensions,
        ))
    }

    /// The subreddit asked for, else the configured default, else [`FALLBACK_LABEL`].
    pub fn label_for<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| Some(self.default_subreddit.trim()).filter(|s| !s.is_empty()))
            .unwrap_or(FALLBACK_LABEL)
    }
}

fn default_trigger() -> String {
    "reddit".to_string()
}

fn default_response_type() -> ResponseMode {
    ResponseMode::LinkMessage
}

fn default_retries() -> u32 {
    5
}

fn default_allowed_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "mp4", "mov"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_api_base() -> String {
    "https://api.reddit.com".to_string()
}

fn default_permalink_base() -> String {
    "https://reddit.com".to_string()
}

fn default_user_agent() -> String {
    format!("reddit-pick/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: PickConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PickConfig::default());
        assert_eq!(config.retries, 5);
        assert_eq!(config.feed.api_base, "https://api.reddit.com");
    }

    #[test]
    fn zero_retries_is_rejected() {
        let config = PickConfig {
            retries: 0,
            ..PickConfig::default()
        };
        assert!(matches!(
            config.selection_policy(),
            Err(PickError::Config(_))
        ));
    }

    #[test]
    fn upload_without_extensions_is_rejected() {
        let config = PickConfig {
            response_type: ResponseMode::Upload,
            allowed_extensions: vec![],
            ..PickConfig::default()
        };
        assert!(config.selection_policy().is_err());
    }

    #[test]
    fn upload_is_reachable_through_primary_or_fallback() {
        let mut config = PickConfig::default();
        assert!(!config.upload_reachable());
        config.fallback = FallbackMode::Upload;
        assert!(config.upload_reachable());
        config.fallback = FallbackMode::LinkReply;
        config.response_type = ResponseMode::Upload;
        assert!(config.upload_reachable());
    }

    #[test]
    fn label_prefers_request_then_default() {
        let mut config = PickConfig::default();
        assert_eq!(config.label_for(None), "reddit");
        assert_eq!(config.label_for(Some("  ")), "reddit");
        config.default_subreddit = "aww".to_string();
        assert_eq!(config.label_for(None), "aww");
        assert_eq!(config.label_for(Some("pics")), "pics");
    }
}
