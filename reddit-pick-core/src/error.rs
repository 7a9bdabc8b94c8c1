//! Error taxonomy for one pick invocation.
//!
//! Selection outcomes that are expected in normal operation (nothing eligible,
//! adult content blocked) are ordinary variants here, returned through `Result`
//! like every other failure. The fallback step inspects them with
//! [`PickError::is_recoverable_by_fallback`].

use crate::policy::ResponseMode;

/// Boxed error returned by collaborator implementations (transport, content store).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, PickError>;

#[derive(Debug, thiserror::Error)]
pub enum PickError {
    /// Feed or media host answered with a non-success status, or could not be reached.
    #[error("upstream request to {url} failed: {reason}")]
    Upstream { url: String, reason: String },

    /// Listing body was not the expected JSON shape.
    #[error("could not parse listing: {0}")]
    Parse(String),

    #[error("no eligible post found after {attempts} attempts in {mode} mode")]
    NoEligibleCandidate { attempts: u32, mode: ResponseMode },

    #[error("found a post but it is marked NSFW and NSFW posts are not allowed")]
    AdultContentBlocked { permalink: String },

    /// Primary selection failed and the single fallback attempt failed as well.
    #[error("fallback to {mode} mode failed as well")]
    FallbackExhausted {
        mode: ResponseMode,
        #[source]
        source: Box<PickError>,
    },

    #[error("content store rejected upload of {filename}: {reason}")]
    Upload { filename: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Internal contract broken. Always a defect.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl PickError {
    pub fn upstream(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        PickError::Upstream {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether re-running selection under another response mode may succeed.
    pub fn is_recoverable_by_fallback(&self) -> bool {
        matches!(
            self,
            PickError::NoEligibleCandidate { .. } | PickError::AdultContentBlocked { .. }
        )
    }

    /// Text suitable for showing to the chat user who triggered the invocation.
    pub fn user_message(&self) -> String {
        match self {
            PickError::NoEligibleCandidate { .. } => {
                "i tried several times, but failed. sorry.".to_string()
            }
            PickError::AdultContentBlocked { .. } => {
                "found one, but it is marked NSFW and that is not allowed here.".to_string()
            }
            PickError::FallbackExhausted { source, .. } => source.user_message(),
            PickError::Upstream { .. } | PickError::Parse(_) => {
                format!("Something went wrong: {self}")
            }
            PickError::Upload { .. } => format!("Could not upload the media: {self}"),
            PickError::Config(reason) => {
                format!("something is wrong with my config: {reason}")
            }
            PickError::InvariantViolation(_) => {
                "something went wrong on my side, sorry.".to_string()
            }
        }
    }
}
