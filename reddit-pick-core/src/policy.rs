//! Response modes and the selection policy handed to every selection call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How the picked post is delivered to the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseMode {
    /// Post the permalink as a plain message.
    #[serde(rename = "message", alias = "link-message")]
    LinkMessage,
    /// Post the permalink as a threaded reply to the trigger.
    #[serde(rename = "reply", alias = "link-reply")]
    LinkReply,
    /// Download the media and re-upload it to the content store.
    #[serde(rename = "upload")]
    Upload,
}

impl ResponseMode {
    pub fn requires_file(self) -> bool {
        matches!(self, ResponseMode::Upload)
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseMode::LinkMessage => "message",
            ResponseMode::LinkReply => "reply",
            ResponseMode::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// Alternate mode tried once when the primary mode finds nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FallbackMode {
    #[serde(rename = "message", alias = "link-message")]
    LinkMessage,
    #[serde(rename = "reply", alias = "link-reply")]
    LinkReply,
    #[serde(rename = "upload")]
    Upload,
    #[default]
    #[serde(rename = "none")]
    None,
}

impl FallbackMode {
    pub fn as_mode(self) -> Option<ResponseMode> {
        match self {
            FallbackMode::LinkMessage => Some(ResponseMode::LinkMessage),
            FallbackMode::LinkReply => Some(ResponseMode::LinkReply),
            FallbackMode::Upload => Some(ResponseMode::Upload),
            FallbackMode::None => None,
        }
    }
}

/// Per-invocation selection settings. Built once from [`crate::config::PickConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub response_mode: ResponseMode,
    pub fallback_mode: FallbackMode,
    pub allow_adult: bool,
    /// Always at least 1.
    pub max_attempts: u32,
    /// Stored lower-cased.
    allowed_media_extensions: BTreeSet<String>,
}

impl SelectionPolicy {
    pub fn new<I, S>(
        response_mode: ResponseMode,
        fallback_mode: FallbackMode,
        allow_adult: bool,
        max_attempts: u32,
        allowed_media_extensions: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SelectionPolicy {
            response_mode,
            fallback_mode,
            allow_adult,
            max_attempts: max_attempts.max(1),
            allowed_media_extensions: allowed_media_extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Case-insensitive membership test.
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_media_extensions
            .contains(&extension.to_ascii_lowercase())
    }
}

/// Extension of the file a media URL points at, lower-cased.
///
/// Uses the URL path when the string parses as a URL, so query strings and
/// fragments never leak into the extension.
pub fn media_extension(media_url: &str) -> Option<String> {
    let parsed = url::Url::parse(media_url).ok();
    let path = parsed.as_ref().map(|u| u.path()).unwrap_or(media_url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = file.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// MIME type announced to the content store for a media extension.
pub fn mime_type_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}
