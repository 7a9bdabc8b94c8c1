//! Listing fetcher: one GET against the feed API, status check, JSON parse.
//!
//! No retries happen here. Empty or unsuitable listings are the selector's
//! concern; a bad status or a malformed body aborts the invocation.

use serde::Deserialize;
use tracing::{error, info};

use crate::config::FeedSettings;
use crate::contract::Transport;
use crate::error::{PickError, Result};

/// One post as seen by the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEntry {
    pub is_pinned: bool,
    pub is_stickied: bool,
    pub is_adult: bool,
    pub media_url: String,
    /// Absolute link to the post's discussion page. Empty if the feed omitted it.
    pub permalink: String,
}

/// Entries of one listing page, in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub entries: Vec<PostEntry>,
}

impl ListingPage {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Wire shape: { data: { children: [ { data: { ... } } ] } }
#[derive(Deserialize)]
struct RawListing {
    data: RawListingData,
}

#[derive(Deserialize)]
struct RawListingData {
    children: Vec<RawChild>,
}

#[derive(Deserialize)]
struct RawChild {
    data: RawPost,
}

#[derive(Deserialize)]
struct RawPost {
    #[serde(default)]
    stickied: bool,
    #[serde(default)]
    pinned: bool,
    #[serde(default)]
    over_18: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
}

/// Prefix `r/` unless the path already starts with it. Leading slashes are dropped.
pub fn resource_path(subreddit_or_path: &str) -> String {
    let trimmed = subreddit_or_path.trim().trim_start_matches('/');
    if trimmed.starts_with("r/") {
        trimmed.to_string()
    } else {
        format!("r/{trimmed}")
    }
}

/// Subreddit segment of a name or `r/`-style path: `r/pics/top` → `pics`.
pub fn subreddit_name(subreddit_or_path: &str) -> &str {
    let trimmed = subreddit_or_path.trim().trim_start_matches('/');
    let rest = trimmed.strip_prefix("r/").unwrap_or(trimmed);
    rest.split('/').next().filter(|s| !s.is_empty()).unwrap_or(rest)
}

pub fn listing_url(feed: &FeedSettings, subreddit_or_path: &str) -> String {
    format!(
        "{}/{}",
        feed.api_base.trim_end_matches('/'),
        resource_path(subreddit_or_path)
    )
}

fn absolute_permalink(permalink_base: &str, permalink: &str) -> String {
    if permalink.is_empty() || permalink.starts_with("http://") || permalink.starts_with("https://")
    {
        permalink.to_string()
    } else {
        format!(
            "{}/{}",
            permalink_base.trim_end_matches('/'),
            permalink.trim_start_matches('/')
        )
    }
}

/// Parse a listing body. Permalinks are made absolute against `permalink_base`.
pub fn parse_listing(body: &[u8], permalink_base: &str) -> Result<ListingPage> {
    let raw: RawListing = serde_json::from_slice(body).map_err(|e| {
        error!(error = %e, "Listing body is not a well-formed listing");
        PickError::Parse(e.to_string())
    })?;

    let entries = raw
        .data
        .children
        .into_iter()
        .map(|child| PostEntry {
            is_pinned: child.data.pinned,
            is_stickied: child.data.stickied,
            is_adult: child.data.over_18,
            media_url: child.data.url.unwrap_or_default(),
            permalink: absolute_permalink(
                permalink_base,
                child.data.permalink.as_deref().unwrap_or_default(),
            ),
        })
        .collect();

    Ok(ListingPage { entries })
}

/// Fetch and parse the listing for a subreddit name or `r/`-style resource path.
pub async fn fetch_listing<T>(
    transport: &T,
    feed: &FeedSettings,
    subreddit_or_path: &str,
) -> Result<ListingPage>
where
    T: Transport + ?Sized,
{
    let url = listing_url(feed, subreddit_or_path);
    info!(url = %url, "[FETCH] Requesting listing");

    let response = transport.get(&url).await.map_err(|e| {
        error!(url = %url, error = %e, "[FETCH][ERROR] Listing request failed");
        PickError::upstream(&url, e)
    })?;

    if !response.is_success() {
        error!(url = %url, status = response.status, "[FETCH][ERROR] Feed API returned error status");
        return Err(PickError::upstream(
            &url,
            format!("status {}", response.status),
        ));
    }

    let listing = parse_listing(&response.body, &feed.permalink_base)?;
    info!(url = %url, entries = listing.len(), "[FETCH] Listing parsed");
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_path_adds_prefix_once() {
        assert_eq!(resource_path("pics"), "r/pics");
        assert_eq!(resource_path("r/pics"), "r/pics");
        assert_eq!(resource_path("/r/pics/top"), "r/pics/top");
    }

    #[test]
    fn subreddit_name_takes_first_path_segment() {
        assert_eq!(subreddit_name("pics"), "pics");
        assert_eq!(subreddit_name("r/pics/top"), "pics");
        assert_eq!(subreddit_name("/r/aww/"), "aww");
        assert_eq!(subreddit_name("earthporn/new"), "earthporn");
    }

    #[test]
    fn listing_url_joins_without_double_slash() {
        let feed = FeedSettings {
            api_base: "https://api.reddit.com/".to_string(),
            ..FeedSettings::default()
        };
        assert_eq!(listing_url(&feed, "aww"), "https://api.reddit.com/r/aww");
    }

    #[test]
    fn parse_fills_missing_flags_and_absolutises_permalinks() {
        let body = br#"{"data":{"children":[
            {"data":{"stickied":true,"url":"https://i.redd.it/a.png","permalink":"/r/pics/comments/1/a/"}},
            {"data":{"over_18":true,"pinned":true,"permalink":"https://reddit.com/r/pics/comments/2/b/"}},
            {"data":{}}
        ]}}"#;
        let listing = parse_listing(body, "https://reddit.com").unwrap();
        assert_eq!(listing.len(), 3);
        assert!(listing.entries[0].is_stickied);
        assert!(!listing.entries[0].is_pinned);
        assert_eq!(
            listing.entries[0].permalink,
            "https://reddit.com/r/pics/comments/1/a/"
        );
        assert!(listing.entries[1].is_adult && listing.entries[1].is_pinned);
        assert_eq!(
            listing.entries[1].permalink,
            "https://reddit.com/r/pics/comments/2/b/"
        );
        assert_eq!(listing.entries[2].media_url, "");
        assert_eq!(listing.entries[2].permalink, "");
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        assert!(matches!(
            parse_listing(br#"{"kind":"Listing"}"#, "https://reddit.com"),
            Err(PickError::Parse(_))
        ));
        assert!(matches!(
            parse_listing(b"<html>", "https://reddit.com"),
            Err(PickError::Parse(_))
        ));
    }
}
