//! Candidate filter & selector, plus the fallback coordinator wrapped around it.
//!
//! Each attempt draws one entry uniformly at random, with replacement, so the
//! same entry may come up more than once within a selection. Pinned and
//! stickied entries are discarded and cost one attempt. The adult flag is only
//! evaluated once an otherwise eligible entry has been found; that keeps
//! "nothing found" and "found but blocked" apart for the fallback step.

use tracing::{debug, info, warn};

use crate::contract::Draw;
use crate::error::{PickError, Result};
use crate::listing::{ListingPage, PostEntry};
use crate::policy::{media_extension, mime_type_for, ResponseMode, SelectionPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Link,
    Image,
}

/// The post chosen to become the response.
///
/// For [`ContentKind::Image`], `media_url`, `media_extension` and `mime_type`
/// are always set and the extension is one the policy allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub permalink: String,
    pub media_url: Option<String>,
    pub media_extension: Option<String>,
    pub mime_type: Option<String>,
    pub content_kind: ContentKind,
    /// Mode the candidate was selected under.
    pub mode: ResponseMode,
}

impl Candidate {
    fn link(entry: &PostEntry, mode: ResponseMode) -> Self {
        Candidate {
            permalink: entry.permalink.clone(),
            media_url: Some(entry.media_url.clone()).filter(|u| !u.is_empty()),
            media_extension: None,
            mime_type: None,
            content_kind: ContentKind::Link,
            mode,
        }
    }

    fn image(entry: &PostEntry, extension: String, mode: ResponseMode) -> Self {
        Candidate {
            permalink: entry.permalink.clone(),
            media_url: Some(entry.media_url.clone()),
            mime_type: Some(mime_type_for(&extension).to_string()),
            media_extension: Some(extension),
            content_kind: ContentKind::Image,
            mode,
        }
    }
}

fn eligible_extension(entry: &PostEntry, policy: &SelectionPolicy) -> Option<String> {
    media_extension(&entry.media_url).filter(|ext| policy.allows_extension(ext))
}

/// Pick one candidate from `listing` for `mode`, using at most `policy.max_attempts` draws.
pub fn select<D>(
    listing: &ListingPage,
    policy: &SelectionPolicy,
    mode: ResponseMode,
    draw: &mut D,
) -> Result<Candidate>
where
    D: Draw + ?Sized,
{
    let mut attempts = 0u32;
    let mut found: Option<(&PostEntry, Candidate)> = None;

    if !listing.is_empty() {
        while attempts < policy.max_attempts {
            attempts += 1;
            let index = draw.draw(listing.len());
            let Some(entry) = listing.entries.get(index) else {
                warn!(index, len = listing.len(), "Draw returned an index outside the listing");
                continue;
            };

            if entry.is_pinned || entry.is_stickied {
                debug!(attempt = attempts, index, "[SELECT] Skipping pinned/stickied entry");
                continue;
            }

            let candidate = if mode.requires_file() {
                match eligible_extension(entry, policy) {
                    Some(extension) => Candidate::image(entry, extension, mode),
                    None => {
                        debug!(
                            attempt = attempts,
                            index,
                            media_url = %entry.media_url,
                            "[SELECT] Media extension not allowed for upload"
                        );
                        continue;
                    }
                }
            } else if entry.permalink.is_empty() {
                debug!(attempt = attempts, index, "[SELECT] Entry has no permalink");
                continue;
            } else {
                Candidate::link(entry, mode)
            };

            found = Some((entry, candidate));
            break;
        }
    }

    let Some((entry, candidate)) = found else {
        info!(attempts, mode = %mode, "[SELECT] No eligible entry found");
        return Err(PickError::NoEligibleCandidate { attempts, mode });
    };

    if entry.is_adult && !policy.allow_adult {
        info!(attempts, permalink = %entry.permalink, "[SELECT] Eligible entry blocked by NSFW policy");
        return Err(PickError::AdultContentBlocked {
            permalink: entry.permalink.clone(),
        });
    }

    info!(
        attempts,
        mode = %mode,
        kind = ?candidate.content_kind,
        permalink = %candidate.permalink,
        "[SELECT] Candidate selected"
    );
    Ok(candidate)
}

/// Run [`select`] under `primary`, then once more under the policy's fallback
/// mode against the same listing if the first run found nothing usable.
pub fn select_with_fallback<D>(
    listing: &ListingPage,
    policy: &SelectionPolicy,
    primary: ResponseMode,
    draw: &mut D,
) -> Result<Candidate>
where
    D: Draw + ?Sized,
{
    let err = match select(listing, policy, primary, draw) {
        Ok(candidate) => return Ok(candidate),
        Err(err) if err.is_recoverable_by_fallback() => err,
        Err(err) => return Err(err),
    };

    let fallback = match policy.fallback_mode.as_mode() {
        Some(mode) if mode != primary => mode,
        _ => return Err(err),
    };

    info!(primary = %primary, fallback = %fallback, error = %err, "[FALLBACK] Retrying selection");
    select(listing, policy, fallback, draw).map_err(|second| {
        warn!(fallback = %fallback, error = %second, "[FALLBACK] Fallback selection failed");
        PickError::FallbackExhausted {
            mode: fallback,
            source: Box::new(second),
        }
    })
}
