//! High-level pipeline: fetch → select (with fallback) → resolve media → assemble.
//!
//! One call to [`Picker::handle`] is one user-triggered invocation. It owns its
//! listing, candidate and output; nothing is shared between invocations, so a
//! single [`Picker`] can serve concurrent requests.
//!
//! # Error Handling
//! - Feed status and parse failures abort before any selection happens.
//! - Selection failures are recovered once through the fallback mode, if configured.
//! - Download and upload failures are surfaced as is; nothing is re-selected.

use tracing::{error, info};

use crate::assemble::{assemble, OutputContent};
use crate::config::PickConfig;
use crate::contract::{ContentStore, Draw, Transport};
use crate::error::Result;
use crate::listing::{fetch_listing, subreddit_name};
use crate::media::resolve;
use crate::select::{select_with_fallback, ContentKind};

pub struct Picker<T, S> {
    config: PickConfig,
    transport: T,
    store: S,
}

impl<T, S> Picker<T, S>
where
    T: Transport,
    S: ContentStore,
{
    pub fn new(config: PickConfig, transport: T, store: S) -> Self {
        Picker {
            config,
            transport,
            store,
        }
    }

    /// Handle one request. An absent or blank subreddit uses the configured default.
    pub async fn handle<D>(&self, subreddit: Option<&str>, draw: &mut D) -> Result<OutputContent>
    where
        D: Draw + ?Sized,
    {
        let policy = self.config.selection_policy()?;
        let label = self.config.label_for(subreddit);
        info!(subreddit = %label, mode = %policy.response_mode, "[PICK] Handling request");

        let listing = fetch_listing(&self.transport, &self.config.feed, label).await?;

        let candidate = select_with_fallback(&listing, &policy, policy.response_mode, draw)
            .map_err(|e| {
                error!(subreddit = %label, error = %e, "[PICK][ERROR] Selection failed");
                e
            })?;

        let media = match candidate.content_kind {
            ContentKind::Image => {
                let file_label = subreddit_name(label);
                Some(resolve(&candidate, file_label, &self.transport, &self.store).await?)
            }
            ContentKind::Link => None,
        };

        let output = assemble(&candidate, media.as_ref(), candidate.mode)?;
        info!(
            subreddit = %label,
            mode = %output.mode,
            link = %output.external_link,
            "[PICK] Request handled"
        );
        Ok(output)
    }
}
