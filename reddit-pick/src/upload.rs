#![doc = "Content store integration for the CLI: bridges the core ContentStore trait to a Matrix media repository."]
//
//! # Content Store Integration (CLI <-> Core)
//!
//! - [`MatrixMediaStore`] uploads media to a homeserver's media repository and
//!   answers with the `mxc://` content URI the chat client can display.
//! - [`UnconfiguredStore`] is used when no homeserver credentials are present,
//!   or when the config never reaches upload mode; every upload is rejected,
//!   which surfaces as an upload error in upload mode.
//!
//! Construct [`MatrixMediaStore`] from `MATRIX_HOMESERVER` and
//! `MATRIX_ACCESS_TOKEN` (a `.env` file is honoured).

use async_trait::async_trait;
use reddit_pick_core::config::PickConfig;
use reddit_pick_core::contract::{ContentStore, NewMediaUpload};
use reddit_pick_core::error::CollaboratorError;
use serde::Deserialize;
use std::env;

pub struct MatrixMediaStore {
    client: reqwest::Client,
    homeserver: String,
    access_token: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    content_uri: String,
}

impl MatrixMediaStore {
    pub fn new(homeserver: impl Into<String>, access_token: impl Into<String>) -> Self {
        MatrixMediaStore {
            client: reqwest::Client::new(),
            homeserver: homeserver.into(),
            access_token: access_token.into(),
        }
    }

    pub fn new_from_env() -> Result<Self, CollaboratorError> {
        dotenvy::dotenv().ok();
        match (env::var("MATRIX_HOMESERVER"), env::var("MATRIX_ACCESS_TOKEN")) {
            (Ok(homeserver), Ok(token)) => {
                tracing::info!(
                    homeserver = %homeserver,
                    token_set = !token.is_empty(),
                    "Initialized MatrixMediaStore from environment"
                );
                Ok(MatrixMediaStore::new(homeserver, token))
            }
            (Err(e), _) => {
                tracing::error!(error = ?e, "MATRIX_HOMESERVER missing in environment");
                Err(Box::new(e))
            }
            (_, Err(e)) => {
                tracing::error!(error = ?e, "MATRIX_ACCESS_TOKEN missing in environment");
                Err(Box::new(e))
            }
        }
    }

    pub fn upload_url(&self) -> String {
        format!(
            "{}/_matrix/media/v3/upload",
            self.homeserver.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ContentStore for MatrixMediaStore {
    async fn upload<'a>(&self, req: NewMediaUpload<'a>) -> Result<String, CollaboratorError> {
        let url = self.upload_url();
        tracing::info!(
            url = %url,
            filename = req.filename,
            mime_type = req.mime_type,
            bytes = req.bytes.len(),
            "Uploading media to homeserver"
        );

        let resp = self
            .client
            .post(&url)
            .query(&[("filename", req.filename)])
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, req.mime_type)
            .body(req.bytes.to_vec())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            tracing::error!(status = %status, url = %url, "Homeserver rejected upload. Response body: {text}");
            return Err(format!("homeserver returned {status}: {text}").into());
        }

        let body: UploadResponse = resp.json().await?;
        tracing::info!(content_uri = %body.content_uri, "Media uploaded");
        Ok(body.content_uri)
    }
}

/// Store used when no media repository is configured.
pub struct UnconfiguredStore;

#[async_trait]
impl ContentStore for UnconfiguredStore {
    async fn upload<'a>(&self, req: NewMediaUpload<'a>) -> Result<String, CollaboratorError> {
        tracing::error!(filename = req.filename, "Upload requested but no content store is configured");
        Err("no content store configured; set MATRIX_HOMESERVER and MATRIX_ACCESS_TOKEN".into())
    }
}

/// Either a real Matrix store or the rejecting placeholder, picked at startup.
pub enum ConfiguredStore {
    Matrix(MatrixMediaStore),
    Unconfigured(UnconfiguredStore),
}

impl ConfiguredStore {
    /// Reads credentials only when `config` can end up in upload mode.
    pub fn for_config(config: &PickConfig) -> Self {
        if config.upload_reachable() {
            ConfiguredStore::from_env()
        } else {
            tracing::debug!("Upload mode unreachable; skipping content store setup");
            ConfiguredStore::Unconfigured(UnconfiguredStore)
        }
    }

    pub fn from_env() -> Self {
        match MatrixMediaStore::new_from_env() {
            Ok(store) => ConfiguredStore::Matrix(store),
            Err(e) => {
                tracing::warn!(error = %e, "No content store configured; upload mode will fail");
                ConfiguredStore::Unconfigured(UnconfiguredStore)
            }
        }
    }
}

#[async_trait]
impl ContentStore for ConfiguredStore {
    async fn upload<'a>(&self, req: NewMediaUpload<'a>) -> Result<String, CollaboratorError> {
        match self {
            ConfiguredStore::Matrix(store) => store.upload(req).await,
            ConfiguredStore::Unconfigured(store) => store.upload(req).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_url_has_single_slash() {
        let store = MatrixMediaStore::new("https://matrix.example.org/", "token");
        assert_eq!(
            store.upload_url(),
            "https://matrix.example.org/_matrix/media/v3/upload"
        );
    }

    #[test]
    fn link_only_config_skips_store_setup() {
        let config = PickConfig::default();
        assert!(matches!(
            ConfiguredStore::for_config(&config),
            ConfiguredStore::Unconfigured(_)
        ));
    }

    #[tokio::test]
    async fn unconfigured_store_rejects_uploads() {
        let err = UnconfiguredStore
            .upload(NewMediaUpload {
                bytes: b"abc",
                mime_type: "image/png",
                filename: "pics.png",
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no content store configured"));
    }
}
