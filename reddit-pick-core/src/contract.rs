//! # contract: collaborator interfaces for the pick pipeline
//!
//! The pipeline talks to the outside world through three seams:
//! - [`Transport`]: plain HTTP GET, used for the listing and for media downloads.
//! - [`ContentStore`]: the sink media is re-uploaded to, answering with a content URI.
//! - [`Draw`]: the random index source used by the selector.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`; mocks are exported under the
//!   default `test-export-mocks` feature so integration tests can script them.

use async_trait::async_trait;
use rand::Rng;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::CollaboratorError;

/// Status and raw body of one GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal data needed to store one media file.
pub struct NewMediaUpload<'a> {
    pub bytes: &'a [u8],
    pub mime_type: &'a str,
    /// Name the chat client shows for the file, e.g. `pics.png`.
    pub filename: &'a str,
}

/// Outbound HTTP. The implementor owns user agent and timeout handling;
/// a timed out request is returned as an error, never as a status.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, CollaboratorError>;
}

/// Destination for re-uploaded media.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store the bytes and return the content URI the chat client can display.
    async fn upload<'a>(&self, req: NewMediaUpload<'a>) -> Result<String, CollaboratorError>;
}

/// Source of uniformly distributed indices for the selector.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Draw: Send {
    /// Index in `0..len`. Never called with `len == 0`.
    fn draw(&mut self, len: usize) -> usize;
}

/// [`Draw`] backed by a `rand` generator.
pub struct RngDraw<R>(pub R);

impl RngDraw<rand::rngs::StdRng> {
    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        RngDraw(rand::rngs::StdRng::from_entropy())
    }
}

impl<R: Rng + Send> Draw for RngDraw<R> {
    fn draw(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}
