//! Repository source port for fetching a checkout.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::BoxError;

/// Boxed future type alias used by [`RepoSource`] to keep the trait dyn-compatible.
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;

/// What to fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchRequest {
    /// Repository URL (e.g. `https://github.com/acme/app`).
    pub url: String,
    /// Branch to check out.
    pub branch: String,
    /// Optional access token for private repositories. Never recorded.
    #[serde(skip)]
    pub access_token: Option<String>,
}

/// Fetches a complete checkout of a repository into a local directory.
///
/// A fetch is all-or-nothing: on error the caller must treat `dest` as
/// garbage and remove it.
pub trait RepoSource: Send + Sync {
    /// Populates `dest` with the requested branch of the repository.
    ///
    /// # Errors
    ///
    /// Returns an error on auth failure, missing repository or branch, or
    /// network failure.
    fn fetch<'a>(&'a self, request: &'a FetchRequest, dest: &'a Path) -> FetchFuture<'a>;
}
