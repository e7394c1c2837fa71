//! Remote file server API: wire types, the transport trait, and the HTTP client.

pub mod client;
pub mod types;

use std::future::Future;

use crate::error::Result;
use types::{Entry, ListResponse, UploadFile, UploadResponse};

/// Transport-agnostic surface of the remote file server.
///
/// The session is generic over this trait, so the sync logic never touches
/// HTTP types directly and tests can substitute an in-memory fake. Each call
/// is one independent round-trip with no client-side retry.
pub trait RemoteApi: Send + Sync {
    /// Flat entry list covering every directory and symlink in the share.
    fn fetch_tree(&self) -> impl Future<Output = Result<Vec<Entry>>> + Send;

    /// Entries of a single directory, plus the server-echoed canonical path.
    fn fetch_listing(&self, path: &str) -> impl Future<Output = Result<ListResponse>> + Send;

    /// Upload one or more files into `path` in a single request.
    fn upload(
        &self,
        path: &str,
        files: &[UploadFile],
    ) -> impl Future<Output = Result<UploadResponse>> + Send;

    /// Create directory `name` under `parent`.
    fn create_directory(&self, parent: &str, name: &str)
        -> impl Future<Output = Result<()>> + Send;

    /// Create symlink `name` under `parent` pointing at `target`.
    fn create_symlink(
        &self,
        parent: &str,
        name: &str,
        target: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Rename the object at `old_path` to `new_name` within its directory.
    fn rename(&self, old_path: &str, new_name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Delete the file, directory, or symlink at `path`.
    fn delete(&self, path: &str) -> impl Future<Output = Result<()>> + Send;
}
