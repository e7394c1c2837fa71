//! reqwest-backed implementation of [`RemoteApi`].

use std::time::Duration;

use reqwest::{multipart, StatusCode, Url};
use tracing::debug;

use crate::api::types::{Entry, ErrorBody, ListResponse, TreeResponse, UploadFile, UploadResponse};
use crate::api::RemoteApi;
use crate::error::{AppError, Result, TransportKind};

/// HTTP client for the file server API.
///
/// Endpoint URLs are assembled as base + prefix + route, where the prefix
/// (for reverse-proxy mounts such as `/filesuploader`) is fixed at
/// construction. Path parameters are percent-encoded per segment, keeping
/// the `/` separators intact.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
    prefix: String,
}

impl HttpClient {
    pub fn new(base_url: &str, prefix: &str, connect_timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("invalid server URL {base_url:?}: {e}")))?;
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            http,
            base,
            prefix: normalize_prefix(prefix),
        })
    }

    fn endpoint(&self, route: &str) -> Result<Url> {
        let path = format!("{}{}", self.prefix, route);
        self.base
            .join(&path)
            .map_err(|e| AppError::Config(format!("invalid endpoint {path:?}: {e}")))
    }

    /// Map a non-success response to a transport error, preferring the
    /// server's `{"error": …}` body over a bare status line.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let kind = classify_status(status);
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("HTTP {status}"),
        };
        Err(AppError::transport(kind, message))
    }
}

impl RemoteApi for HttpClient {
    async fn fetch_tree(&self) -> Result<Vec<Entry>> {
        let url = self.endpoint("/api/directory/tree")?;
        debug!(%url, "fetching directory tree");
        let resp = Self::check(self.http.get(url).send().await?).await?;
        let body: TreeResponse = resp.json().await?;
        Ok(body.files)
    }

    async fn fetch_listing(&self, path: &str) -> Result<ListResponse> {
        let url = self.endpoint(&format!("/api/directory/list/{}", encode_path(path)))?;
        debug!(%url, "fetching directory listing");
        let resp = Self::check(self.http.get(url).send().await?).await?;
        Ok(resp.json().await?)
    }

    async fn upload(&self, path: &str, files: &[UploadFile]) -> Result<UploadResponse> {
        let url = self.endpoint("/api/file/upload")?;
        debug!(%url, count = files.len(), "uploading files");
        // The server consumes multipart fields in order and fixes the target
        // directory at the first file part, so `path` must be appended first.
        let mut form = multipart::Form::new().text("path", path.to_string());
        for file in files {
            let part = multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
            form = form.part("files", part);
        }
        let resp = Self::check(self.http.post(url).multipart(form).send().await?).await?;
        Ok(resp.json().await?)
    }

    async fn create_directory(&self, parent: &str, name: &str) -> Result<()> {
        let url = self.endpoint("/api/directory/create")?;
        debug!(%url, parent, name, "creating directory");
        let form = [("parentPath", parent), ("name", name)];
        Self::check(self.http.post(url).form(&form).send().await?).await?;
        Ok(())
    }

    async fn create_symlink(&self, parent: &str, name: &str, target: &str) -> Result<()> {
        let url = self.endpoint("/api/directory/symlink")?;
        debug!(%url, parent, name, target, "creating symlink");
        let form = [("parentPath", parent), ("name", name), ("target", target)];
        Self::check(self.http.post(url).form(&form).send().await?).await?;
        Ok(())
    }

    async fn rename(&self, old_path: &str, new_name: &str) -> Result<()> {
        let url = self.endpoint("/api/file/rename")?;
        debug!(%url, old_path, new_name, "renaming");
        let form = [("oldPath", old_path), ("newName", new_name)];
        Self::check(self.http.post(url).form(&form).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.endpoint(&format!("/api/file/delete/{}", encode_path(path)))?;
        debug!(%url, "deleting");
        Self::check(self.http.delete(url).send().await?).await?;
        Ok(())
    }
}

/// Percent-encode each path segment while leaving the `/` separators alone.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reduce a configured prefix to either `""` or `/name` form.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn classify_status(status: StatusCode) -> TransportKind {
    if status == StatusCode::NOT_FOUND {
        TransportKind::NotFound
    } else if status.is_server_error() {
        TransportKind::ServerError
    } else {
        TransportKind::Other
    }
}
