//! The sync controller: owns the navigation state and drives every remote
//! round-trip, including the refetch-after-mutation protocol.

use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::api::types::{Entry, UploadFile, UploadOutcome, ROOT_PATH};
use crate::api::RemoteApi;
use crate::error::{AppError, Result};
use crate::view::tree::{self, TreeNode};
use crate::view::{active, listing};

/// Bounded retry policy for the post-rename convergence fallback.
///
/// Some backing stores serve stale reads immediately after a rename, so the
/// refresh pair is repeated unconditionally; staleness cannot be detected
/// from this side.
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    /// Total refresh cycles after a rename; the first runs immediately.
    pub attempts: u32,
    /// Delay before every cycle after the first.
    pub delay: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            delay: Duration::from_millis(500),
        }
    }
}

/// Cached navigation state, owned exclusively by the session.
#[derive(Debug)]
struct SessionState {
    current_path: String,
    cached_entries: Vec<Entry>,
    cached_tree: Option<TreeNode>,
    /// Latest issued request token per cache. A completed fetch applies its
    /// result only while its token is still the newest; anything older is
    /// discarded, so out-of-order completions cannot clobber fresher data.
    listing_seq: u64,
    tree_seq: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_path: ROOT_PATH.to_string(),
            cached_entries: Vec::new(),
            cached_tree: None,
            listing_seq: 0,
            tree_seq: 0,
        }
    }
}

/// One user's view of the remote hierarchy.
///
/// All mutation of the caches funnels through the methods here; readers get
/// snapshots and never hold references into the cached state. Requests are
/// never cancelled once issued.
pub struct Session<A> {
    api: A,
    policy: RefreshPolicy,
    state: Mutex<SessionState>,
}

impl<A: RemoteApi> Session<A> {
    pub fn new(api: A, policy: RefreshPolicy) -> Self {
        Self {
            api,
            policy,
            state: Mutex::new(SessionState::default()),
        }
    }

    // ── Fetch operations ──

    /// Fetch the listing for `path` and make it current.
    ///
    /// The server may canonicalize the path, so the echoed path wins over
    /// the requested one. The tree is not refetched. On failure the previous
    /// path and listing stay in place.
    pub async fn navigate_to(&self, path: &str) -> Result<()> {
        let token = {
            let mut state = self.state.lock();
            state.listing_seq += 1;
            state.listing_seq
        };

        let resp = self.api.fetch_listing(path).await?;

        let mut state = self.state.lock();
        if token != state.listing_seq {
            debug!(token, latest = state.listing_seq, "discarding superseded listing response");
            return Ok(());
        }
        state.current_path = resp.path.unwrap_or_else(|| path.to_string());
        state.cached_entries = resp.files;
        debug!(
            path = %state.current_path,
            entries = state.cached_entries.len(),
            "listing applied"
        );
        Ok(())
    }

    /// Fetch the full hierarchy and rebuild the navigation tree.
    ///
    /// On failure the previous tree stays; stale-but-available beats empty.
    pub async fn refresh_tree(&self) -> Result<()> {
        let token = {
            let mut state = self.state.lock();
            state.tree_seq += 1;
            state.tree_seq
        };

        let entries = self.api.fetch_tree().await?;
        let root = tree::build(&entries);

        let mut state = self.state.lock();
        if token != state.tree_seq {
            debug!(token, latest = state.tree_seq, "discarding superseded tree response");
            return Ok(());
        }
        state.cached_tree = Some(root);
        Ok(())
    }

    // ── Mutation operations ──

    /// Upload `files` into `path` as one request.
    ///
    /// Completion refreshes both views even when some files were rejected;
    /// the outcome carries the per-file errors for the caller to surface. A
    /// failed request touches nothing.
    pub async fn upload(&self, path: &str, files: &[UploadFile]) -> Result<UploadOutcome> {
        if files.is_empty() {
            return Err(AppError::Validation("no files selected for upload".into()));
        }
        let resp = self.api.upload(path, files).await?;
        self.refresh_views(path).await;
        Ok(UploadOutcome {
            success: resp.success,
            errors: resp.errors,
        })
    }

    /// Create directory `name` under `parent`.
    pub async fn create_directory(&self, parent: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("directory name must not be empty".into()));
        }
        self.api.create_directory(parent, name).await?;
        let current = self.current_path();
        self.refresh_views(&current).await;
        Ok(())
    }

    /// Create symlink `name` under `parent` pointing at `target`.
    pub async fn create_symlink(&self, parent: &str, name: &str, target: &str) -> Result<()> {
        let name = name.trim();
        let target = target.trim();
        if name.is_empty() {
            return Err(AppError::Validation("link name must not be empty".into()));
        }
        if target.is_empty() {
            return Err(AppError::Validation("link target must not be empty".into()));
        }
        self.api.create_symlink(parent, name, target).await?;
        let current = self.current_path();
        self.refresh_views(&current).await;
        Ok(())
    }

    /// Rename the object at `old_path` to `new_name`.
    ///
    /// Both caches are emptied before the refresh so no view can keep
    /// showing the old name, then the refresh pair runs once per policy
    /// attempt with the policy delay between cycles.
    pub async fn rename(&self, old_path: &str, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::Validation("new name must not be empty".into()));
        }
        self.api.rename(old_path, new_name).await?;

        {
            let mut state = self.state.lock();
            state.cached_entries = Vec::new();
            state.cached_tree = None;
        }

        let current = self.current_path();
        self.refresh_views(&current).await;
        for _ in 1..self.policy.attempts {
            tokio::time::sleep(self.policy.delay).await;
            self.refresh_views(&current).await;
        }
        Ok(())
    }

    /// Delete the object at `path`; no convergence retries.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.api.delete(path).await?;
        let current = self.current_path();
        self.refresh_views(&current).await;
        Ok(())
    }

    /// The post-mutation refresh pair: listing first, then tree.
    ///
    /// Failures here are logged and swallowed. The mutation itself already
    /// succeeded and the caches stay last-known-good, so reporting a refresh
    /// error as an operation error would misreport the outcome.
    async fn refresh_views(&self, path: &str) {
        if let Err(e) = self.navigate_to(path).await {
            warn!(path, error = %e, "post-mutation listing refresh failed");
        }
        if let Err(e) = self.refresh_tree().await {
            warn!(error = %e, "post-mutation tree refresh failed");
        }
    }

    // ── Snapshot accessors ──

    /// The path whose contents are currently displayed.
    pub fn current_path(&self) -> String {
        self.state.lock().current_path.clone()
    }

    /// The cached listing with display rules applied; `search` filters it
    /// locally without a round-trip.
    pub fn listing(&self, search: Option<&str>) -> Vec<Entry> {
        let state = self.state.lock();
        listing::apply(&state.cached_entries, search)
    }

    /// Snapshot of the cached navigation tree, if one has been fetched.
    pub fn tree(&self) -> Option<TreeNode> {
        self.state.lock().cached_tree.clone()
    }

    /// Paths of the node chain from the root to the current path, for
    /// highlighting and ancestor expansion. `None` when the tree is absent
    /// or does not contain the current path.
    pub fn active_trail(&self) -> Option<Vec<String>> {
        let state = self.state.lock();
        let root = state.cached_tree.as_ref()?;
        let trail = active::resolve(root, &state.current_path)?;
        Some(trail.into_iter().map(|node| node.path.clone()).collect())
    }
}
