//! Wire types shared between the HTTP client and the sync core.
//!
//! Field names mirror the server's JSON (camelCase). Every `Entry` field is
//! defaulted so sparse records normalize instead of failing; the `files`
//! arrays of the listing and tree envelopes are deliberately *not* defaulted,
//! so a missing or `null` array surfaces as a malformed response.

use serde::Deserialize;

/// Path sentinel the server uses for the share root.
pub const ROOT_PATH: &str = ".";

/// Name prefix of server-internal entries that must never reach a view.
pub const HIDDEN_PREFIX: &str = "_h5ai";

/// True if `name` starts with the hidden prefix, case-insensitively.
pub fn is_hidden_name(name: &str) -> bool {
    name.get(..HIDDEN_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(HIDDEN_PREFIX))
}

/// One filesystem object as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub name: String,
    /// Path relative to the share root, `/`-separated; `.` is the root.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default)]
    pub is_symlink: bool,
    /// Modification time, seconds since the Unix epoch.
    #[serde(default)]
    pub mod_time: i64,
    #[serde(default)]
    pub symlink_target: Option<String>,
}

impl Entry {
    /// Whether the entry is excluded from every user-facing view.
    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.name)
    }

    /// Whether the entry can appear as a node in the directory tree.
    pub fn is_navigable(&self) -> bool {
        self.is_dir || self.is_symlink
    }
}

/// Body of `GET /api/directory/list/{path}`.
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    pub files: Vec<Entry>,
    /// Canonical path echoed by the server; callers fall back to the
    /// requested path when absent.
    #[serde(default)]
    pub path: Option<String>,
}

/// Body of `GET /api/directory/tree`.
#[derive(Debug, Deserialize)]
pub struct TreeResponse {
    pub files: Vec<Entry>,
}

/// Body of `POST /api/file/upload`.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    /// Per-file failure descriptions; present only when something failed.
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Error body the server attaches to failed requests.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// One local file queued for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Result of an upload round-trip. A non-empty `errors` list is not an
/// operation failure; the request completed and the caches were refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub success: bool,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_prefix_is_case_insensitive() {
        assert!(is_hidden_name("_h5ai"));
        assert!(is_hidden_name("_H5AI"));
        assert!(is_hidden_name("_h5ai_foo"));
        assert!(is_hidden_name("_h5aiData"));
        assert!(!is_hidden_name("h5ai"));
        assert!(!is_hidden_name("notes.txt"));
        assert!(!is_hidden_name(""));
        assert!(!is_hidden_name("_h5a"));
    }

    #[test]
    fn entry_deserializes_camel_case() {
        let json = r#"{
            "name": "docs",
            "path": "projects/docs",
            "size": 4096,
            "isDir": true,
            "isSymlink": false,
            "modTime": 1700000000
        }"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.name, "docs");
        assert_eq!(entry.path, "projects/docs");
        assert!(entry.is_dir);
        assert!(!entry.is_symlink);
        assert_eq!(entry.mod_time, 1_700_000_000);
        assert_eq!(entry.symlink_target, None);
    }

    #[test]
    fn sparse_entry_normalizes_to_defaults() {
        let entry: Entry = serde_json::from_str("{}").unwrap();
        assert_eq!(entry, Entry::default());
        assert!(!entry.is_navigable());
    }

    #[test]
    fn symlink_entry_carries_target() {
        let json = r#"{"name":"link","path":"link","isSymlink":true,"symlinkTarget":"/mnt/data"}"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert!(entry.is_symlink);
        assert!(entry.is_navigable());
        assert_eq!(entry.symlink_target.as_deref(), Some("/mnt/data"));
    }

    #[test]
    fn list_response_requires_files_array() {
        assert!(serde_json::from_str::<ListResponse>(r#"{"path":"."}"#).is_err());
        assert!(serde_json::from_str::<ListResponse>(r#"{"path":".","files":null}"#).is_err());

        let ok: ListResponse =
            serde_json::from_str(r#"{"path":"projects","files":[]}"#).unwrap();
        assert_eq!(ok.path.as_deref(), Some("projects"));
        assert!(ok.files.is_empty());
    }

    #[test]
    fn list_response_path_is_optional() {
        let resp: ListResponse = serde_json::from_str(r#"{"files":[]}"#).unwrap();
        assert_eq!(resp.path, None);
    }

    #[test]
    fn tree_response_rejects_null_files() {
        assert!(serde_json::from_str::<TreeResponse>(r#"{"files":null}"#).is_err());
        let ok: TreeResponse = serde_json::from_str(r#"{"files":[{"name":"a"}]}"#).unwrap();
        assert_eq!(ok.files.len(), 1);
    }

    #[test]
    fn upload_response_defaults_errors_to_empty() {
        let resp: UploadResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(resp.success);
        assert!(resp.errors.is_empty());

        let resp: UploadResponse =
            serde_json::from_str(r#"{"success":false,"errors":["big.iso: too large"]}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.errors, vec!["big.iso: too large".to_string()]);
    }
}
