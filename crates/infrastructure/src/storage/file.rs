//! Best-effort JSON file access shared by the file-backed adapters.
//!
//! Token storage never fails its callers, so problems here are logged and
//! absorbed: a missing or corrupt file reads as the default value and a
//! failed write leaves the previous file in place.
//!
//! Writes go to a sibling temp file that is then renamed over the target,
//! so a concurrent reader sees either the old or the new content in full.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

pub async fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return T::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read token file, treating as empty");
            return T::default();
        }
    };

    from_json_bytes(&bytes).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "corrupt token file, treating as empty");
        T::default()
    })
}

pub async fn save<T: Serialize>(path: &Path, value: &T) {
    let content = match to_json_stable_bytes(value) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot encode token file");
            return;
        }
    };

    if let Some(parent) = path.parent()
        && let Err(e) = tokio::fs::create_dir_all(parent).await
    {
        warn!(path = %parent.display(), error = %e, "cannot create token directory");
        return;
    }

    let staging = staging_path(path);
    if let Err(e) = tokio::fs::write(&staging, content).await {
        warn!(path = %staging.display(), error = %e, "cannot write token file");
        return;
    }
    if let Err(e) = tokio::fs::rename(&staging, path).await {
        warn!(path = %path.display(), error = %e, "cannot replace token file");
        let _ = tokio::fs::remove_file(&staging).await;
    }
}

/// `tokens.json` is staged as `tokens.json.tmp` in the same directory.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("authgate"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}
