//! Resource resolution
//!
//! Maps a request target onto a file under the document root and captures
//! the metadata the response headers need. Nothing is cached: every call
//! reflects the filesystem at lookup time.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::http::date::truncate_to_seconds;
use crate::http::mime::content_type_for;

/// A file looked up under the document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Path the target resolved to
    pub path: PathBuf,

    /// True only for regular files
    pub exists: bool,

    /// Size in bytes, 0 when missing
    pub length: u64,

    /// Modification time with whole-second precision
    pub modified: Option<DateTime<Utc>>,

    /// Inferred MIME type, `None` when undetermined
    pub content_type: Option<String>,
}

impl Resource {
    fn missing(path: PathBuf) -> Self {
        Self {
            path,
            exists: false,
            length: 0,
            modified: None,
            content_type: None,
        }
    }
}

/// Resolves `target` against `root`.
///
/// The target is used literally (no percent decoding). Targets that climb out
/// of the root with `..` resolve as missing, and so do directories.
pub async fn resolve(root: &Path, target: &str) -> Resource {
    let Some(relative) = relative_target(target) else {
        tracing::warn!(request_target = target, "Rejected request target escaping the document root");
        return Resource::missing(root.to_path_buf());
    };

    lookup(root.join(relative)).await
}

/// Stats a file path directly.
pub async fn lookup(path: PathBuf) -> Resource {
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return Resource::missing(path),
    };

    let content_type = content_type_for(&path);

    Resource {
        length: metadata.len(),
        modified: metadata.modified().ok().map(truncate_to_seconds),
        content_type,
        exists: true,
        path,
    }
}

/// Loads one of the fixed error documents. A missing error document breaks
/// the document root contract and is reported as an error.
pub async fn error_document(path: PathBuf) -> anyhow::Result<Resource> {
    let resource = lookup(path).await;
    if !resource.exists {
        anyhow::bail!("error document {} missing from document root", resource.path.display());
    }
    Ok(resource)
}

fn relative_target(target: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();

    for component in Path::new(target).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }

    Some(relative)
}
