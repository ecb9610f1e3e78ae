use std::path::Path;

/// Best-effort content type from the file extension. `None` when the
/// extension is missing or unknown.
pub fn content_type_for(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
