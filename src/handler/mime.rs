use std::path::Path;

/// Content type for files whose extension is unknown.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Guess a content type from the file extension alone.
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}
