//! Upload folder normalization and the object naming rule.

/// Folder used when no prefix is configured.
pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";

/// Canonicalizes the configured prefix into a folder path.
///
/// The result always starts with `/` and never ends with `/` unless it is
/// exactly `/`. A missing or empty prefix falls back to
/// [`DEFAULT_UPLOAD_FOLDER`].
pub fn normalize_upload_folder(prefix: Option<&str>) -> String {
    let prefix = match prefix {
        Some(prefix) if !prefix.is_empty() => prefix,
        _ => DEFAULT_UPLOAD_FOLDER,
    };

    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_owned();
    }

    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

/// Canonical name of an uploaded file: leading slashes removed.
///
/// Returns `None` when nothing usable is left or the name denotes a folder.
pub fn upload_file_name(filename: &str) -> Option<&str> {
    let name = filename.trim_start_matches('/');
    if name.is_empty() || name.ends_with('/') {
        None
    } else {
        Some(name)
    }
}

/// Joins a normalized folder and a file name into an object key.
///
/// Both the predicted key of a streaming upload and the key the remote side
/// confirms go through here, so the two always agree.
pub fn object_key(folder: &str, file_name: &str) -> String {
    let file_name = file_name.trim_start_matches('/');
    if folder == "/" {
        format!("/{file_name}")
    } else {
        format!("{folder}/{file_name}")
    }
}
