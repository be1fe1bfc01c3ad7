use std::path::PathBuf;

use log::warn;

#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(test)]
pub fn test_env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

pub fn parse_file_uri_path(uri: &str) -> Option<PathBuf> {
    if let Some(rest) = uri.strip_prefix("file://") {
        let decoded = urlencoding::decode(rest).unwrap_or(std::borrow::Cow::Borrowed(rest));
        return Some(PathBuf::from(decoded.into_owned()));
    }
    if uri.starts_with('/') {
        return Some(PathBuf::from(uri));
    }
    None
}

pub fn preferred_temp_dir() -> PathBuf {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(custom) = std::env::var("ESIGN_MARKER_TEMP_DIR") {
        candidates.push(PathBuf::from(custom));
    }
    if let Ok(tmpdir) = std::env::var("TMPDIR") {
        candidates.push(PathBuf::from(tmpdir));
    }
    candidates.push(PathBuf::from("/data/user/0/aeska.esignmarker/cache"));
    candidates.push(PathBuf::from("/data/data/aeska.esignmarker/cache"));
    candidates.push(std::env::temp_dir());

    candidates
        .into_iter()
        .find(|dir| std::fs::metadata(dir).map(|m| m.is_dir()).unwrap_or(false))
        .unwrap_or_else(std::env::temp_dir)
}

/// Exports land next to a local source document, else in the temp dir.
/// Content URIs are not writable from here, so they use the temp dir too.
pub fn output_dir_for(source_uri: Option<&str>) -> PathBuf {
    let Some(parent) = source_uri
        .and_then(parse_file_uri_path)
        .and_then(|path| path.parent().map(|p| p.to_path_buf()))
    else {
        return preferred_temp_dir();
    };
    if std::fs::metadata(&parent).map(|m| m.is_dir()).unwrap_or(false) {
        parent
    } else {
        warn!("source directory {} is unavailable, using temp dir", parent.display());
        preferred_temp_dir()
    }
}
