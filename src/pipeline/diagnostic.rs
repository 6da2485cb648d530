//! Diagnostic dump for extraction replies that failed to parse.
//!
//! The raw reply is preserved on disk so schema drift or prompt regressions
//! can be inspected after the fact. Writing is best-effort: failures are
//! logged, never propagated, never panic.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config;

/// Resolve and create the dump directory (see `config::debug_dir`).
/// Returns `None` (with a warning) if it cannot be created.
pub fn dump_dir() -> Option<PathBuf> {
    let dir = config::debug_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(
            path = %dir.display(),
            error = %e,
            "Diagnostic dump: failed to create directory"
        );
        return None;
    }
    Some(dir)
}

/// Write the raw reply to `debug_response_<timestamp>.txt` under `dir`.
/// Returns the path on success.
pub fn dump_failed_reply(dir: &Path, reply: &str) -> Option<PathBuf> {
    let filename = format!("debug_response_{}.txt", Utc::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);
    match std::fs::write(&path, reply.as_bytes()) {
        Ok(()) => {
            tracing::info!(
                path = %path.display(),
                size = reply.len(),
                "Diagnostic dump: saved unparseable reply"
            );
            Some(path)
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Diagnostic dump: failed to write reply"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_reply_is_written_with_timestamped_name() {
        let tmp = tempfile::tempdir().unwrap();

        let path = dump_failed_reply(tmp.path(), "תשובה שבורה ללא JSON").unwrap();

        assert!(path.starts_with(tmp.path()));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("debug_response_"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "תשובה שבורה ללא JSON"
        );
    }

    #[test]
    fn write_failure_is_swallowed() {
        let missing = Path::new("/nonexistent-rishui-debug-dir");
        assert!(dump_failed_reply(missing, "x").is_none());
    }
}
