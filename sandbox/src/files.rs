//! File service: raw byte blobs keyed by guest-relative path.
//!
//! Paths are resolved under a fixed root and may not escape it. Failures
//! are never reported to the guest; a failed read is empty content.

use std::fs;
use std::path::{Path, PathBuf};

use canopy_hostapi::paths::resolve_under;

#[derive(Debug, Clone)]
pub struct FileService {
    root: PathBuf,
}

impl FileService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to `path`, creating parent directories as needed.
    pub fn write(&self, path: &str, bytes: &[u8]) {
        let target = match resolve_under(&self.root, path) {
            Ok(target) => target,
            Err(e) => {
                log::warn!("write_file({path:?}) refused: {e}");
                return;
            }
        };
        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("cannot create {}: {e}", parent.display());
                return;
            }
        }
        match fs::write(&target, bytes) {
            Ok(()) => log::debug!("wrote {} bytes to {}", bytes.len(), target.display()),
            Err(e) => log::warn!("cannot write {}: {e}", target.display()),
        }
    }

    /// Contents of `path`, or nothing when it is missing or unreadable.
    pub fn read(&self, path: &str) -> Vec<u8> {
        let target = match resolve_under(&self.root, path) {
            Ok(target) => target,
            Err(e) => {
                log::debug!("read_file({path:?}) refused: {e}");
                return Vec::new();
            }
        };
        match fs::read(&target) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                log::warn!("cannot read {}: {e}", target.display());
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileService::new(dir.path());
        files.write("saves/slot1/state.bin", &[1, 2, 3]);
        assert_eq!(fs::read(dir.path().join("saves/slot1/state.bin")).unwrap(), vec![1, 2, 3]);
        assert_eq!(files.read("saves/slot1/state.bin"), vec![1, 2, 3]);
    }

    #[test]
    fn test_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileService::new(dir.path());
        files.write("a.bin", &[9; 8]);
        files.write("a.bin", &[7]);
        assert_eq!(files.read("a.bin"), vec![7]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileService::new(dir.path());
        assert!(files.read("nothing/here.bin").is_empty());
    }

    #[test]
    fn test_escaping_paths_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("root");
        let files = FileService::new(&inner);
        files.write("../outside.bin", &[1]);
        assert!(!dir.path().join("outside.bin").exists());
        assert!(files.read("").is_empty());
        assert!(files.read("/etc/hostname").is_empty());
    }
}
