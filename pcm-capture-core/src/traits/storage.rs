use std::fs;
use std::path::{Path, PathBuf};

/// A storage location recordings can be written to.
///
/// On a phone this is the external storage volume; `is_writable` mirrors the
/// platform's "mounted read/write" check.
pub trait StorageVolume: Send + Sync {
    /// Whether the volume is currently mounted and writable.
    fn is_writable(&self) -> bool;

    /// Directory new recordings are created in.
    fn root(&self) -> &Path;
}

/// A plain directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl StorageVolume for LocalStorage {
    fn is_writable(&self) -> bool {
        match fs::metadata(&self.root) {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            Err(e) => {
                log::debug!("Storage root {} unavailable: {}", self.root.display(), e);
                false
            }
        }
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
