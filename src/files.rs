//! File Store
//!
//! Opaque blob storage behind a narrow contract: save bytes under a key,
//! get back a retrieval handle (`/uploads/...` relative URL). Local disk
//! implementation; the URL scheme is what the rest of the system depends
//! on, not the disk layout.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::PortalError;

/// Blob storage contract.
pub trait FileStore: Send + Sync {
    /// Store a transfer proof document keyed by transfer id. Returns the
    /// retrieval URL.
    fn save_transfer_proof(
        &self,
        transfer_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, PortalError>;

    /// Store a student work sample under district/student/year.
    fn save_work_sample(
        &self,
        district_id: Uuid,
        student_id: Uuid,
        year: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, PortalError>;

    /// Resolve a retrieval URL back to an absolute path, if the blob exists.
    fn resolve(&self, file_url: &str) -> Option<PathBuf>;
}

/// Local-disk blob store rooted at `base_dir`.
pub struct LocalFileStore {
    base_dir: PathBuf,
}

impl LocalFileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Random storage name preserving the original extension.
    fn safe_name(filename: &str) -> String {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        format!("{}{}", Uuid::new_v4(), ext)
    }

    fn write(&self, dir: PathBuf, filename: &str, bytes: &[u8]) -> Result<String, PortalError> {
        fs::create_dir_all(&dir)
            .map_err(|e| PortalError::Internal(format!("Upload dir create failed: {}", e)))?;
        let full = dir.join(Self::safe_name(filename));
        fs::write(&full, bytes)
            .map_err(|e| PortalError::Internal(format!("File write failed: {}", e)))?;
        let relative = full
            .strip_prefix(&self.base_dir)
            .map_err(|e| PortalError::Internal(e.to_string()))?;
        Ok(format!("/uploads/{}", relative.to_string_lossy().replace('\\', "/")))
    }
}

impl FileStore for LocalFileStore {
    fn save_transfer_proof(
        &self,
        transfer_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, PortalError> {
        let dir = self.base_dir.join("transfers").join(transfer_id.to_string());
        self.write(dir, filename, bytes)
    }

    fn save_work_sample(
        &self,
        district_id: Uuid,
        student_id: Uuid,
        year: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, PortalError> {
        let dir = self
            .base_dir
            .join(district_id.to_string())
            .join(student_id.to_string())
            .join(year);
        self.write(dir, filename, bytes)
    }

    fn resolve(&self, file_url: &str) -> Option<PathBuf> {
        let relative = file_url.strip_prefix("/uploads/")?;
        // Reject path traversal in stored URLs.
        if relative.split('/').any(|seg| seg == "..") {
            return None;
        }
        let abs = self.base_dir.join(relative);
        abs.is_file().then_some(abs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (LocalFileStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("files-test-{}", Uuid::new_v4()));
        (LocalFileStore::new(&dir).unwrap(), dir)
    }

    #[test]
    fn test_proof_roundtrip() {
        let (store, dir) = store();
        let tid = Uuid::new_v4();
        let url = store
            .save_transfer_proof(tid, "enrollment.pdf", b"%PDF-1.4")
            .unwrap();
        assert!(url.starts_with(&format!("/uploads/transfers/{}/", tid)));
        assert!(url.ends_with(".pdf"));

        let path = store.resolve(&url).expect("blob should exist");
        assert_eq!(fs::read(path).unwrap(), b"%PDF-1.4");

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_work_sample_layout() {
        let (store, dir) = store();
        let (d, s) = (Uuid::new_v4(), Uuid::new_v4());
        let url = store
            .save_work_sample(d, s, "2026", "essay.txt", b"my essay")
            .unwrap();
        assert!(url.starts_with(&format!("/uploads/{}/{}/2026/", d, s)));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_resolve_rejects_traversal_and_missing() {
        let (store, dir) = store();
        assert!(store.resolve("/uploads/../etc/passwd").is_none());
        assert!(store.resolve("/elsewhere/file.txt").is_none());
        assert!(store.resolve("/uploads/no/such/file.pdf").is_none());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_extension_preserved_name_randomized() {
        let a = LocalFileStore::safe_name("report.final.PDF");
        assert!(a.ends_with(".PDF"));
        let b = LocalFileStore::safe_name("noext");
        assert!(!b.contains('.'));
        assert_ne!(
            LocalFileStore::safe_name("x.txt"),
            LocalFileStore::safe_name("x.txt")
        );
    }
}
