//! BlobStore - thumbnail image storage
//!
//! ## Responsibilities
//!
//! - Persist encoded thumbnails under a configured directory
//! - Hand out stable references for stored blobs

use std::path::PathBuf;

use tokio::fs;

use crate::error::Result;

/// BlobStore instance
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create new BlobStore rooted at `root`, creating the directory if
    /// it does not exist.
    pub async fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Save bytes under `name`, returning the stored reference
    pub async fn save(&self, name: &str, data: &[u8]) -> Result<String> {
        let path = self.root.join(name);
        fs::write(&path, data).await?;

        tracing::debug!(
            name = %name,
            path = %path.display(),
            size = data.len(),
            "Blob saved"
        );

        Ok(name.to_string())
    }

    /// Filesystem path for a stored reference
    pub fn path_for(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("guardian-eye-blobs-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn save_writes_bytes_and_returns_reference() {
        let store = BlobStore::new(temp_root()).await.unwrap();

        let reference = store.save("cam-1_1700000000.jpg", b"jpegdata").await.unwrap();
        assert_eq!(reference, "cam-1_1700000000.jpg");

        let stored = fs::read(store.path_for(&reference)).await.unwrap();
        assert_eq!(stored, b"jpegdata");
    }

    #[tokio::test]
    async fn save_overwrites_existing_reference() {
        let store = BlobStore::new(temp_root()).await.unwrap();

        store.save("latest.jpg", b"old").await.unwrap();
        store.save("latest.jpg", b"new").await.unwrap();

        let stored = fs::read(store.path_for("latest.jpg")).await.unwrap();
        assert_eq!(stored, b"new");
    }
}
