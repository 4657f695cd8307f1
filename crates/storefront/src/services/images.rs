//! Offer image storage on the local filesystem.
//!
//! Images live flat under the configured upload directory. Filenames are
//! reduced to their final path component and checked against an extension
//! allowlist before any filesystem access, so a crafted name cannot escape
//! the directory.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Image extensions accepted for offer uploads.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg"];

/// Errors from image storage operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The filename is empty or reduces to no usable name.
    #[error("invalid image filename")]
    InvalidFilename,

    /// The file extension is not in the allowlist.
    #[error("unsupported image type (allowed: png, jpg, jpeg, svg)")]
    UnsupportedExtension,

    /// No stored image has this name.
    #[error("image not found")]
    NotFound,

    /// Underlying filesystem failure.
    #[error("image storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem store for offer images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Io` if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ImageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Store image bytes under a sanitized version of `filename`.
    ///
    /// Returns the stored name, which is what offer records reference.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::InvalidFilename` or
    /// `ImageError::UnsupportedExtension` before any filesystem access, and
    /// `ImageError::Io` if the write fails.
    pub async fn store(&self, filename: &str, bytes: &[u8]) -> Result<String, ImageError> {
        let name = sanitize_filename(filename)?;
        tokio::fs::write(self.root.join(&name), bytes).await?;
        debug!(image = %name, "stored offer image");
        Ok(name)
    }

    /// Read a stored image back.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::NotFound` if no image has this name, or
    /// `ImageError::Io` for other filesystem failures.
    pub async fn retrieve(&self, name: &str) -> Result<Vec<u8>, ImageError> {
        let name = sanitize_filename(name)?;
        match tokio::fs::read(self.root.join(&name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ImageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored image. Missing files are treated as already removed.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Io` if the removal fails for any reason other
    /// than the file being absent.
    pub async fn remove(&self, name: &str) -> Result<(), ImageError> {
        let name = sanitize_filename(name)?;
        match tokio::fs::remove_file(self.root.join(&name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reduce a client-supplied filename to a safe flat name.
///
/// Takes the final path component (dropping any directories), then requires
/// a non-empty stem and an allowlisted extension.
fn sanitize_filename(filename: &str) -> Result<String, ImageError> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(ImageError::InvalidFilename)?;

    if name.is_empty() || name.starts_with('.') {
        return Err(ImageError::InvalidFilename);
    }

    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or(ImageError::UnsupportedExtension)?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ImageError::UnsupportedExtension);
    }

    Ok(name.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("widget.png").unwrap(), "widget.png");
        assert_eq!(sanitize_filename("photo.JPEG").unwrap(), "photo.JPEG");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(
            sanitize_filename("../../etc/widget.png").unwrap(),
            "widget.png"
        );
        assert_eq!(sanitize_filename("a/b/c.svg").unwrap(), "c.svg");
    }

    #[test]
    fn test_sanitize_rejects_bad_extensions() {
        assert!(matches!(
            sanitize_filename("shell.sh"),
            Err(ImageError::UnsupportedExtension)
        ));
        assert!(matches!(
            sanitize_filename("noextension"),
            Err(ImageError::UnsupportedExtension)
        ));
    }

    #[test]
    fn test_sanitize_rejects_hidden_and_empty() {
        assert!(matches!(
            sanitize_filename(".hidden.png"),
            Err(ImageError::InvalidFilename)
        ));
        assert!(sanitize_filename("").is_err());
    }

    #[tokio::test]
    async fn test_store_retrieve_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path()).await.unwrap();

        let name = store.store("widget.png", b"png-bytes").await.unwrap();
        assert_eq!(name, "widget.png");
        assert_eq!(store.retrieve("widget.png").await.unwrap(), b"png-bytes");

        store.remove("widget.png").await.unwrap();
        assert!(matches!(
            store.retrieve("widget.png").await,
            Err(ImageError::NotFound)
        ));

        // Removing again is a no-op
        store.remove("widget.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_retrieve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path()).await.unwrap();

        // Traversal components are stripped, so this resolves inside the root
        assert!(matches!(
            store.retrieve("../outside.png").await,
            Err(ImageError::NotFound)
        ));
    }
}
