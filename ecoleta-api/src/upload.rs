//! Disk storage for uploaded point images.

use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

/// Persist an uploaded image and return the stored file name.
///
/// The stored name is a fresh UUID; the extension is kept only when it is a
/// plain alphanumeric suffix, so client-supplied names never influence the
/// path beyond that.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub async fn save_image(dir: &Path, original_name: &str, bytes: &[u8]) -> Result<String> {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|ch| ch.is_ascii_alphanumeric()));

    let stored = match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
        None => Uuid::new_v4().to_string(),
    };

    let path = dir.join(&stored);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("writing upload to {}", path.display()))?;
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn scratch_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ecoleta-upload-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.expect("scratch dir created");
        dir
    }

    #[tokio::test]
    async fn keeps_plain_extensions_and_writes_bytes() {
        let dir = scratch_dir().await;
        let stored = save_image(&dir, "Point Photo.JPG", b"image-bytes").await.expect("saved");
        assert!(stored.ends_with(".jpg"), "extension should be kept lowercased");
        let written = tokio::fs::read(dir.join(&stored)).await.expect("file exists");
        assert_eq!(written, b"image-bytes");
    }

    #[tokio::test]
    async fn suspicious_extensions_are_dropped() {
        let dir = scratch_dir().await;
        let stored = save_image(&dir, "../../etc/pass.wd?", b"x").await.expect("saved");
        assert!(!stored.contains('.'), "no extension expected, got {stored}");
        assert!(!stored.contains('/'));
    }
}
