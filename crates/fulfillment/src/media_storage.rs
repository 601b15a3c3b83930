//! Filesystem-backed media storage.
//!
//! Uploaded tracks land under `root` and are addressed by
//! `{public_base_url}/{path}`. Serving the directory is left to whatever
//! fronts `public_base_url`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serenade_core::error::CoreError;
use serenade_core::ports::MediaStorage;
use serenade_core::types::MediaRef;

pub struct LocalMediaStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Resolve `path` below the root, refusing anything that escapes it.
    fn resolve(&self, path: &str) -> Result<PathBuf, CoreError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.trim().is_empty() || escapes {
            return Err(CoreError::Validation(format!("invalid media path '{path}'")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn upload(&self, bytes: &[u8], path: &str) -> Result<MediaRef, CoreError> {
        let dest = self.resolve(path)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::Internal(format!("failed to create media dir: {e}")))?;
        }
        tokio::fs::write(&dest, bytes)
            .await
            .map_err(|e| CoreError::Internal(format!("failed to write media file: {e}")))?;

        tracing::info!(path, size_bytes = bytes.len(), "Media file stored");
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> MediaRef {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
