use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use utils::assets::storage_dir;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

/// Bucketed file storage under the asset directory, served back at
/// `/storage/{bucket}/{path}`.
#[derive(Debug, Clone)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn from_asset_dir() -> Result<Self, StorageError> {
        Self::new(storage_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn checked_path(&self, bucket: &str, file_path: &str) -> Result<PathBuf, StorageError> {
        for segment in [bucket, file_path] {
            if segment.is_empty()
                || segment.starts_with('/')
                || segment.split('/').any(|part| part.is_empty() || part == "..")
            {
                return Err(StorageError::InvalidPath(format!("{bucket}/{file_path}")));
            }
        }
        Ok(self.root.join(bucket).join(file_path))
    }

    pub fn path_for(&self, bucket: &str, file_path: &str) -> Result<PathBuf, StorageError> {
        self.checked_path(bucket, file_path)
    }

    pub fn public_url(&self, bucket: &str, file_path: &str) -> String {
        format!("/storage/{bucket}/{file_path}")
    }

    /// Writes through a temp file and renames into place, so readers never
    /// observe a partial file.
    pub async fn write(
        &self,
        bucket: &str,
        file_path: &str,
        data: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let full_path = self.checked_path(bucket, file_path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, &full_path).await?;

        tracing::debug!(
            bucket,
            file_path,
            size = data.len(),
            "stored file {}",
            full_path.display()
        );
        Ok(full_path)
    }

    pub async fn read(&self, bucket: &str, file_path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.checked_path(bucket, file_path)?;
        Ok(fs::read(full_path).await?)
    }

    /// Removes a stored file. Returns false when it was already gone.
    pub async fn delete(&self, bucket: &str, file_path: &str) -> Result<bool, StorageError> {
        let full_path = self.checked_path(bucket, file_path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
