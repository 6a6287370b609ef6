use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A scratch file holding preview bytes for a pending upload. The file lives
/// exactly as long as the handle; dropping the handle unlinks it.
#[derive(Debug)]
pub struct PreviewHandle {
    path: PathBuf,
}

impl PreviewHandle {
    pub fn create(dir: &Path, id: Uuid, data: &[u8]) -> std::io::Result<Self> {
        let path = dir.join(format!("{id}.preview"));
        std::fs::write(&path, data)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::debug!("Failed to remove preview {}: {}", self.path.display(), err);
        }
    }
}
