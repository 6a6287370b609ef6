use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::DraftError;

/// Metadata for one processed upload waiting on a draft. The bytes and the
/// preview file are held by the draft session under `attachment_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PendingImage {
    pub attachment_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RejectedFile {
    pub file_name: String,
    pub reason: String,
}

/// Result of adding a batch of files: what got in, and what was refused
/// with the reason shown to the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BatchOutcome {
    pub accepted: Vec<PendingImage>,
    pub rejected: Vec<RejectedFile>,
}

/// Ordered list of pending uploads. Order is the order files were added and
/// is the order they will be uploaded and referenced on submit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Gallery {
    entries: Vec<PendingImage>,
}

impl Gallery {
    pub fn entries(&self) -> &[PendingImage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(mut self, entry: PendingImage) -> Gallery {
        self.entries.push(entry);
        self
    }

    /// Removes the entry at `index`; later entries shift down one position.
    pub fn remove(mut self, index: usize) -> Result<(Gallery, PendingImage), DraftError> {
        if index >= self.entries.len() {
            return Err(DraftError::IndexOutOfRange(index));
        }
        let removed = self.entries.remove(index);
        Ok((self, removed))
    }
}
