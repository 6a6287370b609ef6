use media::EntityKind;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::gallery::PendingImage;

/// The single-image (cover) slot. `stored` remembers the record's persisted
/// cover when it is real (present and not the kind's placeholder); `pending`
/// is a staged replacement. Clearing a staged file falls back to the stored
/// cover rather than an empty slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CoverSlot {
    stored: Option<String>,
    pending: Option<PendingImage>,
}

/// What the editor shows for the slot right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "state", rename_all = "lowercase")]
#[ts(export)]
pub enum CoverView {
    Empty,
    Stored { url: String },
    Pending { entry: PendingImage },
}

impl CoverSlot {
    pub fn empty() -> CoverSlot {
        CoverSlot::default()
    }

    /// Seeds the slot from a record's cover URL. Blank covers and the kind's
    /// placeholder count as no cover at all.
    pub fn seeded(cover_url: Option<&str>, kind: EntityKind) -> CoverSlot {
        let stored = match cover_url {
            Some(url) if !url.trim().is_empty() && url != kind.placeholder_url() => {
                Some(url.to_string())
            }
            _ => None,
        };
        CoverSlot {
            stored,
            pending: None,
        }
    }

    /// Stages `entry` as the new cover. Returns the superseded pending entry,
    /// if any, so its preview can be released.
    pub fn select(mut self, entry: PendingImage) -> (CoverSlot, Option<PendingImage>) {
        let superseded = self.pending.replace(entry);
        (self, superseded)
    }

    /// Unstages the pending cover. The slot shows the stored cover again when
    /// one exists, otherwise it is empty.
    pub fn clear(mut self) -> (CoverSlot, Option<PendingImage>) {
        let released = self.pending.take();
        (self, released)
    }

    pub fn pending(&self) -> Option<&PendingImage> {
        self.pending.as_ref()
    }

    pub fn stored(&self) -> Option<&str> {
        self.stored.as_deref()
    }

    pub fn view(&self) -> CoverView {
        if let Some(entry) = &self.pending {
            return CoverView::Pending {
                entry: entry.clone(),
            };
        }
        if let Some(url) = &self.stored {
            return CoverView::Stored { url: url.clone() };
        }
        CoverView::Empty
    }
}
