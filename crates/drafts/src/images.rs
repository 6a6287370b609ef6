use std::collections::BTreeSet;

use media::EntityKind;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{
    DraftError,
    gallery::{Gallery, PendingImage},
    slot::CoverSlot,
};

/// Image state shared by both record editors: the cover slot, the pending
/// gallery, the record's existing references and the deletion marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DraftImages {
    pub kind: EntityKind,
    pub cover: CoverSlot,
    pub gallery: Gallery,
    pub existing: Vec<String>,
    pub marked_for_deletion: BTreeSet<String>,
}

impl DraftImages {
    pub fn for_create(kind: EntityKind) -> DraftImages {
        DraftImages {
            kind,
            cover: CoverSlot::empty(),
            gallery: Gallery::default(),
            existing: Vec::new(),
            marked_for_deletion: BTreeSet::new(),
        }
    }

    /// Seeds edit state from a record: the existing list keeps only this
    /// kind's references and the cover slot ignores the placeholder.
    pub fn for_edit(kind: EntityKind, images_raw: &str, cover_url: Option<&str>) -> DraftImages {
        DraftImages {
            kind,
            cover: CoverSlot::seeded(cover_url, kind),
            gallery: Gallery::default(),
            existing: media::urls::existing_images_for_edit(images_raw, kind),
            marked_for_deletion: BTreeSet::new(),
        }
    }

    pub fn attach(mut self, entry: PendingImage) -> DraftImages {
        self.gallery = self.gallery.append(entry);
        self
    }

    pub fn remove_attachment(
        mut self,
        index: usize,
    ) -> Result<(DraftImages, PendingImage), DraftError> {
        let (gallery, removed) = self.gallery.remove(index)?;
        self.gallery = gallery;
        Ok((self, removed))
    }

    pub fn select_cover(mut self, entry: PendingImage) -> (DraftImages, Option<PendingImage>) {
        let (cover, superseded) = self.cover.select(entry);
        self.cover = cover;
        (self, superseded)
    }

    pub fn clear_cover(mut self) -> (DraftImages, Option<PendingImage>) {
        let (cover, released) = self.cover.clear();
        self.cover = cover;
        (self, released)
    }

    /// Marks or unmarks an existing reference for deletion. Marking twice is
    /// a no-op pair; nothing is removed until submit.
    pub fn toggle_mark(mut self, url: &str) -> Result<DraftImages, DraftError> {
        if !self.existing.iter().any(|existing| existing == url) {
            return Err(DraftError::UnknownImage);
        }
        if !self.marked_for_deletion.remove(url) {
            self.marked_for_deletion.insert(url.to_string());
        }
        Ok(self)
    }

    /// Existing references that survive the deletion marks, original order.
    pub fn remaining_existing(&self) -> Vec<String> {
        self.existing
            .iter()
            .filter(|url| !self.marked_for_deletion.contains(*url))
            .cloned()
            .collect()
    }

    /// The reference list to persist: surviving existing references followed
    /// by the freshly uploaded ones, both in order.
    pub fn merged_references(&self, uploaded: &[String]) -> Vec<String> {
        let mut merged = self.remaining_existing();
        merged.extend(uploaded.iter().cloned());
        merged
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn entry(name: &str) -> PendingImage {
        PendingImage {
            attachment_id: Uuid::new_v4(),
            file_name: name.to_string(),
            mime_type: "image/webp".to_string(),
            size_bytes: 64,
            width: 800,
            height: 600,
        }
    }

    fn edit_state(urls: &[&str]) -> DraftImages {
        let raw =
            media::urls::stringify_image_urls(&urls.iter().map(|u| u.to_string()).collect::<Vec<_>>());
        DraftImages::for_edit(EntityKind::Property, &raw, None)
    }

    #[test]
    fn toggle_mark_twice_restores_the_image() {
        let state = edit_state(&["https://x/properties/a.jpg", "https://x/properties/b.jpg"]);
        let state = state.toggle_mark("https://x/properties/a.jpg").unwrap();
        assert_eq!(state.remaining_existing(), ["https://x/properties/b.jpg"]);
        let state = state.toggle_mark("https://x/properties/a.jpg").unwrap();
        assert_eq!(
            state.remaining_existing(),
            ["https://x/properties/a.jpg", "https://x/properties/b.jpg"]
        );
    }

    #[test]
    fn marking_unknown_url_is_rejected() {
        let state = edit_state(&["https://x/properties/a.jpg"]);
        assert_eq!(
            state.toggle_mark("https://x/elsewhere.jpg").unwrap_err(),
            DraftError::UnknownImage
        );
    }

    #[test]
    fn merged_references_drop_marks_and_append_uploads() {
        let state = edit_state(&[
            "https://x/properties/a.jpg",
            "https://x/properties/b.jpg",
            "https://x/properties/c.jpg",
        ]);
        let state = state.toggle_mark("https://x/properties/b.jpg").unwrap();
        let merged = state.merged_references(&["https://x/properties/new.jpg".to_string()]);
        assert_eq!(merged.len(), 3);
        assert!(!merged.contains(&"https://x/properties/b.jpg".to_string()));
        assert_eq!(merged.last().unwrap(), "https://x/properties/new.jpg");
        assert_eq!(merged[0], "https://x/properties/a.jpg");
    }

    #[test]
    fn edit_seed_drops_the_other_kinds_references() {
        let raw = media::urls::stringify_image_urls(&[
            "https://x/properties/a.jpg".to_string(),
            "https://x/units/b.jpg".to_string(),
        ]);
        let state = DraftImages::for_edit(EntityKind::Property, &raw, None);
        assert_eq!(state.existing, ["https://x/properties/a.jpg"]);
    }

    #[test]
    fn attach_and_remove_keep_cover_untouched() {
        let state = DraftImages::for_create(EntityKind::Unit)
            .attach(entry("one.webp"))
            .attach(entry("two.webp"));
        let (state, cover_superseded) = state.select_cover(entry("cover.webp"));
        assert!(cover_superseded.is_none());
        let (state, removed) = state.remove_attachment(0).unwrap();
        assert_eq!(removed.file_name, "one.webp");
        assert_eq!(state.gallery.len(), 1);
        assert!(state.cover.pending().is_some());
    }
}
