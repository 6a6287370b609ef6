use media::EntityKind;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{DraftError, fields::PropertyFields, images::DraftImages};

/// Editor state for creating or editing a property. `target` is the record
/// being edited, or `None` for a create draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PropertyDraft {
    pub target: Option<Uuid>,
    pub fields: PropertyFields,
    pub images: DraftImages,
}

impl PropertyDraft {
    pub fn create() -> PropertyDraft {
        PropertyDraft {
            target: None,
            fields: PropertyFields::default(),
            images: DraftImages::for_create(EntityKind::Property),
        }
    }

    pub fn edit(
        target: Uuid,
        fields: PropertyFields,
        images_raw: &str,
        cover_url: Option<&str>,
    ) -> PropertyDraft {
        PropertyDraft {
            target: Some(target),
            images: DraftImages::for_edit(EntityKind::Property, images_raw, cover_url),
            fields,
        }
    }

    pub fn with_fields(mut self, fields: PropertyFields) -> PropertyDraft {
        self.fields = fields;
        self
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        self.fields.validate()
    }

    /// The cover URL to persist once `uploaded_cover` (if any) is stored:
    /// a new upload wins, else the seeded non-placeholder cover survives.
    pub fn cover_to_save(&self, uploaded_cover: Option<&str>) -> Option<String> {
        uploaded_cover
            .map(str::to_string)
            .or_else(|| self.images.cover.stored().map(str::to_string))
    }

    /// The `images` column value. Create drafts fall back to the plain form
    /// field when nothing was uploaded; edit drafts persist the merged list,
    /// or an empty string when nothing remains.
    pub fn images_to_save(&self, uploaded: &[String]) -> String {
        if self.target.is_some() {
            let merged = self.images.merged_references(uploaded);
            if merged.is_empty() {
                String::new()
            } else {
                media::urls::stringify_image_urls(&merged)
            }
        } else if uploaded.is_empty() {
            self.fields.images.clone()
        } else {
            media::urls::stringify_image_urls(uploaded)
        }
    }
}
