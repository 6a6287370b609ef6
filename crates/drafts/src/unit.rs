use media::EntityKind;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{DraftError, fields::UnitFields, images::DraftImages};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitDraft {
    pub target: Option<Uuid>,
    pub fields: UnitFields,
    pub images: DraftImages,
}

impl UnitDraft {
    pub fn create() -> UnitDraft {
        UnitDraft {
            target: None,
            fields: UnitFields::default(),
            images: DraftImages::for_create(EntityKind::Unit),
        }
    }

    pub fn edit(
        target: Uuid,
        fields: UnitFields,
        images_raw: &str,
        cover_url: Option<&str>,
    ) -> UnitDraft {
        UnitDraft {
            target: Some(target),
            images: DraftImages::for_edit(EntityKind::Unit, images_raw, cover_url),
            fields,
        }
    }

    pub fn with_fields(mut self, fields: UnitFields) -> UnitDraft {
        self.fields = fields;
        self
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        self.fields.validate()
    }

    pub fn cover_to_save(&self, uploaded_cover: Option<&str>) -> Option<String> {
        uploaded_cover
            .map(str::to_string)
            .or_else(|| self.images.cover.stored().map(str::to_string))
    }

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_create_requires_a_name_first() {
        let err = UnitDraft::create().validate().unwrap_err().to_string();
        assert_eq!(err, "Please enter a unit name.");
    }

    #[test]
    fn unit_edit_seed_ignores_property_references() {
        let raw = media::urls::stringify_image_urls(&[
            "https://cdn/property-images/properties/p.jpg".to_string(),
            "https://cdn/unit-images/units/u.jpg".to_string(),
        ]);
        let draft = UnitDraft::edit(Uuid::new_v4(), UnitFields::default(), &raw, None);
        assert_eq!(draft.images.existing, ["https://cdn/unit-images/units/u.jpg"]);
    }

    #[test]
    fn unit_merge_appends_uploads_after_survivors() {
        let raw = media::urls::stringify_image_urls(&[
            "https://cdn/unit-images/units/u1.jpg".to_string(),
            "https://cdn/unit-images/units/u2.jpg".to_string(),
        ]);
        let draft = UnitDraft::edit(Uuid::new_v4(), UnitFields::default(), &raw, None);
        let draft = UnitDraft {
            images: draft
                .images
                .toggle_mark("https://cdn/unit-images/units/u1.jpg")
                .unwrap(),
            ..draft
        };
        let saved = draft.images_to_save(&["https://cdn/unit-images/units/u3.jpg".to_string()]);
        assert_eq!(
            media::urls::parse_image_urls(&saved),
            [
                "https://cdn/unit-images/units/u2.jpg",
                "https://cdn/unit-images/units/u3.jpg"
            ]
        );
    }
}
