use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// MIME types accepted for upload, in the order they are reported to users.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Upload size cap in bytes (5 MiB).
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Encoder quality used when no explicit quality is requested.
pub const DEFAULT_QUALITY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Which listing entity an image belongs to. The kind selects the storage
/// bucket, the filename prefix, the placeholder shown when no image exists
/// and the resize bounds.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[ts(export)]
pub enum EntityKind {
    Property,
    Unit,
}

impl EntityKind {
    pub fn other(&self) -> EntityKind {
        match self {
            EntityKind::Property => EntityKind::Unit,
            EntityKind::Unit => EntityKind::Property,
        }
    }

    /// Default image served when a record has no uploads.
    pub fn placeholder_url(&self) -> &'static str {
        match self {
            EntityKind::Property => {
                "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?w=800&h=600&fit=crop&crop=center"
            }
            EntityKind::Unit => {
                "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?w=800&h=600&fit=crop&crop=center"
            }
        }
    }

    pub fn storage_bucket(&self) -> &'static str {
        match self {
            EntityKind::Property => "property-images",
            EntityKind::Unit => "unit-images",
        }
    }

    pub fn storage_folder(&self) -> &'static str {
        match self {
            EntityKind::Property => "properties",
            EntityKind::Unit => "units",
        }
    }

    pub fn file_prefix(&self) -> &'static str {
        match self {
            EntityKind::Property => "property",
            EntityKind::Unit => "unit",
        }
    }

    /// Substrings that identify this kind's upload URLs. Used when seeding an
    /// edit so one entity's gallery never picks up the other's images.
    pub fn path_markers(&self) -> [&'static str; 2] {
        match self {
            EntityKind::Property => ["property-images", "/properties/"],
            EntityKind::Unit => ["unit-images", "/units/"],
        }
    }

    pub fn recommended_dimensions(&self) -> Dimensions {
        Dimensions {
            width: 800,
            height: 600,
        }
    }
}
