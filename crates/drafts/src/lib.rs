//! Pure draft state for the admin record editors. Every type here is a
//! value object and every transition returns a new value; sessions, preview
//! files and uploads live in the services layer.

pub mod fields;
pub mod gallery;
pub mod images;
pub mod property;
pub mod slot;
pub mod unit;

use thiserror::Error;

pub use fields::{PropertyFields, UnitFields};
pub use gallery::{BatchOutcome, Gallery, PendingImage, RejectedFile};
pub use images::DraftImages;
pub use property::PropertyDraft;
pub use slot::{CoverSlot, CoverView};
pub use unit::UnitDraft;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{0}")]
    MissingField(&'static str),
    #[error("Image index {0} is out of range")]
    IndexOutOfRange(usize),
    #[error("That image does not belong to this record")]
    UnknownImage,
}
