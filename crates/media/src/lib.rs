//! Image upload policy and the processing pipeline shared by the admin
//! console endpoints: validation, resize/compress, naming and the URL
//! bookkeeping stored on listing records.

pub mod filename;
pub mod policy;
pub mod preview;
pub mod transcode;
pub mod urls;
pub mod validate;

pub use policy::{ALLOWED_IMAGE_TYPES, DEFAULT_QUALITY, Dimensions, EntityKind, MAX_FILE_SIZE};
pub use transcode::{ProcessedImage, TranscodeError, probe_dimensions, transcode};
pub use validate::{ValidationError, validate_image};
