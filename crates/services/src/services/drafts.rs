use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use db::{
    DBService, DbErr,
    models::{
        property::{CreateProperty, Property, PropertyError, UpdateProperty},
        unit::{CreateUnit, Unit, UnitError, UpdateUnit},
    },
};
use drafts::{
    BatchOutcome, DraftError, DraftImages, PendingImage, PropertyDraft, PropertyFields,
    RejectedFile, UnitDraft, UnitFields,
};
use media::{EntityKind, preview::PreviewHandle};
use serde::Serialize;
use tempfile::TempDir;
use thiserror::Error;
use tokio::sync::RwLock;
use ts_rs::TS;
use uuid::Uuid;

use crate::services::image::{ImageService, ImageServiceError};

#[derive(Debug, Error)]
pub enum DraftServiceError {
    #[error("Draft not found")]
    DraftNotFound,
    #[error("Attachment not found")]
    AttachmentNotFound,
    #[error("Draft does not edit that kind of record")]
    KindMismatch,
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Image(#[from] ImageServiceError),
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One file handed to the draft editor, as it arrived off the wire.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftSnapshot {
    Property { id: Uuid, draft: PropertyDraft },
    Unit { id: Uuid, draft: UnitDraft },
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Property { property: Property },
    Unit { unit: Unit },
}

#[derive(Clone)]
enum DraftKind {
    Property(PropertyDraft),
    Unit(UnitDraft),
}

impl DraftKind {
    fn entity_kind(&self) -> EntityKind {
        match self {
            DraftKind::Property(_) => EntityKind::Property,
            DraftKind::Unit(_) => EntityKind::Unit,
        }
    }

    fn images(&self) -> &DraftImages {
        match self {
            DraftKind::Property(draft) => &draft.images,
            DraftKind::Unit(draft) => &draft.images,
        }
    }

    fn set_images(&mut self, images: DraftImages) {
        match self {
            DraftKind::Property(draft) => draft.images = images,
            DraftKind::Unit(draft) => draft.images = images,
        }
    }

    fn validate(&self) -> Result<(), DraftError> {
        match self {
            DraftKind::Property(draft) => draft.validate(),
            DraftKind::Unit(draft) => draft.validate(),
        }
    }
}

/// Bytes staged for a pending attachment, plus the scratch preview the
/// editor displays. Removing the entry drops the preview file with it.
struct StagedFile {
    file_name: String,
    mime_type: String,
    data: Vec<u8>,
    preview: PreviewHandle,
}

struct DraftSession {
    draft: DraftKind,
    attachments: HashMap<Uuid, StagedFile>,
    opened_at: Instant,
}

struct UploadJob {
    file_name: String,
    mime_type: String,
    data: Vec<u8>,
}

/// In-memory editing sessions for the admin create/edit forms. Nothing a
/// draft does is visible outside the session until submit; walking away from
/// one leaves no record behind.
#[derive(Clone)]
pub struct DraftService {
    db: DBService,
    image: ImageService,
    sessions: Arc<RwLock<HashMap<Uuid, DraftSession>>>,
    scratch: Arc<TempDir>,
}

impl DraftService {
    pub fn new(db: DBService, image: ImageService) -> std::io::Result<Self> {
        let scratch = TempDir::with_prefix("roomery-drafts-")?;
        Ok(Self {
            db,
            image,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            scratch: Arc::new(scratch),
        })
    }

    pub async fn open_property_create(&self) -> Uuid {
        self.insert_session(DraftKind::Property(PropertyDraft::create()))
            .await
    }

    pub async fn open_property_edit(&self, property: &Property) -> Uuid {
        let fields = PropertyFields {
            name: property.name.clone(),
            area_id: Some(property.area_id),
            address_id: Some(property.address_id),
            plus_code: property.plus_code.clone(),
            description: property.description.clone(),
            images: property.images.clone(),
        };
        let draft = PropertyDraft::edit(
            property.id,
            fields,
            &property.images,
            property.cover_image_url.as_deref(),
        );
        self.insert_session(DraftKind::Property(draft)).await
    }

    pub async fn open_unit_create(&self) -> Uuid {
        self.insert_session(DraftKind::Unit(UnitDraft::create()))
            .await
    }

    pub async fn open_unit_edit(&self, unit: &Unit) -> Uuid {
        let fields = UnitFields {
            property_id: Some(unit.property_id),
            unit_name: unit.unit_name.clone(),
            monthly_price: Some(unit.monthly_price),
            available: unit.available,
            description: unit.description.clone(),
            images: unit.images.clone(),
        };
        let draft = UnitDraft::edit(unit.id, fields, &unit.images, unit.cover_image_url.as_deref());
        self.insert_session(DraftKind::Unit(draft)).await
    }

    async fn insert_session(&self, draft: DraftKind) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(
            id,
            DraftSession {
                draft,
                attachments: HashMap::new(),
                opened_at: Instant::now(),
            },
        );
        id
    }

    pub async fn snapshot(&self, id: Uuid) -> Result<DraftSnapshot, DraftServiceError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(DraftServiceError::DraftNotFound)?;
        Ok(snapshot_of(id, &session.draft))
    }

    pub async fn update_property_fields(
        &self,
        id: Uuid,
        fields: PropertyFields,
    ) -> Result<DraftSnapshot, DraftServiceError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(DraftServiceError::DraftNotFound)?;
        match &mut session.draft {
            DraftKind::Property(draft) => draft.fields = fields,
            DraftKind::Unit(_) => return Err(DraftServiceError::KindMismatch),
        }
        Ok(snapshot_of(id, &session.draft))
    }

    pub async fn update_unit_fields(
        &self,
        id: Uuid,
        fields: UnitFields,
    ) -> Result<DraftSnapshot, DraftServiceError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(DraftServiceError::DraftNotFound)?;
        match &mut session.draft {
            DraftKind::Unit(draft) => draft.fields = fields,
            DraftKind::Property(_) => return Err(DraftServiceError::KindMismatch),
        }
        Ok(snapshot_of(id, &session.draft))
    }

    /// Stages a batch of gallery files. Files failing validation or decoding
    /// are reported per-file; the rest of the batch still lands.
    pub async fn attach_files(
        &self,
        id: Uuid,
        files: Vec<IncomingFile>,
    ) -> Result<BatchOutcome, DraftServiceError> {
        if !self.sessions.read().await.contains_key(&id) {
            return Err(DraftServiceError::DraftNotFound);
        }

        let prepared = prepare_batch(files).await?;

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(DraftServiceError::DraftNotFound)?;

        let mut outcome = BatchOutcome::default();
        for item in prepared {
            match item {
                Ok((file, width, height)) => {
                    let entry = self.stage_file(session, file, width, height)?;
                    session.draft.set_images(
                        session.draft.images().clone().attach(entry.clone()),
                    );
                    outcome.accepted.push(entry);
                }
                Err(rejected) => outcome.rejected.push(rejected),
            }
        }
        Ok(outcome)
    }

    /// Stages a single file into the cover slot, superseding any cover
    /// staged before it.
    pub async fn stage_cover(
        &self,
        id: Uuid,
        file: IncomingFile,
    ) -> Result<BatchOutcome, DraftServiceError> {
        if !self.sessions.read().await.contains_key(&id) {
            return Err(DraftServiceError::DraftNotFound);
        }

        let mut prepared = prepare_batch(vec![file]).await?;
        let item = prepared.pop().ok_or(DraftServiceError::AttachmentNotFound)?;

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(DraftServiceError::DraftNotFound)?;

        let mut outcome = BatchOutcome::default();
        match item {
            Ok((file, width, height)) => {
                let entry = self.stage_file(session, file, width, height)?;
                let (images, superseded) =
                    session.draft.images().clone().select_cover(entry.clone());
                session.draft.set_images(images);
                if let Some(old) = superseded {
                    session.attachments.remove(&old.attachment_id);
                }
                outcome.accepted.push(entry);
            }
            Err(rejected) => outcome.rejected.push(rejected),
        }
        Ok(outcome)
    }

    fn stage_file(
        &self,
        session: &mut DraftSession,
        file: IncomingFile,
        width: u32,
        height: u32,
    ) -> Result<PendingImage, DraftServiceError> {
        let attachment_id = Uuid::new_v4();
        let preview = PreviewHandle::create(self.scratch.path(), attachment_id, &file.data)?;
        let entry = PendingImage {
            attachment_id,
            file_name: file.file_name.clone(),
            mime_type: file.mime_type.clone(),
            size_bytes: file.data.len() as u64,
            width,
            height,
        };
        session.attachments.insert(
            attachment_id,
            StagedFile {
                file_name: file.file_name,
                mime_type: file.mime_type,
                data: file.data,
                preview,
            },
        );
        Ok(entry)
    }

    pub async fn remove_attachment(
        &self,
        id: Uuid,
        attachment_id: Uuid,
    ) -> Result<DraftSnapshot, DraftServiceError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(DraftServiceError::DraftNotFound)?;

        let images = session.draft.images().clone();
        let index = images
            .gallery
            .entries()
            .iter()
            .position(|entry| entry.attachment_id == attachment_id)
            .ok_or(DraftServiceError::AttachmentNotFound)?;
        let (images, removed) = images.remove_attachment(index)?;
        session.draft.set_images(images);
        session.attachments.remove(&removed.attachment_id);
        Ok(snapshot_of(id, &session.draft))
    }

    pub async fn clear_cover(&self, id: Uuid) -> Result<DraftSnapshot, DraftServiceError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(DraftServiceError::DraftNotFound)?;

        let (images, released) = session.draft.images().clone().clear_cover();
        session.draft.set_images(images);
        if let Some(entry) = released {
            session.attachments.remove(&entry.attachment_id);
        }
        Ok(snapshot_of(id, &session.draft))
    }

    /// Marks or unmarks one of the record's existing images for deletion.
    pub async fn toggle_existing(
        &self,
        id: Uuid,
        url: &str,
    ) -> Result<DraftSnapshot, DraftServiceError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(DraftServiceError::DraftNotFound)?;

        let images = session.draft.images().clone().toggle_mark(url)?;
        session.draft.set_images(images);
        Ok(snapshot_of(id, &session.draft))
    }

    /// The scratch preview for a staged attachment, served to the editor.
    pub async fn preview(
        &self,
        id: Uuid,
        attachment_id: Uuid,
    ) -> Result<(String, PathBuf), DraftServiceError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(DraftServiceError::DraftNotFound)?;
        let staged = session
            .attachments
            .get(&attachment_id)
            .ok_or(DraftServiceError::AttachmentNotFound)?;
        Ok((staged.mime_type.clone(), staged.preview.path().to_path_buf()))
    }

    /// Validates, uploads cover then gallery, and persists the record. The
    /// session is consumed only on success; a failed submit leaves it intact
    /// so the user can retry.
    pub async fn submit(&self, id: Uuid) -> Result<SubmitOutcome, DraftServiceError> {
        let (draft, cover_job, gallery_jobs) = {
            let sessions = self.sessions.read().await;
            let session = sessions.get(&id).ok_or(DraftServiceError::DraftNotFound)?;
            session.draft.validate()?;

            let cover_job = match session.draft.images().cover.pending() {
                Some(entry) => Some(upload_job(session, entry)?),
                None => None,
            };
            let mut gallery_jobs = Vec::new();
            for entry in session.draft.images().gallery.entries() {
                gallery_jobs.push(upload_job(session, entry)?);
            }
            (session.draft.clone(), cover_job, gallery_jobs)
        };

        let kind = draft.entity_kind();
        let uploaded_cover = match cover_job {
            Some(job) => Some(
                self.image
                    .process_upload(kind, &job.file_name, &job.mime_type, job.data)
                    .await?
                    .url,
            ),
            None => None,
        };
        let mut uploaded = Vec::with_capacity(gallery_jobs.len());
        for job in gallery_jobs {
            let stored = self
                .image
                .process_upload(kind, &job.file_name, &job.mime_type, job.data)
                .await?;
            uploaded.push(stored.url);
        }

        let outcome = match &draft {
            DraftKind::Property(property_draft) => {
                let record = self
                    .persist_property(property_draft, uploaded_cover.as_deref(), &uploaded)
                    .await?;
                SubmitOutcome::Property { property: record }
            }
            DraftKind::Unit(unit_draft) => {
                let record = self
                    .persist_unit(unit_draft, uploaded_cover.as_deref(), &uploaded)
                    .await?;
                SubmitOutcome::Unit { unit: record }
            }
        };

        self.sessions.write().await.remove(&id);
        Ok(outcome)
    }

    async fn persist_property(
        &self,
        draft: &PropertyDraft,
        uploaded_cover: Option<&str>,
        uploaded: &[String],
    ) -> Result<Property, DraftServiceError> {
        let images = draft.images_to_save(uploaded);
        let cover = draft.cover_to_save(uploaded_cover);
        let fields = &draft.fields;

        let record = match draft.target {
            Some(target) => {
                Property::update(
                    &self.db.pool,
                    target,
                    &UpdateProperty {
                        name: Some(fields.name.clone().unwrap_or_default()),
                        area_id: fields.area_id,
                        address_id: fields.address_id,
                        plus_code: Some(fields.plus_code.clone().unwrap_or_default()),
                        description: Some(fields.description.clone()),
                        images: Some(images),
                        cover_image_url: Some(cover.unwrap_or_default()),
                    },
                )
                .await?
            }
            None => {
                let data = CreateProperty {
                    name: fields.name.clone().filter(|name| !name.trim().is_empty()),
                    area_id: fields
                        .area_id
                        .ok_or(DraftError::MissingField("Please select an area."))?,
                    address_id: fields
                        .address_id
                        .ok_or(DraftError::MissingField("Please select an address."))?,
                    plus_code: fields
                        .plus_code
                        .clone()
                        .filter(|code| !code.trim().is_empty()),
                    description: fields.description.clone(),
                    images,
                    cover_image_url: cover,
                };
                Property::create(&self.db.pool, &data, Uuid::new_v4()).await?
            }
        };
        Ok(record)
    }

    async fn persist_unit(
        &self,
        draft: &UnitDraft,
        uploaded_cover: Option<&str>,
        uploaded: &[String],
    ) -> Result<Unit, DraftServiceError> {
        let images = draft.images_to_save(uploaded);
        let cover = draft.cover_to_save(uploaded_cover);
        let fields = &draft.fields;

        let record = match draft.target {
            Some(target) => {
                Unit::update(
                    &self.db.pool,
                    target,
                    &UpdateUnit {
                        property_id: fields.property_id,
                        unit_name: Some(fields.unit_name.clone()),
                        monthly_price: fields.monthly_price,
                        available: Some(fields.available),
                        description: Some(fields.description.clone()),
                        images: Some(images),
                        cover_image_url: Some(cover.unwrap_or_default()),
                    },
                )
                .await?
            }
            None => {
                let data = CreateUnit {
                    property_id: fields
                        .property_id
                        .ok_or(DraftError::MissingField("Please select a property."))?,
                    unit_name: fields.unit_name.clone(),
                    monthly_price: fields
                        .monthly_price
                        .ok_or(DraftError::MissingField("Please enter a monthly price."))?,
                    available: fields.available,
                    description: fields.description.clone(),
                    images,
                    cover_image_url: cover,
                };
                Unit::create(&self.db.pool, &data, Uuid::new_v4()).await?
            }
        };
        Ok(record)
    }

    /// Discards a session and every preview staged under it.
    pub async fn cancel(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drops sessions older than `max_age`. Returns how many went.
    pub async fn purge_expired(&self, max_age: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.opened_at.elapsed() <= max_age);
        before - sessions.len()
    }
}

fn snapshot_of(id: Uuid, draft: &DraftKind) -> DraftSnapshot {
    match draft {
        DraftKind::Property(draft) => DraftSnapshot::Property {
            id,
            draft: draft.clone(),
        },
        DraftKind::Unit(draft) => DraftSnapshot::Unit {
            id,
            draft: draft.clone(),
        },
    }
}

fn upload_job(session: &DraftSession, entry: &PendingImage) -> Result<UploadJob, DraftServiceError> {
    let staged = session
        .attachments
        .get(&entry.attachment_id)
        .ok_or(DraftServiceError::AttachmentNotFound)?;
    Ok(UploadJob {
        file_name: staged.file_name.clone(),
        mime_type: staged.mime_type.clone(),
        data: staged.data.clone(),
    })
}

type PreparedFile = Result<(IncomingFile, u32, u32), RejectedFile>;

/// Validates and probes a batch off the runtime thread. Order is preserved.
async fn prepare_batch(files: Vec<IncomingFile>) -> Result<Vec<PreparedFile>, DraftServiceError> {
    tokio::task::spawn_blocking(move || files.into_iter().map(prepare_file).collect())
        .await
        .map_err(|err| DraftServiceError::Image(ImageServiceError::Internal(err.to_string())))
}

fn prepare_file(file: IncomingFile) -> PreparedFile {
    if let Err(err) = media::validate_image(&file.mime_type, file.data.len() as u64) {
        return Err(RejectedFile {
            file_name: file.file_name,
            reason: err.to_string(),
        });
    }
    match media::probe_dimensions(&file.data) {
        Ok((width, height)) => Ok((file, width, height)),
        Err(err) => Err(RejectedFile {
            file_name: file.file_name,
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use db::models::{
        address::{Address, CreateAddress},
        area::{Area, CreateArea},
    };
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    use super::*;
    use crate::services::storage::StorageService;

    fn png_file(name: &str, width: u32, height: u32) -> IncomingFile {
        let img = RgbaImage::from_pixel(width, height, Rgba([90, 40, 200, 255]));
        let mut buffer = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        IncomingFile {
            file_name: name.to_string(),
            mime_type: "image/png".to_string(),
            data: buffer.into_inner(),
        }
    }

    async fn setup() -> (tempfile::TempDir, DraftService) {
        let db = DBService::new_with_url("sqlite::memory:").await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path()).unwrap();
        let image = ImageService::new(db.clone(), storage);
        let service = DraftService::new(db, image).unwrap();
        (dir, service)
    }

    async fn seed_location(service: &DraftService) -> (Uuid, Uuid) {
        let area_id = Uuid::new_v4();
        Area::create(
            &service.db.pool,
            &CreateArea {
                area_name: "Cathays".to_string(),
            },
            area_id,
        )
        .await
        .unwrap();
        let address_id = Uuid::new_v4();
        Address::create(
            &service.db.pool,
            &CreateAddress {
                area_id,
                address: "7 Colum Road".to_string(),
            },
            address_id,
        )
        .await
        .unwrap();
        (area_id, address_id)
    }

    #[tokio::test]
    async fn batch_attach_keeps_good_files_and_reports_bad_ones() {
        let (_dir, service) = setup().await;
        let id = service.open_property_create().await;

        let oversized = IncomingFile {
            file_name: "huge.png".to_string(),
            mime_type: "image/png".to_string(),
            data: vec![0u8; 6 * 1024 * 1024],
        };
        let outcome = service
            .attach_files(id, vec![png_file("ok.png", 40, 30), oversized])
            .await
            .unwrap();

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].file_name, "ok.png");
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(
            outcome.rejected[0].reason,
            "File too large. Maximum size: 5MB"
        );

        match service.snapshot(id).await.unwrap() {
            DraftSnapshot::Property { draft, .. } => {
                assert_eq!(draft.images.gallery.len(), 1);
            }
            DraftSnapshot::Unit { .. } => panic!("expected a property draft"),
        }
    }

    #[tokio::test]
    async fn undecodable_file_is_rejected_with_load_message() {
        let (_dir, service) = setup().await;
        let id = service.open_property_create().await;

        let outcome = service
            .attach_files(
                id,
                vec![IncomingFile {
                    file_name: "broken.png".to_string(),
                    mime_type: "image/png".to_string(),
                    data: b"not an image".to_vec(),
                }],
            )
            .await
            .unwrap();

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected[0].reason, "Failed to load image");
    }

    #[tokio::test]
    async fn attach_to_unknown_draft_fails() {
        let (_dir, service) = setup().await;
        let err = service
            .attach_files(Uuid::new_v4(), vec![png_file("a.png", 10, 10)])
            .await
            .unwrap_err();
        assert!(matches!(err, DraftServiceError::DraftNotFound));
    }

    #[tokio::test]
    async fn staging_a_new_cover_supersedes_the_old_one() {
        let (_dir, service) = setup().await;
        let id = service.open_property_create().await;

        let first = service
            .stage_cover(id, png_file("first.png", 20, 20))
            .await
            .unwrap()
            .accepted[0]
            .clone();
        let second = service
            .stage_cover(id, png_file("second.png", 20, 20))
            .await
            .unwrap()
            .accepted[0]
            .clone();

        assert!(service.preview(id, second.attachment_id).await.is_ok());
        let err = service.preview(id, first.attachment_id).await.unwrap_err();
        assert!(matches!(err, DraftServiceError::AttachmentNotFound));
    }

    #[tokio::test]
    async fn removing_an_attachment_unlinks_its_preview() {
        let (_dir, service) = setup().await;
        let id = service.open_property_create().await;
        let entry = service
            .attach_files(id, vec![png_file("room.png", 16, 16)])
            .await
            .unwrap()
            .accepted[0]
            .clone();

        let (_, preview_path) = service.preview(id, entry.attachment_id).await.unwrap();
        assert!(preview_path.exists());

        service
            .remove_attachment(id, entry.attachment_id)
            .await
            .unwrap();
        assert!(!preview_path.exists());
    }

    #[tokio::test]
    async fn create_submit_uploads_cover_then_gallery_and_persists() {
        let (_dir, service) = setup().await;
        let (area_id, address_id) = seed_location(&service).await;

        let id = service.open_property_create().await;
        service
            .update_property_fields(
                id,
                PropertyFields {
                    name: Some("Colum House".to_string()),
                    area_id: Some(area_id),
                    address_id: Some(address_id),
                    plus_code: None,
                    description: "Edwardian conversion".to_string(),
                    images: String::new(),
                },
            )
            .await
            .unwrap();
        service
            .stage_cover(id, png_file("cover.png", 1000, 1000))
            .await
            .unwrap();
        service
            .attach_files(id, vec![png_file("hall.png", 30, 30)])
            .await
            .unwrap();

        let outcome = service.submit(id).await.unwrap();
        let property = match outcome {
            SubmitOutcome::Property { property } => property,
            SubmitOutcome::Unit { .. } => panic!("expected a property"),
        };

        let cover = property.cover_image_url.clone().unwrap();
        assert!(cover.starts_with("/storage/property-images/properties/"));
        let gallery = media::urls::parse_image_urls(&property.images);
        assert_eq!(gallery.len(), 1);
        assert_ne!(gallery[0], cover);

        let err = service.snapshot(id).await.unwrap_err();
        assert!(matches!(err, DraftServiceError::DraftNotFound));
    }

    #[tokio::test]
    async fn failed_validation_keeps_the_session_for_another_try() {
        let (_dir, service) = setup().await;
        let id = service.open_property_create().await;

        let err = service.submit(id).await.unwrap_err();
        assert_eq!(err.to_string(), "Please select an area.");
        assert!(service.snapshot(id).await.is_ok());
    }

    #[tokio::test]
    async fn edit_submit_merges_survivors_and_new_uploads() {
        let (_dir, service) = setup().await;
        let (area_id, address_id) = seed_location(&service).await;
        let property = Property::create(
            &service.db.pool,
            &CreateProperty {
                name: Some("Corner House".to_string()),
                area_id,
                address_id,
                plus_code: None,
                description: "Three storey end terrace".to_string(),
                images: media::urls::stringify_image_urls(&[
                    "/storage/property-images/properties/old-a.jpg".to_string(),
                    "/storage/property-images/properties/old-b.jpg".to_string(),
                ]),
                cover_image_url: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let id = service.open_property_edit(&property).await;
        service
            .toggle_existing(id, "/storage/property-images/properties/old-a.jpg")
            .await
            .unwrap();
        service
            .attach_files(id, vec![png_file("new.png", 25, 25)])
            .await
            .unwrap();

        let outcome = service.submit(id).await.unwrap();
        let updated = match outcome {
            SubmitOutcome::Property { property } => property,
            SubmitOutcome::Unit { .. } => panic!("expected a property"),
        };

        let urls = media::urls::parse_image_urls(&updated.images);
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], "/storage/property-images/properties/old-b.jpg");
        assert!(urls[1].starts_with("/storage/property-images/properties/property_"));
    }

    #[tokio::test]
    async fn unit_create_submit_persists_under_its_property() {
        let (_dir, service) = setup().await;
        let (area_id, address_id) = seed_location(&service).await;
        let property = Property::create(
            &service.db.pool,
            &CreateProperty {
                name: Some("Colum House".to_string()),
                area_id,
                address_id,
                plus_code: None,
                description: "Edwardian conversion".to_string(),
                images: String::new(),
                cover_image_url: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let id = service.open_unit_create().await;
        service
            .update_unit_fields(
                id,
                UnitFields {
                    property_id: Some(property.id),
                    unit_name: "Room 2".to_string(),
                    monthly_price: Some(650.0),
                    available: true,
                    description: "Rear double with bay window".to_string(),
                    images: String::new(),
                },
            )
            .await
            .unwrap();

        let outcome = service.submit(id).await.unwrap();
        let unit = match outcome {
            SubmitOutcome::Unit { unit } => unit,
            SubmitOutcome::Property { .. } => panic!("expected a unit"),
        };
        assert_eq!(unit.property_id, property.id);
        assert_eq!(unit.monthly_price, 650.0);
    }

    #[tokio::test]
    async fn cancel_and_expiry_drop_sessions() {
        let (_dir, service) = setup().await;
        let id = service.open_property_create().await;
        assert!(service.cancel(id).await);
        assert!(!service.cancel(id).await);

        service.open_property_create().await;
        service.open_unit_create().await;
        assert_eq!(service.purge_expired(Duration::ZERO).await, 2);
    }
}
