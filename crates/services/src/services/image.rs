use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use db::{
    DBService, DbErr,
    models::{
        image::{CreateImage, Image},
        property::Property,
        unit::Unit,
    },
};
use media::{DEFAULT_QUALITY, EntityKind, TranscodeError, ValidationError};
use thiserror::Error;

use crate::services::storage::{StorageError, StorageService};

const GRACE_HOURS_ENV: &str = "ROOMERY_UPLOAD_GRACE_HOURS";
const DEFAULT_GRACE_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum ImageServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transcode(#[from] TranscodeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Image task failed: {0}")]
    Internal(String),
}

/// A processed upload that made it into storage and the image registry.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub url: String,
    pub bucket: String,
    pub file_path: String,
    pub file_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub width: i32,
    pub height: i32,
}

#[derive(Clone)]
pub struct ImageService {
    db: DBService,
    storage: StorageService,
}

impl ImageService {
    pub fn new(db: DBService, storage: StorageService) -> Self {
        Self { db, storage }
    }

    pub fn storage(&self) -> &StorageService {
        &self.storage
    }

    /// Validates, resizes and re-encodes an upload, writes it to the kind's
    /// bucket and registers it, returning the public URL.
    pub async fn process_upload(
        &self,
        kind: EntityKind,
        original_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredUpload, ImageServiceError> {
        media::validate_image(mime_type, data.len() as u64)?;

        let bounds = kind.recommended_dimensions();
        let name = original_name.to_string();
        let mime = mime_type.to_string();
        let processed = tokio::task::spawn_blocking(move || {
            media::transcode(&name, &mime, &data, bounds, DEFAULT_QUALITY)
        })
        .await
        .map_err(|err| ImageServiceError::Internal(err.to_string()))??;

        let file_name = media::filename::generate_file_name(original_name, kind.file_prefix());
        let file_path = format!("{}/{}", kind.storage_folder(), file_name);
        let bucket = kind.storage_bucket();

        self.storage
            .write(bucket, &file_path, &processed.data)
            .await?;

        let record = Image::create(
            &self.db.pool,
            &CreateImage {
                bucket: bucket.to_string(),
                file_path: file_path.clone(),
                original_name: original_name.to_string(),
                mime_type: processed.mime_type.clone(),
                size_bytes: processed.data.len() as i64,
                width: processed.width as i32,
                height: processed.height as i32,
            },
        )
        .await?;

        let url = self.storage.public_url(bucket, &file_path);
        tracing::info!(
            bucket,
            file_path,
            width = record.width,
            height = record.height,
            "stored upload {original_name} at {url}"
        );

        Ok(StoredUpload {
            url,
            bucket: bucket.to_string(),
            file_path,
            file_name,
            original_name: original_name.to_string(),
            mime_type: record.mime_type,
            size_bytes: record.size_bytes,
            width: record.width,
            height: record.height,
        })
    }

    /// Deletes uploads past the grace period that no property or unit
    /// references any more, both the files and their registry rows.
    pub async fn delete_orphaned_images(&self) -> Result<u64, ImageServiceError> {
        let cutoff = Utc::now() - Duration::hours(grace_hours());
        self.sweep_created_before(cutoff).await
    }

    async fn sweep_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, ImageServiceError> {
        let candidates = Image::find_created_before(&self.db.pool, cutoff).await?;
        if candidates.is_empty() {
            return Ok(0);
        }

        let referenced = self.referenced_suffixes().await?;

        let mut doomed = Vec::new();
        for image in &candidates {
            let suffix = format!("{}/{}", image.bucket, image.file_path);
            if referenced.contains(&suffix) {
                continue;
            }
            if let Err(err) = self.storage.delete(&image.bucket, &image.file_path).await {
                tracing::warn!(
                    "Failed to remove orphaned file {}/{}: {}",
                    image.bucket,
                    image.file_path,
                    err
                );
            }
            doomed.push(image.id);
        }

        let deleted = Image::delete_by_ids(&self.db.pool, &doomed).await?;
        tracing::info!(
            examined = candidates.len(),
            deleted,
            "orphaned image cleanup finished"
        );
        Ok(deleted)
    }

    /// Every `bucket/file_path` suffix still referenced by a live record,
    /// taken from both gallery lists and cover URLs.
    async fn referenced_suffixes(&self) -> Result<HashSet<String>, ImageServiceError> {
        let mut referenced = HashSet::new();

        for property in Property::find_all(&self.db.pool).await? {
            collect_suffixes(&mut referenced, &property.images, property.cover_image_url.as_deref());
        }
        for unit in Unit::find_all(&self.db.pool).await? {
            collect_suffixes(&mut referenced, &unit.images, unit.cover_image_url.as_deref());
        }

        Ok(referenced)
    }
}

fn collect_suffixes(referenced: &mut HashSet<String>, images_raw: &str, cover: Option<&str>) {
    for url in media::urls::parse_image_urls(images_raw) {
        if let Some(suffix) = storage_suffix(&url) {
            referenced.insert(suffix.to_string());
        }
    }
    if let Some(suffix) = cover.and_then(storage_suffix) {
        referenced.insert(suffix.to_string());
    }
}

/// Extracts the `bucket/path` part from a public storage URL, absolute or
/// relative. Non-storage URLs (placeholders, external links) yield None.
fn storage_suffix(url: &str) -> Option<&str> {
    url.split_once("/storage/")
        .map(|(_, suffix)| suffix)
        .filter(|suffix| !suffix.is_empty())
}

fn grace_hours() -> i64 {
    std::env::var(GRACE_HOURS_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|hours| *hours >= 0)
        .unwrap_or(DEFAULT_GRACE_HOURS)
}
