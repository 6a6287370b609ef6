use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::entities::image;

/// Registry row for a processed upload sitting in bucketed storage.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Image {
    pub id: Uuid,
    pub bucket: String,
    pub file_path: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub width: i32,
    pub height: i32,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct CreateImage {
    pub bucket: String,
    pub file_path: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub width: i32,
    pub height: i32,
}

impl Image {
    fn from_model(model: image::Model) -> Self {
        Self {
            id: model.uuid,
            bucket: model.bucket,
            file_path: model.file_path,
            original_name: model.original_name,
            mime_type: model.mime_type,
            size_bytes: model.size_bytes,
            width: model.width,
            height: model.height,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn create<C: ConnectionTrait>(db: &C, data: &CreateImage) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = image::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            bucket: Set(data.bucket.clone()),
            file_path: Set(data.file_path.clone()),
            original_name: Set(data.original_name.clone()),
            mime_type: Set(data.mime_type.clone()),
            size_bytes: Set(data.size_bytes),
            width: Set(data.width),
            height: Set(data.height),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = image::Entity::find()
            .filter(image::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_bucket_and_path<C: ConnectionTrait>(
        db: &C,
        bucket: &str,
        file_path: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = image::Entity::find()
            .filter(image::Column::Bucket.eq(bucket))
            .filter(image::Column::FilePath.eq(file_path))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    /// Uploads registered before the cutoff, oldest first. The cleanup pass
    /// checks these against the URLs still referenced by live records.
    pub async fn find_created_before<C: ConnectionTrait>(
        db: &C,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Self>, DbErr> {
        let records = image::Entity::find()
            .filter(image::Column::CreatedAt.lt(cutoff))
            .order_by_asc(image::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = image::Entity::delete_many()
            .filter(image::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_ids<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> Result<u64, DbErr> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = image::Entity::delete_many()
            .filter(image::Column::Uuid.is_in(ids.iter().copied()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn sample(file_path: &str) -> CreateImage {
        CreateImage {
            bucket: "property-images".to_string(),
            file_path: file_path.to_string(),
            original_name: "front.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size_bytes: 48_213,
            width: 800,
            height: 600,
        }
    }

    #[tokio::test]
    async fn create_and_find_by_bucket_and_path() {
        let db = setup_db().await;
        let created = Image::create(&db, &sample("properties/property-1.jpg"))
            .await
            .unwrap();
        let found = Image::find_by_bucket_and_path(&db, "property-images", "properties/property-1.jpg")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.width, 800);
    }

    #[tokio::test]
    async fn find_created_before_respects_cutoff() {
        let db = setup_db().await;
        Image::create(&db, &sample("properties/property-2.jpg"))
            .await
            .unwrap();

        let past = Utc::now() - Duration::hours(1);
        assert!(Image::find_created_before(&db, past).await.unwrap().is_empty());

        let future = Utc::now() + Duration::hours(1);
        assert_eq!(Image::find_created_before(&db, future).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_by_ids_removes_only_listed_rows() {
        let db = setup_db().await;
        let first = Image::create(&db, &sample("properties/property-3.jpg"))
            .await
            .unwrap();
        let second = Image::create(&db, &sample("properties/property-4.jpg"))
            .await
            .unwrap();

        assert_eq!(Image::delete_by_ids(&db, &[first.id]).await.unwrap(), 1);
        assert!(Image::find_by_id(&db, first.id).await.unwrap().is_none());
        assert!(Image::find_by_id(&db, second.id).await.unwrap().is_some());
        assert_eq!(Image::delete_by_ids(&db, &[]).await.unwrap(), 0);
    }
}
