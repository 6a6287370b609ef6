use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::entities::{address, area, property};

#[derive(Debug, Error)]
pub enum AreaError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Area not found")]
    AreaNotFound,
    #[error("Area still has addresses or properties attached")]
    InUse,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Area {
    pub id: Uuid,
    pub area_name: String,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct CreateArea {
    pub area_name: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct UpdateArea {
    pub area_name: Option<String>,
}

impl Area {
    fn from_model(model: area::Model) -> Self {
        Self {
            id: model.uuid,
            area_name: model.area_name,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = area::Entity::find()
            .order_by_asc(area::Column::AreaName)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = area::Entity::find()
            .filter(area::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateArea,
        area_id: Uuid,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = area::ActiveModel {
            uuid: Set(area_id),
            area_name: Set(data.area_name.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        payload: &UpdateArea,
    ) -> Result<Self, DbErr> {
        let record = area::Entity::find()
            .filter(area::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Area not found".to_string()))?;

        let mut active: area::ActiveModel = record.into();
        if let Some(area_name) = payload.area_name.clone() {
            active.area_name = Set(area_name);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    /// Deletes an area that nothing references. Areas backing addresses or
    /// properties are reported as in use instead of cascading.
    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), AreaError> {
        let record = area::Entity::find()
            .filter(area::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(AreaError::AreaNotFound)?;

        let addresses = address::Entity::find()
            .filter(address::Column::AreaId.eq(record.id))
            .count(db)
            .await?;
        let properties = property::Entity::find()
            .filter(property::Column::AreaId.eq(record.id))
            .count(db)
            .await?;
        if addresses > 0 || properties > 0 {
            return Err(AreaError::InUse);
        }

        area::Entity::delete_many()
            .filter(area::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn create_find_update_delete_roundtrip() {
        let db = setup_db().await;
        let id = Uuid::new_v4();
        let created = Area::create(
            &db,
            &CreateArea {
                area_name: "Canton".to_string(),
            },
            id,
        )
        .await
        .unwrap();
        assert_eq!(created.id, id);

        let fetched = Area::find_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(fetched.area_name, "Canton");

        let updated = Area::update(
            &db,
            id,
            &UpdateArea {
                area_name: Some("Roath".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.area_name, "Roath");

        Area::delete(&db, id).await.unwrap();
        assert!(Area::find_by_id(&db, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_all_sorts_by_name() {
        let db = setup_db().await;
        for name in ["Splott", "Adamsdown", "Heath"] {
            Area::create(
                &db,
                &CreateArea {
                    area_name: name.to_string(),
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap();
        }
        let names: Vec<String> = Area::find_all(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.area_name)
            .collect();
        assert_eq!(names, ["Adamsdown", "Heath", "Splott"]);
    }

    #[tokio::test]
    async fn delete_missing_area_reports_not_found() {
        let db = setup_db().await;
        assert!(matches!(
            Area::delete(&db, Uuid::new_v4()).await.unwrap_err(),
            AreaError::AreaNotFound
        ));
    }
}
