use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{
    entities::{address, property},
    models::ids,
};

#[derive(Debug, Error)]
pub enum AddressError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Address not found")]
    AddressNotFound,
    #[error("Area not found")]
    AreaNotFound,
    #[error("Address still has properties attached")]
    InUse,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Address {
    pub id: Uuid,
    pub area_id: Uuid,
    pub address: String,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct CreateAddress {
    pub area_id: Uuid,
    pub address: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct UpdateAddress {
    pub area_id: Option<Uuid>,
    pub address: Option<String>,
}

impl Address {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: address::Model,
    ) -> Result<Self, DbErr> {
        let area_uuid = ids::area_uuid_by_id(db, model.area_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Area not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            area_id: area_uuid,
            address: model.address,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = address::Entity::find()
            .order_by_asc(address::Column::Address)
            .all(db)
            .await?;
        let mut addresses = Vec::with_capacity(records.len());
        for model in records {
            addresses.push(Self::from_model(db, model).await?);
        }
        Ok(addresses)
    }

    pub async fn find_by_area_id<C: ConnectionTrait>(
        db: &C,
        area_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let area_row_id = match ids::area_id_by_uuid(db, area_id).await? {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };
        let records = address::Entity::find()
            .filter(address::Column::AreaId.eq(area_row_id))
            .order_by_asc(address::Column::Address)
            .all(db)
            .await?;
        let mut addresses = Vec::with_capacity(records.len());
        for model in records {
            addresses.push(Self::from_model(db, model).await?);
        }
        Ok(addresses)
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = address::Entity::find()
            .filter(address::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateAddress,
        address_id: Uuid,
    ) -> Result<Self, AddressError> {
        let area_row_id = ids::area_id_by_uuid(db, data.area_id)
            .await?
            .ok_or(AddressError::AreaNotFound)?;

        let now = Utc::now();
        let active = address::ActiveModel {
            uuid: Set(address_id),
            area_id: Set(area_row_id),
            address: Set(data.address.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(db, model).await?)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        payload: &UpdateAddress,
    ) -> Result<Self, AddressError> {
        let record = address::Entity::find()
            .filter(address::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(AddressError::AddressNotFound)?;

        let mut active: address::ActiveModel = record.into();
        if let Some(area_id) = payload.area_id {
            let area_row_id = ids::area_id_by_uuid(db, area_id)
                .await?
                .ok_or(AddressError::AreaNotFound)?;
            active.area_id = Set(area_row_id);
        }
        if let Some(addr) = payload.address.clone() {
            active.address = Set(addr);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), AddressError> {
        let record = address::Entity::find()
            .filter(address::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(AddressError::AddressNotFound)?;

        let properties = property::Entity::find()
            .filter(property::Column::AddressId.eq(record.id))
            .count(db)
            .await?;
        if properties > 0 {
            return Err(AddressError::InUse);
        }

        address::Entity::delete_many()
            .filter(address::Column::Uuid.eq(id))
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
    use crate::models::area::{Area, CreateArea};

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn address_resolves_area_uuid() {
        let db = setup_db().await;
        let area_id = Uuid::new_v4();
        Area::create(
            &db,
            &CreateArea {
                area_name: "Cathays".to_string(),
            },
            area_id,
        )
        .await
        .unwrap();

        let address = Address::create(
            &db,
            &CreateAddress {
                area_id,
                address: "12 Woodville Road".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        assert_eq!(address.area_id, area_id);

        let by_area = Address::find_by_area_id(&db, area_id).await.unwrap();
        assert_eq!(by_area.len(), 1);
        assert_eq!(by_area[0].address, "12 Woodville Road");
    }

    #[tokio::test]
    async fn create_with_unknown_area_fails() {
        let db = setup_db().await;
        let err = Address::create(
            &db,
            &CreateAddress {
                area_id: Uuid::new_v4(),
                address: "1 Nowhere Lane".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AddressError::AreaNotFound));
    }
}
