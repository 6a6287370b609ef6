use std::collections::HashMap;

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
    entities::{address, property, unit},
    models::ids,
};

#[derive(Debug, Error)]
pub enum UnitError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Unit not found")]
    UnitNotFound,
    #[error("Property not found")]
    PropertyNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Unit {
    pub id: Uuid,
    pub property_id: Uuid,
    pub unit_name: String,
    pub monthly_price: f64,
    pub available: bool,
    pub description: String,
    pub images: String,
    pub cover_image_url: Option<String>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

/// A unit with the display name of the property it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitSummary {
    #[serde(flatten)]
    #[ts(flatten)]
    pub unit: Unit,
    pub property_name: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct CreateUnit {
    pub property_id: Uuid,
    pub unit_name: String,
    pub monthly_price: f64,
    pub available: bool,
    pub description: String,
    pub images: String,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct UpdateUnit {
    pub property_id: Option<Uuid>,
    pub unit_name: Option<String>,
    pub monthly_price: Option<f64>,
    pub available: Option<bool>,
    pub description: Option<String>,
    pub images: Option<String>,
    pub cover_image_url: Option<String>,
}

impl Unit {
    async fn from_model<C: ConnectionTrait>(db: &C, model: unit::Model) -> Result<Self, DbErr> {
        let property_uuid = ids::property_uuid_by_id(db, model.property_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Property not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            property_id: property_uuid,
            unit_name: model.unit_name,
            monthly_price: model.monthly_price,
            available: model.available,
            description: model.description,
            images: model.images,
            cover_image_url: model.cover_image_url,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = unit::Entity::find()
            .order_by_desc(unit::Column::CreatedAt)
            .all(db)
            .await?;
        let mut units = Vec::with_capacity(records.len());
        for model in records {
            units.push(Self::from_model(db, model).await?);
        }
        Ok(units)
    }

    /// Listing view: every unit with the name (or street address) of its property.
    pub async fn find_all_with_details<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<UnitSummary>, DbErr> {
        let units = Self::find_all(db).await?;

        let addresses: HashMap<i64, String> = address::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|model| (model.id, model.address))
            .collect();
        let property_names: HashMap<Uuid, String> = property::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|model| {
                let display = model
                    .name
                    .clone()
                    .filter(|name| !name.trim().is_empty())
                    .or_else(|| addresses.get(&model.address_id).cloned())
                    .unwrap_or_default();
                (model.uuid, display)
            })
            .collect();

        Ok(units
            .into_iter()
            .map(|unit| {
                let property_name = property_names
                    .get(&unit.property_id)
                    .cloned()
                    .unwrap_or_default();
                UnitSummary {
                    unit,
                    property_name,
                }
            })
            .collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = unit::Entity::find()
            .filter(unit::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_property_id<C: ConnectionTrait>(
        db: &C,
        property_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let Some(property_row_id) = ids::property_id_by_uuid(db, property_id).await? else {
            return Ok(Vec::new());
        };
        let records = unit::Entity::find()
            .filter(unit::Column::PropertyId.eq(property_row_id))
            .order_by_desc(unit::Column::CreatedAt)
            .all(db)
            .await?;
        let mut units = Vec::with_capacity(records.len());
        for model in records {
            units.push(Self::from_model(db, model).await?);
        }
        Ok(units)
    }

    pub async fn count_by_property_id<C: ConnectionTrait>(
        db: &C,
        property_id: Uuid,
    ) -> Result<u64, DbErr> {
        let Some(property_row_id) = ids::property_id_by_uuid(db, property_id).await? else {
            return Ok(0);
        };
        unit::Entity::find()
            .filter(unit::Column::PropertyId.eq(property_row_id))
            .count(db)
            .await
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateUnit,
        unit_id: Uuid,
    ) -> Result<Self, UnitError> {
        let property_row_id = ids::property_id_by_uuid(db, data.property_id)
            .await?
            .ok_or(UnitError::PropertyNotFound)?;

        let now = Utc::now();
        let active = unit::ActiveModel {
            uuid: Set(unit_id),
            property_id: Set(property_row_id),
            unit_name: Set(data.unit_name.clone()),
            monthly_price: Set(data.monthly_price),
            available: Set(data.available),
            description: Set(data.description.clone()),
            images: Set(data.images.clone()),
            cover_image_url: Set(data.cover_image_url.clone()),
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
        payload: &UpdateUnit,
    ) -> Result<Self, UnitError> {
        let record = unit::Entity::find()
            .filter(unit::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(UnitError::UnitNotFound)?;

        let mut active: unit::ActiveModel = record.into();
        if let Some(property_id) = payload.property_id {
            let property_row_id = ids::property_id_by_uuid(db, property_id)
                .await?
                .ok_or(UnitError::PropertyNotFound)?;
            active.property_id = Set(property_row_id);
        }
        if let Some(unit_name) = payload.unit_name.clone() {
            active.unit_name = Set(unit_name);
        }
        if let Some(monthly_price) = payload.monthly_price {
            active.monthly_price = Set(monthly_price);
        }
        if let Some(available) = payload.available {
            active.available = Set(available);
        }
        if let Some(description) = payload.description.clone() {
            active.description = Set(description);
        }
        if let Some(images) = payload.images.clone() {
            active.images = Set(images);
        }
        if let Some(cover) = &payload.cover_image_url {
            active.cover_image_url = Set(match cover.trim() {
                "" => None,
                trimmed => Some(trimmed.to_string()),
            });
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = unit::Entity::delete_many()
            .filter(unit::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Removes every unit under a property. Used by the property deletion flow.
    pub async fn delete_by_property_id<C: ConnectionTrait>(
        db: &C,
        property_id: Uuid,
    ) -> Result<u64, DbErr> {
        let Some(property_row_id) = ids::property_id_by_uuid(db, property_id).await? else {
            return Ok(0);
        };
        let result = unit::Entity::delete_many()
            .filter(unit::Column::PropertyId.eq(property_row_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::models::{
        address::{Address, CreateAddress},
        area::{Area, CreateArea},
        property::{CreateProperty, Property},
    };

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_property(db: &sea_orm::DatabaseConnection, name: Option<&str>) -> Uuid {
        // Area names are unique, so each seeded property gets its own area.
        let area_id = Uuid::new_v4();
        Area::create(
            db,
            &CreateArea {
                area_name: format!("Riverside {area_id}"),
            },
            area_id,
        )
        .await
        .unwrap();
        let address_id = Uuid::new_v4();
        Address::create(
            db,
            &CreateAddress {
                area_id,
                address: "5 Tudor Lane".to_string(),
            },
            address_id,
        )
        .await
        .unwrap();
        let property_id = Uuid::new_v4();
        Property::create(
            db,
            &CreateProperty {
                name: name.map(str::to_string),
                area_id,
                address_id,
                plus_code: None,
                description: "Converted townhouse".to_string(),
                images: String::new(),
                cover_image_url: None,
            },
            property_id,
        )
        .await
        .unwrap();
        property_id
    }

    fn create_payload(property_id: Uuid, unit_name: &str) -> CreateUnit {
        CreateUnit {
            property_id,
            unit_name: unit_name.to_string(),
            monthly_price: 725.0,
            available: true,
            description: "Double room with en suite".to_string(),
            images: String::new(),
            cover_image_url: None,
        }
    }

    #[tokio::test]
    async fn create_and_list_by_property() {
        let db = setup_db().await;
        let property_id = seed_property(&db, Some("Tudor House")).await;
        let other_property_id = seed_property(&db, Some("Other House")).await;
        Unit::create(&db, &create_payload(property_id, "Room 1"), Uuid::new_v4())
            .await
            .unwrap();
        Unit::create(&db, &create_payload(property_id, "Room 2"), Uuid::new_v4())
            .await
            .unwrap();
        Unit::create(
            &db,
            &create_payload(other_property_id, "Room 3"),
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let units = Unit::find_by_property_id(&db, property_id).await.unwrap();
        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|unit| unit.property_id == property_id));
        assert_eq!(Unit::count_by_property_id(&db, property_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn summary_falls_back_to_street_address() {
        let db = setup_db().await;
        let property_id = seed_property(&db, None).await;
        Unit::create(&db, &create_payload(property_id, "Room 1"), Uuid::new_v4())
            .await
            .unwrap();

        let summaries = Unit::find_all_with_details(&db).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].property_name, "5 Tudor Lane");
    }

    #[tokio::test]
    async fn delete_by_property_removes_all_units() {
        let db = setup_db().await;
        let property_id = seed_property(&db, Some("Tudor House")).await;
        Unit::create(&db, &create_payload(property_id, "Room 1"), Uuid::new_v4())
            .await
            .unwrap();
        Unit::create(&db, &create_payload(property_id, "Room 2"), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(Unit::delete_by_property_id(&db, property_id).await.unwrap(), 2);
        assert_eq!(Unit::count_by_property_id(&db, property_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_with_unknown_property_fails() {
        let db = setup_db().await;
        let err = Unit::create(&db, &create_payload(Uuid::new_v4(), "Room 1"), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, UnitError::PropertyNotFound));
    }
}
