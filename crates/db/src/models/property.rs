use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{
    entities::{address, area, property},
    models::ids,
};

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Property not found")]
    PropertyNotFound,
    #[error("Area not found")]
    AreaNotFound,
    #[error("Address not found")]
    AddressNotFound,
    #[error("Failed to delete property. It may have related units.")]
    UnitsAttached(u64),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Property {
    pub id: Uuid,
    pub name: Option<String>,
    pub area_id: Uuid,
    pub address_id: Uuid,
    pub plus_code: Option<String>,
    pub description: String,
    pub images: String,
    pub cover_image_url: Option<String>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

/// A property with its area and street address joined in for display.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PropertySummary {
    #[serde(flatten)]
    #[ts(flatten)]
    pub property: Property,
    pub area_name: String,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct CreateProperty {
    pub name: Option<String>,
    pub area_id: Uuid,
    pub address_id: Uuid,
    pub plus_code: Option<String>,
    pub description: String,
    pub images: String,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct UpdateProperty {
    pub name: Option<String>,
    pub area_id: Option<Uuid>,
    pub address_id: Option<Uuid>,
    pub plus_code: Option<String>,
    pub description: Option<String>,
    pub images: Option<String>,
    pub cover_image_url: Option<String>,
}

impl Property {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: property::Model,
    ) -> Result<Self, DbErr> {
        let area_uuid = ids::area_uuid_by_id(db, model.area_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Area not found".to_string()))?;
        let address_uuid = ids::address_uuid_by_id(db, model.address_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Address not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            name: model.name,
            area_id: area_uuid,
            address_id: address_uuid,
            plus_code: model.plus_code,
            description: model.description,
            images: model.images,
            cover_image_url: model.cover_image_url,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = property::Entity::find()
            .order_by_desc(property::Column::CreatedAt)
            .all(db)
            .await?;
        let mut properties = Vec::with_capacity(records.len());
        for model in records {
            properties.push(Self::from_model(db, model).await?);
        }
        Ok(properties)
    }

    /// Listing view: every property with its area name and street address.
    pub async fn find_all_with_details<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<PropertySummary>, DbErr> {
        let properties = Self::find_all(db).await?;

        let area_names: HashMap<Uuid, String> = area::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|model| (model.uuid, model.area_name))
            .collect();
        let addresses: HashMap<Uuid, String> = address::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|model| (model.uuid, model.address))
            .collect();

        Ok(properties
            .into_iter()
            .map(|property| {
                let area_name = area_names.get(&property.area_id).cloned().unwrap_or_default();
                let address = addresses
                    .get(&property.address_id)
                    .cloned()
                    .unwrap_or_default();
                PropertySummary {
                    property,
                    area_name,
                    address,
                }
            })
            .collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = property::Entity::find()
            .filter(property::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateProperty,
        property_id: Uuid,
    ) -> Result<Self, PropertyError> {
        let area_row_id = ids::area_id_by_uuid(db, data.area_id)
            .await?
            .ok_or(PropertyError::AreaNotFound)?;
        let address_row_id = ids::address_id_by_uuid(db, data.address_id)
            .await?
            .ok_or(PropertyError::AddressNotFound)?;

        let now = Utc::now();
        let active = property::ActiveModel {
            uuid: Set(property_id),
            name: Set(data.name.clone()),
            area_id: Set(area_row_id),
            address_id: Set(address_row_id),
            plus_code: Set(data.plus_code.clone()),
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
        payload: &UpdateProperty,
    ) -> Result<Self, PropertyError> {
        let record = property::Entity::find()
            .filter(property::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(PropertyError::PropertyNotFound)?;

        let mut active: property::ActiveModel = record.into();
        if let Some(name) = &payload.name {
            active.name = Set(match name.trim() {
                "" => None,
                trimmed => Some(trimmed.to_string()),
            });
        }
        if let Some(area_id) = payload.area_id {
            let area_row_id = ids::area_id_by_uuid(db, area_id)
                .await?
                .ok_or(PropertyError::AreaNotFound)?;
            active.area_id = Set(area_row_id);
        }
        if let Some(address_id) = payload.address_id {
            let address_row_id = ids::address_id_by_uuid(db, address_id)
                .await?
                .ok_or(PropertyError::AddressNotFound)?;
            active.address_id = Set(address_row_id);
        }
        if let Some(plus_code) = &payload.plus_code {
            active.plus_code = Set(match plus_code.trim() {
                "" => None,
                trimmed => Some(trimmed.to_string()),
            });
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
        let result = property::Entity::delete_many()
            .filter(property::Column::Uuid.eq(id))
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
    };

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_location(db: &sea_orm::DatabaseConnection) -> (Uuid, Uuid) {
        let area_id = Uuid::new_v4();
        Area::create(
            db,
            &CreateArea {
                area_name: "Pontcanna".to_string(),
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
                address: "30 Cathedral Road".to_string(),
            },
            address_id,
        )
        .await
        .unwrap();
        (area_id, address_id)
    }

    fn create_payload(area_id: Uuid, address_id: Uuid) -> CreateProperty {
        CreateProperty {
            name: Some("Cathedral House".to_string()),
            area_id,
            address_id,
            plus_code: None,
            description: "Five studio flats over three floors".to_string(),
            images: String::new(),
            cover_image_url: None,
        }
    }

    #[tokio::test]
    async fn create_resolves_references_and_roundtrips() {
        let db = setup_db().await;
        let (area_id, address_id) = seed_location(&db).await;
        let id = Uuid::new_v4();
        let property = Property::create(&db, &create_payload(area_id, address_id), id)
            .await
            .unwrap();
        assert_eq!(property.id, id);
        assert_eq!(property.area_id, area_id);
        assert_eq!(property.address_id, address_id);

        let summaries = Property::find_all_with_details(&db).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].area_name, "Pontcanna");
        assert_eq!(summaries[0].address, "30 Cathedral Road");
    }

    #[tokio::test]
    async fn create_with_unknown_address_fails() {
        let db = setup_db().await;
        let (area_id, _) = seed_location(&db).await;
        let mut payload = create_payload(area_id, Uuid::new_v4());
        payload.address_id = Uuid::new_v4();
        let err = Property::create(&db, &payload, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, PropertyError::AddressNotFound));
    }

    #[tokio::test]
    async fn update_trims_empty_strings_to_null() {
        let db = setup_db().await;
        let (area_id, address_id) = seed_location(&db).await;
        let id = Uuid::new_v4();
        Property::create(&db, &create_payload(area_id, address_id), id)
            .await
            .unwrap();

        let updated = Property::update(
            &db,
            id,
            &UpdateProperty {
                name: Some("  ".to_string()),
                cover_image_url: Some(String::new()),
                images: Some("[\"https://x/properties/a.jpg\"]".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, None);
        assert_eq!(updated.cover_image_url, None);
        assert_eq!(updated.images, "[\"https://x/properties/a.jpg\"]");
    }

    #[tokio::test]
    async fn delete_reports_rows_affected() {
        let db = setup_db().await;
        let (area_id, address_id) = seed_location(&db).await;
        let id = Uuid::new_v4();
        Property::create(&db, &create_payload(area_id, address_id), id)
            .await
            .unwrap();
        assert_eq!(Property::delete(&db, id).await.unwrap(), 1);
        assert_eq!(Property::delete(&db, id).await.unwrap(), 0);
    }
}
