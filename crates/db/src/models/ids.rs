use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::{address, area, image, property, unit};

pub async fn area_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    area::Entity::find()
        .select_only()
        .column(area::Column::Id)
        .filter(area::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn area_uuid_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Uuid>, DbErr> {
    area::Entity::find()
        .select_only()
        .column(area::Column::Uuid)
        .filter(area::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn address_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    address::Entity::find()
        .select_only()
        .column(address::Column::Id)
        .filter(address::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn address_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    address::Entity::find()
        .select_only()
        .column(address::Column::Uuid)
        .filter(address::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn property_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    property::Entity::find()
        .select_only()
        .column(property::Column::Id)
        .filter(property::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn property_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    property::Entity::find()
        .select_only()
        .column(property::Column::Uuid)
        .filter(property::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn unit_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    unit::Entity::find()
        .select_only()
        .column(unit::Column::Id)
        .filter(unit::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn unit_uuid_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Uuid>, DbErr> {
    unit::Entity::find()
        .select_only()
        .column(unit::Column::Uuid)
        .filter(unit::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn image_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    image::Entity::find()
        .select_only()
        .column(image::Column::Id)
        .filter(image::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn image_uuid_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Uuid>, DbErr> {
    image::Entity::find()
        .select_only()
        .column(image::Column::Uuid)
        .filter(image::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use crate::models::{
        address::{Address, CreateAddress},
        area::{Area, CreateArea},
    };

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn ids_roundtrip_and_uuid_resolution() {
        let db = setup_db().await;

        let area_id = Uuid::new_v4();
        let area = Area::create(
            &db,
            &CreateArea {
                area_name: "Grangetown".to_string(),
            },
            area_id,
        )
        .await
        .unwrap();
        assert_eq!(area.id, area_id);

        let area_row_id = area_id_by_uuid(&db, area_id)
            .await
            .unwrap()
            .expect("area row id");
        assert_eq!(
            area_uuid_by_id(&db, area_row_id).await.unwrap(),
            Some(area_id)
        );

        let address_id = Uuid::new_v4();
        let address = Address::create(
            &db,
            &CreateAddress {
                area_id,
                address: "18 Clare Road".to_string(),
            },
            address_id,
        )
        .await
        .unwrap();
        assert_eq!(address.id, address_id);
        assert_eq!(address.area_id, area_id);

        let address_row_id = address_id_by_uuid(&db, address_id)
            .await
            .unwrap()
            .expect("address row id");
        assert_eq!(
            address_uuid_by_id(&db, address_row_id).await.unwrap(),
            Some(address_id)
        );

        assert_eq!(unit_id_by_uuid(&db, Uuid::new_v4()).await.unwrap(), None);
    }
}
