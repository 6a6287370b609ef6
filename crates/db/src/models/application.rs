use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::entities::application;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Application {
    pub id: Uuid,
    pub property_name: String,
    pub unit_name: String,
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub current_address: String,
    pub employment_status: String,
    pub monthly_income: f64,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct CreateApplication {
    pub property_name: String,
    pub unit_name: String,
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub current_address: String,
    pub employment_status: String,
    pub monthly_income: f64,
}

impl From<application::Model> for Application {
    fn from(model: application::Model) -> Self {
        Self {
            id: model.uuid,
            property_name: model.property_name,
            unit_name: model.unit_name,
            applicant_name: model.applicant_name,
            email: model.email,
            phone: model.phone,
            date_of_birth: model.date_of_birth,
            current_address: model.current_address,
            employment_status: model.employment_status,
            monthly_income: model.monthly_income,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl Application {
    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = application::Entity::find()
            .order_by_desc(application::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = application::Entity::find()
            .filter(application::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateApplication,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = application::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            property_name: Set(data.property_name.clone()),
            unit_name: Set(data.unit_name.clone()),
            applicant_name: Set(data.applicant_name.clone()),
            email: Set(data.email.clone()),
            phone: Set(data.phone.clone()),
            date_of_birth: Set(data.date_of_birth.clone()),
            current_address: Set(data.current_address.clone()),
            employment_status: Set(data.employment_status.clone()),
            monthly_income: Set(data.monthly_income),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from(model))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = application::Entity::delete_many()
            .filter(application::Column::Uuid.eq(id))
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

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn sample(applicant: &str) -> CreateApplication {
        CreateApplication {
            property_name: "Tudor House".to_string(),
            unit_name: "Room 2".to_string(),
            applicant_name: applicant.to_string(),
            email: "applicant@example.com".to_string(),
            phone: "07700 900123".to_string(),
            date_of_birth: "1994-03-11".to_string(),
            current_address: "9 Moira Terrace, Cardiff".to_string(),
            employment_status: "Employed full-time".to_string(),
            monthly_income: 2350.0,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_roundtrips() {
        let db = setup_db().await;
        let created = Application::create(&db, &sample("Bethan Price")).await.unwrap();
        let found = Application::find_by_id(&db, created.id).await.unwrap().unwrap();
        assert_eq!(found.applicant_name, "Bethan Price");
        assert_eq!(found.monthly_income, 2350.0);
    }

    #[tokio::test]
    async fn delete_reports_rows_affected() {
        let db = setup_db().await;
        let created = Application::create(&db, &sample("Owen Hart")).await.unwrap();
        assert_eq!(Application::delete(&db, created.id).await.unwrap(), 1);
        assert_eq!(Application::delete(&db, created.id).await.unwrap(), 0);
    }
}
