use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use utils::assets::asset_dir;

pub mod entities;
pub mod models;

pub use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};

#[derive(Clone)]
pub struct DBService {
    pub pool: DatabaseConnection,
}

impl DBService {
    /// Connects to the database named by `DATABASE_URL`, falling back to the
    /// on-disk sqlite file under the asset directory, and runs any pending
    /// migrations.
    pub async fn new() -> Result<DBService, DbErr> {
        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!(
                "sqlite://{}?mode=rwc",
                asset_dir().join("db.sqlite").to_string_lossy()
            )
        });
        Self::new_with_url(&database_url).await
    }

    pub async fn new_with_url(database_url: &str) -> Result<DBService, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_string());
        options.sqlx_logging(false);
        let pool = Database::connect(options).await?;
        db_migration::Migrator::up(&pool, None).await?;
        tracing::debug!("database ready at {database_url}");
        Ok(DBService { pool })
    }
}
