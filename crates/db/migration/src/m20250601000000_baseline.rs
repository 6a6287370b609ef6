use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Areas::Table)
                    .col(pk_id_col(manager, Areas::Id))
                    .col(uuid_col(Areas::Uuid))
                    .col(ColumnDef::new(Areas::AreaName).string().not_null())
                    .col(timestamp_col(Areas::CreatedAt))
                    .col(timestamp_col(Areas::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_areas_uuid")
                    .table(Areas::Table)
                    .col(Areas::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_areas_area_name")
                    .table(Areas::Table)
                    .col(Areas::AreaName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Addresses::Table)
                    .col(pk_id_col(manager, Addresses::Id))
                    .col(uuid_col(Addresses::Uuid))
                    .col(fk_id_col(manager, Addresses::AreaId))
                    .col(ColumnDef::new(Addresses::Address).string().not_null())
                    .col(timestamp_col(Addresses::CreatedAt))
                    .col(timestamp_col(Addresses::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_addresses_area_id")
                            .from(Addresses::Table, Addresses::AreaId)
                            .to(Areas::Table, Areas::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_addresses_uuid")
                    .table(Addresses::Table)
                    .col(Addresses::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_addresses_area_id")
                    .table(Addresses::Table)
                    .col(Addresses::AreaId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Properties::Table)
                    .col(pk_id_col(manager, Properties::Id))
                    .col(uuid_col(Properties::Uuid))
                    .col(ColumnDef::new(Properties::Name).string())
                    .col(fk_id_col(manager, Properties::AreaId))
                    .col(fk_id_col(manager, Properties::AddressId))
                    .col(ColumnDef::new(Properties::PlusCode).string())
                    .col(ColumnDef::new(Properties::Description).text().not_null())
                    .col(
                        ColumnDef::new(Properties::Images)
                            .text()
                            .not_null()
                            .default(Expr::val("")),
                    )
                    .col(ColumnDef::new(Properties::CoverImageUrl).string())
                    .col(timestamp_col(Properties::CreatedAt))
                    .col(timestamp_col(Properties::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_properties_area_id")
                            .from(Properties::Table, Properties::AreaId)
                            .to(Areas::Table, Areas::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_properties_address_id")
                            .from(Properties::Table, Properties::AddressId)
                            .to(Addresses::Table, Addresses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_properties_uuid")
                    .table(Properties::Table)
                    .col(Properties::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_properties_area_id")
                    .table(Properties::Table)
                    .col(Properties::AreaId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_properties_address_id")
                    .table(Properties::Table)
                    .col(Properties::AddressId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Units::Table)
                    .col(pk_id_col(manager, Units::Id))
                    .col(uuid_col(Units::Uuid))
                    .col(fk_id_col(manager, Units::PropertyId))
                    .col(ColumnDef::new(Units::UnitName).string().not_null())
                    .col(ColumnDef::new(Units::MonthlyPrice).double().not_null())
                    .col(
                        ColumnDef::new(Units::Available)
                            .boolean()
                            .not_null()
                            .default(Expr::val(true)),
                    )
                    .col(ColumnDef::new(Units::Description).text().not_null())
                    .col(
                        ColumnDef::new(Units::Images)
                            .text()
                            .not_null()
                            .default(Expr::val("")),
                    )
                    .col(ColumnDef::new(Units::CoverImageUrl).string())
                    .col(timestamp_col(Units::CreatedAt))
                    .col(timestamp_col(Units::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_units_property_id")
                            .from(Units::Table, Units::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_units_uuid")
                    .table(Units::Table)
                    .col(Units::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_units_property_id")
                    .table(Units::Table)
                    .col(Units::PropertyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Applications::Table)
                    .col(pk_id_col(manager, Applications::Id))
                    .col(uuid_col(Applications::Uuid))
                    .col(ColumnDef::new(Applications::PropertyName).string().not_null())
                    .col(ColumnDef::new(Applications::UnitName).string().not_null())
                    .col(ColumnDef::new(Applications::ApplicantName).string().not_null())
                    .col(ColumnDef::new(Applications::Email).string().not_null())
                    .col(ColumnDef::new(Applications::Phone).string().not_null())
                    .col(ColumnDef::new(Applications::DateOfBirth).string().not_null())
                    .col(ColumnDef::new(Applications::CurrentAddress).text().not_null())
                    .col(
                        ColumnDef::new(Applications::EmploymentStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Applications::MonthlyIncome).double().not_null())
                    .col(timestamp_col(Applications::CreatedAt))
                    .col(timestamp_col(Applications::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_applications_uuid")
                    .table(Applications::Table)
                    .col(Applications::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Images::Table)
                    .col(pk_id_col(manager, Images::Id))
                    .col(uuid_col(Images::Uuid))
                    .col(ColumnDef::new(Images::Bucket).string().not_null())
                    .col(ColumnDef::new(Images::FilePath).string().not_null())
                    .col(ColumnDef::new(Images::OriginalName).string().not_null())
                    .col(ColumnDef::new(Images::MimeType).string().not_null())
                    .col(ColumnDef::new(Images::SizeBytes).big_integer().not_null())
                    .col(ColumnDef::new(Images::Width).integer().not_null())
                    .col(ColumnDef::new(Images::Height).integer().not_null())
                    .col(timestamp_col(Images::CreatedAt))
                    .col(timestamp_col(Images::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_images_uuid")
                    .table(Images::Table)
                    .col(Images::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_images_bucket_file_path")
                    .table(Images::Table)
                    .col(Images::Bucket)
                    .col(Images::FilePath)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Images::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Applications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Units::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Areas::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Areas {
    Table,
    Id,
    Uuid,
    AreaName,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Addresses {
    Table,
    Id,
    Uuid,
    AreaId,
    Address,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Properties {
    Table,
    Id,
    Uuid,
    Name,
    AreaId,
    AddressId,
    PlusCode,
    Description,
    Images,
    CoverImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Units {
    Table,
    Id,
    Uuid,
    PropertyId,
    UnitName,
    MonthlyPrice,
    Available,
    Description,
    Images,
    CoverImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Applications {
    Table,
    Id,
    Uuid,
    PropertyName,
    UnitName,
    ApplicantName,
    Email,
    Phone,
    DateOfBirth,
    CurrentAddress,
    EmploymentStatus,
    MonthlyIncome,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Images {
    Table,
    Id,
    Uuid,
    Bucket,
    FilePath,
    OriginalName,
    MimeType,
    SizeBytes,
    Width,
    Height,
    CreatedAt,
    UpdatedAt,
}
