use db::{
    DbErr, TransactionTrait,
    models::{
        property::{Property, PropertyError},
        unit::Unit,
    },
};
use deployment::Deployment;

use crate::{DeploymentImpl, error::ApiError};

/// Deletes a property, cascading to its units only when the caller asked for
/// it. A plain delete against a property that still has units is rejected so
/// the console can show the cascade confirmation with the exact count.
pub async fn delete_property_with_cleanup(
    deployment: &DeploymentImpl,
    property: Property,
    cascade: bool,
) -> Result<(), ApiError> {
    let pool = &deployment.db().pool;

    let unit_count = Unit::count_by_property_id(pool, property.id).await?;
    if unit_count > 0 && !cascade {
        return Err(ApiError::Property(PropertyError::UnitsAttached(unit_count)));
    }

    let tx = pool.begin().await?;
    let units_removed = Unit::delete_by_property_id(&tx, property.id).await?;
    let rows_affected = Property::delete(&tx, property.id).await?;
    if rows_affected == 0 {
        return Err(ApiError::Database(DbErr::RecordNotFound(
            "Property not found".to_string(),
        )));
    }
    tx.commit().await?;

    if units_removed > 0 {
        tracing::info!(
            "Removed {} units while deleting property {}",
            units_removed,
            property.id
        );
    }

    spawn_image_sweep(deployment);
    Ok(())
}

/// Storage objects belonging to deleted records become orphans; the sweep
/// removes them once they age past the grace period.
pub fn spawn_image_sweep(deployment: &DeploymentImpl) {
    let image = deployment.image().clone();
    tokio::spawn(async move {
        match image.delete_orphaned_images().await {
            Ok(removed) if removed > 0 => {
                tracing::info!("Image sweep removed {} orphaned images", removed);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to clean up orphaned images: {}", e);
            }
        }
    });
}
