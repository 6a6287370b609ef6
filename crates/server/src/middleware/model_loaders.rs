use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use db::models::{property::Property, unit::Unit};
use deployment::Deployment;
use uuid::Uuid;

use crate::DeploymentImpl;

/// Loads the property named by the path and stashes it as a request
/// extension, so handlers behind this layer take `Extension<Property>`.
pub async fn load_property_middleware(
    State(deployment): State<DeploymentImpl>,
    Path(property_id): Path<Uuid>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let property = Property::find_by_id(&deployment.db().pool, property_id)
        .await
        .map_err(|error| {
            tracing::error!("Failed to fetch Property {property_id}: {error}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or_else(|| {
            tracing::warn!("Property {property_id} not found");
            StatusCode::NOT_FOUND
        })?;
    request.extensions_mut().insert(property);
    Ok(next.run(request).await)
}

pub async fn load_unit_middleware(
    State(deployment): State<DeploymentImpl>,
    Path(unit_id): Path<Uuid>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let unit = Unit::find_by_id(&deployment.db().pool, unit_id)
        .await
        .map_err(|error| {
            tracing::error!("Failed to fetch Unit {unit_id}: {error}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or_else(|| {
            tracing::warn!("Unit {unit_id} not found");
            StatusCode::NOT_FOUND
        })?;
    request.extensions_mut().insert(unit);
    Ok(next.run(request).await)
}
