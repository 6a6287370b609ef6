use axum::{
    Extension, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    property::{Property, PropertySummary},
    unit::Unit,
};
use deployment::Deployment;
use serde::Deserialize;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl, error::ApiError, middleware::model_loaders::load_property_middleware,
    routes::property_deletion,
};

pub fn public_router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let property_id_router = Router::new()
        .route("/", get(get_property))
        .route("/units", get(get_property_units))
        .layer(from_fn_with_state(
            deployment.clone(),
            load_property_middleware,
        ));

    let inner = Router::new()
        .route("/", get(get_properties))
        .nest("/{property_id}", property_id_router);

    Router::new().nest("/properties", inner)
}

pub fn admin_router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let property_id_router = Router::new()
        .route("/", get(get_property).delete(delete_property))
        .route("/units", get(get_property_units))
        .layer(from_fn_with_state(
            deployment.clone(),
            load_property_middleware,
        ));

    let inner = Router::new()
        .route("/", get(get_properties))
        .nest("/{property_id}", property_id_router);

    Router::new().nest("/properties", inner)
}

pub async fn get_properties(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<PropertySummary>>>, ApiError> {
    let properties = Property::find_all_with_details(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(properties)))
}

pub async fn get_property(
    Extension(property): Extension<Property>,
) -> Result<ResponseJson<ApiResponse<Property>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(property)))
}

pub async fn get_property_units(
    Extension(property): Extension<Property>,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Unit>>>, ApiError> {
    let units = Unit::find_by_property_id(&deployment.db().pool, property.id).await?;
    Ok(ResponseJson(ApiResponse::success(units)))
}

#[derive(Debug, Deserialize)]
pub struct DeletePropertyQuery {
    #[serde(default)]
    pub cascade: bool,
}

async fn delete_property(
    Extension(property): Extension<Property>,
    Query(query): Query<DeletePropertyQuery>,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    property_deletion::delete_property_with_cleanup(&deployment, property, query.cascade).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}
