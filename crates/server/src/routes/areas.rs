use axum::{
    Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::area::{Area, CreateArea, UpdateArea};
use deployment::Deployment;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

pub fn public_router() -> Router<DeploymentImpl> {
    Router::new().route("/areas", get(get_areas))
}

pub fn admin_router() -> Router<DeploymentImpl> {
    Router::new()
        .route("/areas", get(get_areas).post(create_area))
        .route("/areas/{area_id}", put(update_area).delete(delete_area))
}

pub async fn get_areas(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Area>>>, ApiError> {
    let areas = Area::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(areas)))
}

async fn create_area(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateArea>,
) -> Result<ResponseJson<ApiResponse<Area>>, ApiError> {
    let area = Area::create(&deployment.db().pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(area)))
}

async fn update_area(
    State(deployment): State<DeploymentImpl>,
    Path(area_id): Path<Uuid>,
    Json(payload): Json<UpdateArea>,
) -> Result<ResponseJson<ApiResponse<Area>>, ApiError> {
    let area = Area::update(&deployment.db().pool, area_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(area)))
}

async fn delete_area(
    State(deployment): State<DeploymentImpl>,
    Path(area_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Area::delete(&deployment.db().pool, area_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}
