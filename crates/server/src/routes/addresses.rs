use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::address::{Address, CreateAddress, UpdateAddress};
use deployment::Deployment;
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

pub fn public_router() -> Router<DeploymentImpl> {
    Router::new().route("/addresses", get(get_addresses))
}

pub fn admin_router() -> Router<DeploymentImpl> {
    Router::new()
        .route("/addresses", get(get_addresses).post(create_address))
        .route(
            "/addresses/{address_id}",
            put(update_address).delete(delete_address),
        )
}

#[derive(Debug, Deserialize)]
pub struct AddressListQuery {
    pub area_id: Option<Uuid>,
}

pub async fn get_addresses(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<AddressListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Address>>>, ApiError> {
    let addresses = match query.area_id {
        Some(area_id) => Address::find_by_area_id(&deployment.db().pool, area_id).await?,
        None => Address::find_all(&deployment.db().pool).await?,
    };
    Ok(ResponseJson(ApiResponse::success(addresses)))
}

async fn create_address(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateAddress>,
) -> Result<ResponseJson<ApiResponse<Address>>, ApiError> {
    let address = Address::create(&deployment.db().pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(address)))
}

async fn update_address(
    State(deployment): State<DeploymentImpl>,
    Path(address_id): Path<Uuid>,
    Json(payload): Json<UpdateAddress>,
) -> Result<ResponseJson<ApiResponse<Address>>, ApiError> {
    let address = Address::update(&deployment.db().pool, address_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(address)))
}

async fn delete_address(
    State(deployment): State<DeploymentImpl>,
    Path(address_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Address::delete(&deployment.db().pool, address_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}
