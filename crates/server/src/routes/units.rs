use axum::{
    Extension, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::{
    DbErr,
    models::unit::{Unit, UnitSummary},
};
use deployment::Deployment;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl, error::ApiError, middleware::model_loaders::load_unit_middleware,
    routes::property_deletion,
};

pub fn public_router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let unit_id_router = Router::new()
        .route("/", get(get_unit))
        .layer(from_fn_with_state(deployment.clone(), load_unit_middleware));

    let inner = Router::new()
        .route("/", get(get_units))
        .nest("/{unit_id}", unit_id_router);

    Router::new().nest("/units", inner)
}

pub fn admin_router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let unit_id_router = Router::new()
        .route("/", get(get_unit).delete(delete_unit))
        .layer(from_fn_with_state(deployment.clone(), load_unit_middleware));

    let inner = Router::new()
        .route("/", get(get_units))
        .nest("/{unit_id}", unit_id_router);

    Router::new().nest("/units", inner)
}

pub async fn get_units(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<UnitSummary>>>, ApiError> {
    let units = Unit::find_all_with_details(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(units)))
}

pub async fn get_unit(
    Extension(unit): Extension<Unit>,
) -> Result<ResponseJson<ApiResponse<Unit>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(unit)))
}

async fn delete_unit(
    Extension(unit): Extension<Unit>,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Unit::delete(&deployment.db().pool, unit.id).await?;
    if rows_affected == 0 {
        return Err(ApiError::Database(DbErr::RecordNotFound(
            "Unit not found".to_string(),
        )));
    }

    property_deletion::spawn_image_sweep(&deployment);
    Ok(ResponseJson(ApiResponse::success(())))
}
