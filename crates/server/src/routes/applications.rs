use axum::{
    Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::{
    DbErr,
    models::{
        address::Address,
        application::{Application, CreateApplication},
        area::Area,
        property::Property,
        unit::{Unit, UnitError},
    },
};
use deployment::Deployment;
use serde::Deserialize;
use services::services::notify::ApplicationNotification;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

pub fn public_router() -> Router<DeploymentImpl> {
    Router::new().route("/applications", post(submit_application))
}

pub fn admin_router() -> Router<DeploymentImpl> {
    Router::new()
        .route("/applications", get(get_applications))
        .route(
            "/applications/{application_id}",
            get(get_application).delete(delete_application),
        )
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct SubmitApplicationRequest {
    pub unit_id: Uuid,
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub current_address: String,
    pub employment_status: String,
    pub monthly_income: f64,
}

/// Inserts the application, then fires the email notification without
/// awaiting it. Notification failures are logged and never surfaced to the
/// applicant.
async fn submit_application(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<SubmitApplicationRequest>,
) -> Result<ResponseJson<ApiResponse<Application>>, ApiError> {
    let pool = &deployment.db().pool;

    let unit = Unit::find_by_id(pool, payload.unit_id)
        .await?
        .ok_or(UnitError::UnitNotFound)?;
    let property = Property::find_by_id(pool, unit.property_id)
        .await?
        .ok_or(DbErr::RecordNotFound("Property not found".to_string()))?;
    let area = Area::find_by_id(pool, property.area_id)
        .await?
        .ok_or(DbErr::RecordNotFound("Area not found".to_string()))?;
    let address = Address::find_by_id(pool, property.address_id)
        .await?
        .ok_or(DbErr::RecordNotFound("Address not found".to_string()))?;

    let property_name = property
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| address.address.clone());

    let data = CreateApplication {
        property_name: property_name.clone(),
        unit_name: unit.unit_name.clone(),
        applicant_name: payload.applicant_name,
        email: payload.email,
        phone: payload.phone,
        date_of_birth: payload.date_of_birth,
        current_address: payload.current_address,
        employment_status: payload.employment_status,
        monthly_income: payload.monthly_income,
    };
    let application = Application::create(pool, &data).await?;

    let endpoint = {
        let config = deployment.config().read().await;
        config.notifications.application_email_endpoint.clone()
    };
    if let Some(endpoint) = endpoint {
        let notify = deployment.notify().clone();
        let notification = ApplicationNotification {
            property_name,
            unit_name: unit.unit_name,
            area_name: area.area_name,
            address: address.address,
            monthly_price: unit.monthly_price,
            applicant_name: application.applicant_name.clone(),
            email: application.email.clone(),
            phone: application.phone.clone(),
            date_of_birth: application.date_of_birth.clone(),
            current_address: application.current_address.clone(),
            employment_status: application.employment_status.clone(),
            monthly_income: application.monthly_income,
        };
        tokio::spawn(async move {
            if let Err(e) = notify.send_application(&endpoint, &notification).await {
                tracing::warn!("Failed to send application notification: {}", e);
            }
        });
    }

    Ok(ResponseJson(ApiResponse::success(application)))
}

async fn get_applications(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Application>>>, ApiError> {
    let applications = Application::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(applications)))
}

async fn get_application(
    State(deployment): State<DeploymentImpl>,
    Path(application_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Application>>, ApiError> {
    let application = Application::find_by_id(&deployment.db().pool, application_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(application)))
}

async fn delete_application(
    State(deployment): State<DeploymentImpl>,
    Path(application_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Application::delete(&deployment.db().pool, application_id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("Application not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}
