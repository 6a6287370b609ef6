use axum::{
    Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{StatusCode, header},
    response::{Json as ResponseJson, Response},
    routing::{delete, get, post, put},
};
use db::models::{
    property::{Property, PropertyError},
    unit::{Unit, UnitError},
};
use deployment::Deployment;
use drafts::{BatchOutcome, PropertyFields, UnitFields};
use serde::Deserialize;
use services::services::drafts::{DraftServiceError, DraftSnapshot, IncomingFile, SubmitOutcome};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

// Batches of gallery files can exceed axum's 2 MB default body limit long
// before any single file trips the per-file size cap.
const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

pub fn router() -> Router<DeploymentImpl> {
    Router::new()
        .route("/properties", post(open_property_create))
        .route("/properties/{property_id}", post(open_property_edit))
        .route("/units", post(open_unit_create))
        .route("/units/{unit_id}", post(open_unit_edit))
        .route("/{draft_id}", get(get_draft).delete(cancel_draft))
        .route("/{draft_id}/fields", put(update_draft_fields))
        .route("/{draft_id}/attachments", post(attach_files))
        .route(
            "/{draft_id}/attachments/{attachment_id}",
            delete(remove_attachment),
        )
        .route(
            "/{draft_id}/attachments/{attachment_id}/preview",
            get(get_attachment_preview),
        )
        .route("/{draft_id}/cover", post(stage_cover).delete(clear_cover))
        .route(
            "/{draft_id}/existing-images/toggle",
            post(toggle_existing_image),
        )
        .route("/{draft_id}/submit", post(submit_draft))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftFieldsPayload {
    Property(PropertyFields),
    Unit(UnitFields),
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct ToggleExistingImageRequest {
    pub url: String,
}

async fn open_property_create(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<DraftSnapshot>>, ApiError> {
    let draft_id = deployment.drafts().open_property_create().await;
    let snapshot = deployment.drafts().snapshot(draft_id).await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

async fn open_property_edit(
    State(deployment): State<DeploymentImpl>,
    Path(property_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<DraftSnapshot>>, ApiError> {
    let property = Property::find_by_id(&deployment.db().pool, property_id)
        .await?
        .ok_or(PropertyError::PropertyNotFound)?;
    let draft_id = deployment.drafts().open_property_edit(&property).await;
    let snapshot = deployment.drafts().snapshot(draft_id).await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

async fn open_unit_create(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<DraftSnapshot>>, ApiError> {
    let draft_id = deployment.drafts().open_unit_create().await;
    let snapshot = deployment.drafts().snapshot(draft_id).await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

async fn open_unit_edit(
    State(deployment): State<DeploymentImpl>,
    Path(unit_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<DraftSnapshot>>, ApiError> {
    let unit = Unit::find_by_id(&deployment.db().pool, unit_id)
        .await?
        .ok_or(UnitError::UnitNotFound)?;
    let draft_id = deployment.drafts().open_unit_edit(&unit).await;
    let snapshot = deployment.drafts().snapshot(draft_id).await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

async fn get_draft(
    State(deployment): State<DeploymentImpl>,
    Path(draft_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<DraftSnapshot>>, ApiError> {
    let snapshot = deployment.drafts().snapshot(draft_id).await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

async fn update_draft_fields(
    State(deployment): State<DeploymentImpl>,
    Path(draft_id): Path<Uuid>,
    Json(payload): Json<DraftFieldsPayload>,
) -> Result<ResponseJson<ApiResponse<DraftSnapshot>>, ApiError> {
    let snapshot = match payload {
        DraftFieldsPayload::Property(fields) => {
            deployment
                .drafts()
                .update_property_fields(draft_id, fields)
                .await?
        }
        DraftFieldsPayload::Unit(fields) => {
            deployment
                .drafts()
                .update_unit_fields(draft_id, fields)
                .await?
        }
    };
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

async fn read_incoming_files(multipart: &mut Multipart) -> Result<Vec<IncomingFile>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let file_name = field.file_name().unwrap_or("image").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?.to_vec();
        files.push(IncomingFile {
            file_name,
            mime_type,
            data,
        });
    }
    Ok(files)
}

/// Stages a batch of gallery files. Per-file rejections come back in the
/// outcome instead of failing the request.
async fn attach_files(
    State(deployment): State<DeploymentImpl>,
    Path(draft_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<BatchOutcome>>, ApiError> {
    let files = read_incoming_files(&mut multipart).await?;
    let outcome = deployment.drafts().attach_files(draft_id, files).await?;
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

async fn stage_cover(
    State(deployment): State<DeploymentImpl>,
    Path(draft_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<BatchOutcome>>, ApiError> {
    let mut files = read_incoming_files(&mut multipart).await?;
    let file = files
        .pop()
        .ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    if !files.is_empty() {
        return Err(ApiError::BadRequest(
            "The cover slot takes a single file".to_string(),
        ));
    }
    let outcome = deployment.drafts().stage_cover(draft_id, file).await?;
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

async fn remove_attachment(
    State(deployment): State<DeploymentImpl>,
    Path((draft_id, attachment_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<DraftSnapshot>>, ApiError> {
    let snapshot = deployment
        .drafts()
        .remove_attachment(draft_id, attachment_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

async fn get_attachment_preview(
    State(deployment): State<DeploymentImpl>,
    Path((draft_id, attachment_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    let (mime_type, path) = deployment.drafts().preview(draft_id, attachment_id).await?;
    let data = tokio::fs::read(&path).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            header::HeaderValue::from_str(&mime_type)
                .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
        )
        .header(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-store"),
        )
        .body(Body::from(data))
        .unwrap();
    Ok(response)
}

async fn clear_cover(
    State(deployment): State<DeploymentImpl>,
    Path(draft_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<DraftSnapshot>>, ApiError> {
    let snapshot = deployment.drafts().clear_cover(draft_id).await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

async fn toggle_existing_image(
    State(deployment): State<DeploymentImpl>,
    Path(draft_id): Path<Uuid>,
    Json(payload): Json<ToggleExistingImageRequest>,
) -> Result<ResponseJson<ApiResponse<DraftSnapshot>>, ApiError> {
    let snapshot = deployment
        .drafts()
        .toggle_existing(draft_id, &payload.url)
        .await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

async fn submit_draft(
    State(deployment): State<DeploymentImpl>,
    Path(draft_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<SubmitOutcome>>, ApiError> {
    let outcome = deployment.drafts().submit(draft_id).await?;
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

async fn cancel_draft(
    State(deployment): State<DeploymentImpl>,
    Path(draft_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if !deployment.drafts().cancel(draft_id).await {
        return Err(DraftServiceError::DraftNotFound.into());
    }
    Ok(ResponseJson(ApiResponse::success(())))
}
