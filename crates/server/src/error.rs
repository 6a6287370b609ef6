use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{
    DbErr,
    models::{
        address::AddressError, area::AreaError, property::PropertyError, unit::UnitError,
    },
};
use deployment::DeploymentError;
use media::ValidationError;
use services::services::{
    config::ConfigError,
    drafts::DraftServiceError,
    image::ImageServiceError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error, ts_rs::TS)]
#[ts(type = "string")]
pub enum ApiError {
    #[error(transparent)]
    Area(#[from] AreaError),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error(transparent)]
    Draft(#[from] DraftServiceError),
    #[error(transparent)]
    Image(#[from] ImageServiceError),
    #[error(transparent)]
    Deployment(#[from] DeploymentError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

fn property_error_status(err: &PropertyError) -> StatusCode {
    match err {
        PropertyError::PropertyNotFound => StatusCode::NOT_FOUND,
        PropertyError::AreaNotFound | PropertyError::AddressNotFound => StatusCode::BAD_REQUEST,
        PropertyError::UnitsAttached(_) => StatusCode::CONFLICT,
        PropertyError::Database(DbErr::RecordNotFound(_)) => StatusCode::NOT_FOUND,
        PropertyError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn unit_error_status(err: &UnitError) -> StatusCode {
    match err {
        UnitError::UnitNotFound => StatusCode::NOT_FOUND,
        UnitError::PropertyNotFound => StatusCode::BAD_REQUEST,
        UnitError::Database(DbErr::RecordNotFound(_)) => StatusCode::NOT_FOUND,
        UnitError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn image_error_status(err: &ImageServiceError) -> StatusCode {
    match err {
        ImageServiceError::Validation(ValidationError::TooLarge { .. }) => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        ImageServiceError::Validation(ValidationError::InvalidType { .. }) => {
            StatusCode::BAD_REQUEST
        }
        ImageServiceError::Transcode(_) => StatusCode::BAD_REQUEST,
        ImageServiceError::Database(DbErr::RecordNotFound(_)) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::Area(err) => match err {
                AreaError::AreaNotFound => (StatusCode::NOT_FOUND, "AreaError"),
                AreaError::InUse => (StatusCode::CONFLICT, "AreaError"),
                AreaError::Database(DbErr::RecordNotFound(_)) => {
                    (StatusCode::NOT_FOUND, "AreaError")
                }
                AreaError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "AreaError"),
            },
            ApiError::Address(err) => match err {
                AddressError::AddressNotFound => (StatusCode::NOT_FOUND, "AddressError"),
                AddressError::AreaNotFound => (StatusCode::BAD_REQUEST, "AddressError"),
                AddressError::InUse => (StatusCode::CONFLICT, "AddressError"),
                AddressError::Database(DbErr::RecordNotFound(_)) => {
                    (StatusCode::NOT_FOUND, "AddressError")
                }
                AddressError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "AddressError"),
            },
            ApiError::Property(err) => (property_error_status(err), "PropertyError"),
            ApiError::Unit(err) => (unit_error_status(err), "UnitError"),
            ApiError::Draft(err) => match err {
                DraftServiceError::DraftNotFound | DraftServiceError::AttachmentNotFound => {
                    (StatusCode::NOT_FOUND, "DraftError")
                }
                DraftServiceError::KindMismatch | DraftServiceError::Draft(_) => {
                    (StatusCode::BAD_REQUEST, "DraftError")
                }
                DraftServiceError::Image(inner) => (image_error_status(inner), "DraftError"),
                DraftServiceError::Property(inner) => (property_error_status(inner), "DraftError"),
                DraftServiceError::Unit(inner) => (unit_error_status(inner), "DraftError"),
                DraftServiceError::Database(DbErr::RecordNotFound(_)) => {
                    (StatusCode::NOT_FOUND, "DraftError")
                }
                DraftServiceError::Database(_) | DraftServiceError::Io(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "DraftError")
                }
            },
            ApiError::Image(err) => (image_error_status(err), "ImageError"),
            ApiError::Deployment(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DeploymentError"),
            ApiError::Database(db_err) => match db_err {
                DbErr::RecordNotFound(_) => (StatusCode::NOT_FOUND, "DatabaseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::Config(err) => match err {
                ConfigError::ValidationError(_) => (StatusCode::BAD_REQUEST, "ConfigError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "ConfigError"),
            },
            ApiError::Multipart(_) => (StatusCode::BAD_REQUEST, "MultipartError"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IoError"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "ConflictError"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "ForbiddenError"),
        };

        // Domain error messages are written for the admin console and pass
        // through verbatim; infrastructure errors get a prefixed fallback.
        let error_message = match &self {
            ApiError::Area(_)
            | ApiError::Address(_)
            | ApiError::Property(_)
            | ApiError::Unit(_)
            | ApiError::Draft(_)
            | ApiError::Image(_) => self.to_string(),
            ApiError::Multipart(_) => {
                "Failed to upload file. Please ensure the file is valid and try again.".to_string()
            }
            ApiError::Unauthorized => "Unauthorized. Please sign in again.".to_string(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Internal(msg) => msg.clone(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::Forbidden(msg) => msg.clone(),
            _ => format!("{}: {}", error_type, self),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use media::TranscodeError;

    use super::*;

    #[test]
    fn api_error_maps_to_expected_http_statuses() {
        assert_eq!(
            ApiError::BadRequest("bad".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("missing".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("conflict".to_string())
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal("boom".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_errors_map_to_expected_http_statuses() {
        assert_eq!(
            ApiError::from(AreaError::AreaNotFound)
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AreaError::InUse).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(PropertyError::UnitsAttached(3))
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(UnitError::PropertyNotFound)
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DraftServiceError::DraftNotFound)
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn upload_errors_keep_their_user_facing_statuses() {
        let too_large = ImageServiceError::Validation(ValidationError::TooLarge { max_mb: 5 });
        assert_eq!(
            ApiError::from(too_large).into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );

        let undecodable = ImageServiceError::Transcode(TranscodeError::UnsupportedType(
            "image/tiff".to_string(),
        ));
        assert_eq!(
            ApiError::from(undecodable).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn domain_messages_pass_through_verbatim() {
        assert_eq!(
            ApiError::from(PropertyError::UnitsAttached(2)).to_string(),
            "Failed to delete property. It may have related units."
        );
        assert_eq!(
            ApiError::from(DraftServiceError::DraftNotFound).to_string(),
            "Draft not found"
        );
        assert_eq!(
            ApiError::from(ImageServiceError::Validation(ValidationError::TooLarge {
                max_mb: 5
            }))
            .to_string(),
            "File too large. Maximum size: 5MB"
        );
    }
}
