use axum::{
    Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, put},
};
use deployment::Deployment;
use serde::{Deserialize, Serialize};
use services::services::config::{AccessControlMode, Config, save_config_to_file};
use ts_rs::TS;
use utils::{assets::config_path, response::ApiResponse};

use crate::{DeploymentImpl, error::ApiError};

pub fn router() -> Router<DeploymentImpl> {
    Router::new()
        .route("/info", get(get_admin_info))
        .route("/config", put(update_config))
}

/// Host details shown on the console's about panel.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct HostInfo {
    pub os_type: String,
    pub os_version: String,
    pub architecture: String,
}

impl HostInfo {
    fn collect() -> Self {
        let info = os_info::get();
        Self {
            os_type: info.os_type().to_string(),
            os_version: info.version().to_string(),
            architecture: info.architecture().unwrap_or("unknown").to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct AdminInfo {
    pub config: Config,
    pub host: HostInfo,
}

fn redacted(mut config: Config) -> Config {
    config.access_control.token = None;
    config
}

async fn get_admin_info(
    State(deployment): State<DeploymentImpl>,
) -> ResponseJson<ApiResponse<AdminInfo>> {
    let config = redacted(deployment.config().read().await.clone());
    ResponseJson(ApiResponse::success(AdminInfo {
        config,
        host: HostInfo::collect(),
    }))
}

async fn update_config(
    State(deployment): State<DeploymentImpl>,
    Json(new_config): Json<Config>,
) -> Result<ResponseJson<ApiResponse<Config>>, ApiError> {
    // Checked before normalization, which would silently fall back to
    // DISABLED instead of telling the caller what was wrong.
    let token_missing = new_config
        .access_control
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .is_none();
    if matches!(new_config.access_control.mode, AccessControlMode::Token) && token_missing {
        return Err(ApiError::BadRequest(
            "accessControl.token is required when accessControl.mode=TOKEN".to_string(),
        ));
    }

    let new_config = new_config.normalized();
    save_config_to_file(&new_config, &config_path()).await?;
    *deployment.config().write().await = new_config.clone();

    Ok(ResponseJson(ApiResponse::success(redacted(new_config))))
}
