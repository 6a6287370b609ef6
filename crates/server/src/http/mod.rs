use axum::{Router, middleware::from_fn_with_state, routing::get};
use deployment::Deployment;
use tower_http::services::ServeDir;

use crate::{DeploymentImpl, routes};

mod auth;
#[cfg(feature = "embed-frontend")]
mod frontend;

pub fn router(deployment: DeploymentImpl) -> Router {
    let public_routes = Router::new()
        .merge(routes::areas::public_router())
        .merge(routes::addresses::public_router())
        .merge(routes::properties::public_router(&deployment))
        .merge(routes::units::public_router(&deployment))
        .merge(routes::applications::public_router());

    let admin_routes = Router::new()
        .merge(routes::config::router())
        .merge(routes::areas::admin_router())
        .merge(routes::addresses::admin_router())
        .merge(routes::properties::admin_router(&deployment))
        .merge(routes::units::admin_router(&deployment))
        .merge(routes::applications::admin_router())
        .nest("/drafts", routes::drafts::router())
        .layer(from_fn_with_state(
            deployment.clone(),
            auth::require_api_auth,
        ));

    let router = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes)
        .nest_service("/storage", ServeDir::new(deployment.storage().root()));

    #[cfg(feature = "embed-frontend")]
    let router = router
        .route("/", get(frontend::serve_frontend_root))
        .route("/{*path}", get(frontend::serve_frontend));

    router.with_state(deployment)
}
