use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::admin_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let research = Router::new()
        .route("/", post(handlers::research::create_research))
        .route("/{researchId}", get(handlers::research::get_research));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/research", research)
        .route("/history", get(handlers::history::list_history))
        .route("/search", get(handlers::history::search_history))
        .route("/reports", post(handlers::reports::create_report))
        .route(
            "/downloads/{fileName}",
            get(handlers::reports::download_report),
        )
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let admin_routes = Router::new()
        .route(
            "/admin/cache",
            get(handlers::admin::cache_stats).delete(handlers::admin::clear_cache),
        )
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware));

    Router::new().merge(public_routes).merge(admin_routes)
}
