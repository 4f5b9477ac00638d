use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post};
use regiongate_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

#[cfg(test)]
mod tests;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/region-access/effective-regions",
            get(handlers::region_access::effective_regions_handler),
        )
        .route(
            "/region-access/evaluate",
            post(handlers::region_access::evaluate_region_handler),
        )
        .route(
            "/region-grants/permanent",
            get(handlers::region_grants::list_permanent_grants_handler)
                .post(handlers::region_grants::assign_permanent_regions_handler)
                .delete(handlers::region_grants::revoke_permanent_region_handler),
        )
        .route(
            "/region-grants/temporary",
            get(handlers::region_grants::list_temporary_grants_handler)
                .post(handlers::region_grants::create_temporary_grant_handler),
        )
        .route(
            "/region-grants/temporary/{grant_id}",
            delete(handlers::region_grants::revoke_temporary_grant_handler),
        )
        .route(
            "/region-grants/temporary/{grant_id}/extend",
            patch(handlers::region_grants::extend_temporary_grant_handler),
        )
        .route(
            "/region-requests",
            get(handlers::region_requests::list_access_requests_handler)
                .post(handlers::region_requests::create_access_request_handler),
        )
        .route(
            "/region-requests/{request_id}",
            delete(handlers::region_requests::cancel_access_request_handler),
        )
        .route(
            "/region-requests/{request_id}/approve",
            patch(handlers::region_requests::approve_access_request_handler),
        )
        .route(
            "/region-requests/{request_id}/reject",
            patch(handlers::region_requests::reject_access_request_handler),
        )
        .route("/audit-log", get(handlers::audit_log::list_audit_log_handler))
        .route(
            "/audit-log/purge",
            post(handlers::audit_log::purge_audit_log_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
