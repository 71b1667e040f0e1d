//! HTTP gateway: router assembly and the serve loop.
//!
//! Everything under `/api/v1` except login sits behind the JWT middleware,
//! which resolves the caller's district scope before any handler runs.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth;
use state::AppState;

/// Assemble the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    // `/me` sits behind the JWT layer, `/login` does not.
    let auth_routes = Router::new()
        .route("/me", get(auth::handlers::me))
        .route_layer(from_fn_with_state(
            state.clone(),
            auth::middleware::jwt_auth_middleware,
        ))
        .route("/login", post(auth::handlers::login));

    let protected_routes = Router::new()
        // Transfers
        .route("/transfers", post(handlers::transfers::create_transfer))
        .route("/transfers", get(handlers::transfers::list_pending))
        .route("/transfers/{id}", get(handlers::transfers::get_transfer))
        .route(
            "/transfers/{id}/approve",
            patch(handlers::transfers::approve_transfer),
        )
        .route(
            "/transfers/{id}/reject",
            patch(handlers::transfers::reject_transfer),
        )
        // Students + work samples
        .route("/students", get(handlers::students::list_students))
        .route("/students/{id}", get(handlers::students::get_student))
        .route(
            "/students/{id}/records",
            post(handlers::records::add_work).get(handlers::records::list_work),
        )
        .route(
            "/students/{id}/records/{record_id}/file",
            get(handlers::records::download_work),
        )
        // Classrooms
        .route(
            "/classrooms",
            post(handlers::classrooms::create_classroom)
                .get(handlers::classrooms::list_classrooms),
        )
        .route(
            "/classrooms/{id}",
            get(handlers::classrooms::get_classroom)
                .patch(handlers::classrooms::rename_classroom)
                .delete(handlers::classrooms::delete_classroom),
        )
        .route(
            "/classrooms/{id}/students",
            post(handlers::classrooms::enroll_student).get(handlers::classrooms::roster),
        )
        .route(
            "/classrooms/{id}/students/{student_id}",
            delete(handlers::classrooms::unenroll_student),
        )
        // Directory
        .route("/districts", get(handlers::districts::list_districts))
        .route(
            "/districts/{id}/schools",
            get(handlers::districts::list_schools),
        )
        .layer(from_fn_with_state(
            state.clone(),
            auth::middleware::jwt_auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1", protected_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Gateway listening on http://{}", addr);
    info!("API docs at http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
