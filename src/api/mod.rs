//! Web API module for tickd

pub mod auth;
pub mod handlers;
pub mod state;

use std::path::Path;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use state::AppState;

/// Routes that require a verified identity
fn task_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::tasks::get_task)
                .patch(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .route("/tasks/{id}/done", post(handlers::tasks::mark_done))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

/// Create the API router (mounted under /api/v1)
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(handlers::version::get_version))
        .route("/health", get(handlers::version::health))
        .merge(task_routes(state.clone()))
        .with_state(state)
}

/// Create the full router, with the front end served from `static_dir` if given
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new().nest("/api/v1", create_api_router(state));

    let router = match static_dir {
        Some(dir) => {
            let index_file = dir.join("index.html");
            let serve_dir = ServeDir::new(dir).not_found_service(ServeFile::new(index_file));
            router.fallback_service(serve_dir)
        }
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).layer(cors)
}

/// Start the web server and run until Ctrl+C / SIGTERM
pub async fn start_server(
    port: u16,
    state: AppState,
    static_dir: Option<&Path>,
) -> std::io::Result<()> {
    let app = create_router(state, static_dir);
    let addr = format!("0.0.0.0:{}", port);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("tickd API server: http://localhost:{}/api/v1", port);
    match static_dir {
        Some(dir) => tracing::info!(dir = %dir.display(), "serving front end at /"),
        None => tracing::info!("no static_dir configured, API only"),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
