pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (register/login/google are the only unauthenticated ones)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/google", post(routes::auth::google))
        .route("/me", get(routes::auth::me))
        .route("/request-otp", post(routes::auth::request_otp))
        .route("/update-profile", patch(routes::auth::update_profile))
        .route("/users/{user_id}", get(routes::auth::user_profile));

    // Workspace routes; the static /invitations segment takes priority
    // over the {workspace_id} parameter.
    let workspace_routes = Router::new()
        .route("/", get(routes::workspace::list).post(routes::workspace::create))
        .route("/invitations/me", get(routes::invitation::mine))
        .route(
            "/invitations/{invitation_id}/accept",
            post(routes::invitation::accept),
        )
        .route(
            "/invitations/{invitation_id}/decline",
            post(routes::invitation::decline),
        )
        .route(
            "/{workspace_id}",
            get(routes::workspace::get).delete(routes::workspace::delete_or_leave),
        );

    // Member routes (under workspace)
    let member_routes = Router::new()
        .route("/", get(routes::member::list).post(routes::member::invite))
        .route(
            "/{user_id}",
            get(routes::member::get).delete(routes::member::remove),
        );

    // Project routes (under workspace)
    let project_routes = Router::new()
        .route("/", get(routes::project::list).post(routes::project::create))
        .route(
            "/{project_id}",
            patch(routes::project::update).delete(routes::project::delete),
        );

    // Task routes (under workspace/project)
    let task_routes = Router::new()
        .route("/", get(routes::task::list).post(routes::task::create))
        .route(
            "/{task_id}",
            patch(routes::task::update).delete(routes::task::delete),
        );

    // Comment routes (under task)
    let comment_routes = Router::new()
        .route("/", get(routes::comment::list).post(routes::comment::create));

    // Attachment routes (under task)
    let attachment_routes = Router::new()
        .route("/", post(routes::attachment::upload))
        .route("/{attachment_id}", delete(routes::attachment::delete));

    // Compose API
    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/workspaces", workspace_routes)
        .nest("/workspaces/{workspace_id}/members", member_routes)
        .nest("/workspaces/{workspace_id}/projects", project_routes)
        .nest(
            "/workspaces/{workspace_id}/projects/{project_id}/tasks",
            task_routes,
        )
        .nest(
            "/workspaces/{workspace_id}/projects/{project_id}/tasks/{task_id}/comments",
            comment_routes,
        )
        .nest(
            "/workspaces/{workspace_id}/projects/{project_id}/tasks/{task_id}/attachments",
            attachment_routes,
        );

    // Health check
    let health = Router::new().route("/health", get(health_check));

    // Body limit tracks the configured upload cap, with headroom for the
    // multipart framing; the storage layer enforces the exact cap.
    let body_limit =
        DefaultBodyLimit::max(state.settings.storage.max_upload_bytes as usize + 64 * 1024);

    Router::new()
        .nest("/api/v1", api)
        .merge(health)
        .route("/uploads/{*key}", get(routes::file::serve))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
