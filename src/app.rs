use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::AppConfig,
    notes,
    state::{NotesState, UsersState},
    users,
};

pub fn notes_app(state: NotesState) -> Router {
    let app = notes::router()
        .merge(liveness_routes::<NotesState>(
            "Welcome to the Notes Service!",
            "notes-service",
        ))
        .with_state(state);
    with_http_layers(app)
}

pub fn users_app(state: UsersState) -> Router {
    let app = users::router()
        .merge(liveness_routes::<UsersState>(
            "Welcome to the Users Service!",
            "users-service",
        ))
        .with_state(state);
    with_http_layers(app)
}

/// Static `/` and `/health` payloads; they never touch the database.
fn liveness_routes<S>(welcome: &'static str, service: &'static str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            get(move || async move { Json::<Value>(json!({ "message": welcome })) }),
        )
        .route(
            "/health",
            get(move || async move { Json::<Value>(json!({ "status": "ok", "service": service })) }),
        )
}

fn with_http_layers(app: Router) -> Router {
    app.layer(CorsLayer::permissive()).layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                tracing::info_span!(
                    "http_request",
                    %method,
                    uri = %uri,
                    status = tracing::field::Empty
                )
            })
            .on_response(
                |res: &axum::http::Response<_>, _latency: std::time::Duration, span: &tracing::Span| {
                    let status = res.status();
                    span.record("status", tracing::field::display(status));
                    if status.is_server_error() {
                        tracing::error!(%status, "response");
                    } else {
                        tracing::info!(%status, "response");
                    }
                },
            ),
    )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
