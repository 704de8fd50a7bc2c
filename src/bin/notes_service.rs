use std::sync::Arc;

use notehub::{
    app, config::AppConfig, db, notes::repo::PgNoteStore, startup::StartupGate,
    state::NotesState, telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("notehub=debug,notes_service=debug,axum=info,tower_http=info");

    let config = Arc::new(AppConfig::from_env(8000)?);
    let store = Arc::new(PgNoteStore::new(db::connect_lazy(&config)?));

    StartupGate::new("notes-service", &config.startup)
        .open_or_exit(store.as_ref())
        .await;

    let state = NotesState::from_parts(config.clone(), store);
    app::serve(app::notes_app(state), &config).await
}
