use std::sync::Arc;

use notehub::{
    app, config::AppConfig, db, startup::StartupGate, state::UsersState, telemetry,
    users::repo::PgUserStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("notehub=debug,users_service=debug,axum=info,tower_http=info");

    let config = Arc::new(AppConfig::from_env(8001)?);
    let store = Arc::new(PgUserStore::new(db::connect_lazy(&config)?));

    StartupGate::new("users-service", &config.startup)
        .open_or_exit(store.as_ref())
        .await;

    let state = UsersState::from_parts(config.clone(), store);
    app::serve(app::users_app(state), &config).await
}
