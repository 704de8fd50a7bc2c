use axum::{
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{dto::CreateUserRequest, repo_types::User};
use crate::{
    db::StoreError,
    error::AppError,
    state::UsersState,
    validation::{PageQuery, ValidatedJson},
};

pub fn users_routes() -> Router<UsersState> {
    Router::new()
        .route("/users/", get(list_users).post(register))
        .route("/users", get(list_users).post(register))
        .route("/users/:id", get(get_user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<UsersState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let username = payload.username.clone();
    match state.users.create(payload.into()).await {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "user registered");
            Ok((StatusCode::CREATED, Json(user)))
        }
        Err(StoreError::Conflict(field)) => {
            warn!(%username, field = field.as_str(), "registration conflict");
            Err(AppError::Conflict(field))
        }
        Err(e) => Err(AppError::from_store(e, "User", "Could not create user.")),
    }
}

#[instrument(skip(state, query))]
pub async fn list_users(
    State(state): State<UsersState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<User>>, AppError> {
    let Query(query) = query?;
    let page = query
        .resolve(state.config.page_max_limit)
        .map_err(AppError::Validation)?;
    let users = state
        .users
        .list(page)
        .await
        .map_err(|e| AppError::from_store(e, "User", "Could not list users."))?;
    info!(skip = page.skip, limit = page.limit, count = users.len(), "users listed");
    Ok(Json(users))
}

#[instrument(skip(state, id))]
pub async fn get_user(
    State(state): State<UsersState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, AppError> {
    let Path(id) = id?;
    match state.users.get(id).await {
        Ok(user) => Ok(Json(user)),
        Err(e) => {
            warn!(user_id = id, error = %e, "user lookup failed");
            Err(AppError::from_store(e, "User", "Could not load user."))
        }
    }
}
