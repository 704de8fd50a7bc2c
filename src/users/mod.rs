mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

use crate::state::UsersState;
use axum::Router;

pub fn router() -> Router<UsersState> {
    handlers::users_routes()
}
