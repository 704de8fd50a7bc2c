mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

use crate::state::NotesState;
use axum::Router;

pub fn router() -> Router<NotesState> {
    handlers::notes_routes()
}
