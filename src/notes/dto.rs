use serde::Deserialize;
use validator::Validate;

use super::repo_types::{NewNote, NotePatch};

/// Request body for `POST /notes/`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub user_id: i64,
}

impl From<CreateNoteRequest> for NewNote {
    fn from(req: CreateNoteRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            user_id: req.user_id,
        }
    }
}

/// Request body for `PUT /notes/{id}`. Absent and `null` both mean "keep".
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateNoteRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: Option<String>,
}

impl From<UpdateNoteRequest> for NotePatch {
    fn from(req: UpdateNoteRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
        }
    }
}

/// Query string for `GET /notes/`.
#[derive(Debug, Deserialize)]
pub struct ListNotesQuery {
    pub user_id: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
