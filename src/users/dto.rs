use serde::Deserialize;
use validator::Validate;

use super::repo_types::NewUser;

/// Request body for `POST /users/`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(
        length(max = 254, message = "must be at most 254 characters"),
        email(message = "value is not a valid email address")
    )]
    pub email: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
        }
    }
}
