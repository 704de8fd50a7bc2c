//! Request validation.
//!
//! Payload types declare their constraints with `validator`; the
//! [`ValidatedJson`] extractor deserializes and checks them before a handler
//! ever sees the value, so nothing malformed reaches a store.

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, Request,
    },
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, FieldError};

/// Flattens `validator` output into a stable, field-sorted list.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("failed `{}` check", e.code));
                FieldError::new(field.clone(), message)
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Runs the declared constraints of `value` without touching anything else.
pub fn check<T: Validate>(value: &T) -> Result<(), Vec<FieldError>> {
    value.validate().map_err(|e| field_errors(&e))
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::field("body", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::field("query", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::field("path", rejection.body_text())
    }
}

/// JSON body that has passed its field constraints.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        check(&value).map_err(AppError::Validation)?;
        Ok(Self(value))
    }
}

/// Raw `skip`/`limit` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Checked pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl PageQuery {
    /// `skip` defaults to 0, `limit` to `max_limit`.
    pub fn resolve(&self, max_limit: i64) -> Result<Page, Vec<FieldError>> {
        let mut errors = Vec::new();
        let skip = self.skip.unwrap_or(0);
        if skip < 0 {
            errors.push(FieldError::new("skip", "must be greater than or equal to 0"));
        }
        let limit = self.limit.unwrap_or(max_limit);
        if !(1..=max_limit).contains(&limit) {
            errors.push(FieldError::new(
                "limit",
                format!("must be between 1 and {}", max_limit),
            ));
        }
        if errors.is_empty() {
            Ok(Page { skip, limit })
        } else {
            Err(errors)
        }
    }
}
