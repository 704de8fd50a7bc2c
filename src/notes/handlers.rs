use axum::{
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateNoteRequest, ListNotesQuery, UpdateNoteRequest},
    repo_types::Note,
};
use crate::{
    error::AppError,
    state::NotesState,
    validation::{PageQuery, ValidatedJson},
};

pub fn notes_routes() -> Router<NotesState> {
    Router::new()
        .route("/notes/", get(list_notes).post(create_note))
        .route("/notes", get(list_notes).post(create_note))
        .route(
            "/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_note(
    State(state): State<NotesState>,
    ValidatedJson(payload): ValidatedJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let note = state
        .notes
        .create(payload.into())
        .await
        .map_err(|e| AppError::from_store(e, "Note", "Could not create note."))?;
    info!(note_id = note.id, user_id = note.user_id, title = %note.title, "note created");
    Ok((StatusCode::CREATED, Json(note)))
}

#[instrument(skip(state, query))]
pub async fn list_notes(
    State(state): State<NotesState>,
    query: Result<Query<ListNotesQuery>, QueryRejection>,
) -> Result<Json<Vec<Note>>, AppError> {
    let Query(query) = query?;
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::field("user_id", "field required"))?;
    let page = PageQuery {
        skip: query.skip,
        limit: query.limit,
    }
    .resolve(state.config.page_max_limit)
    .map_err(AppError::Validation)?;

    let notes = state
        .notes
        .list(user_id, page)
        .await
        .map_err(|e| AppError::from_store(e, "Note", "Could not list notes."))?;
    info!(user_id, count = notes.len(), "notes listed");
    Ok(Json(notes))
}

#[instrument(skip(state, id))]
pub async fn get_note(
    State(state): State<NotesState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Note>, AppError> {
    let Path(id) = id?;
    match state.notes.get(id).await {
        Ok(note) => Ok(Json(note)),
        Err(e) => {
            warn!(note_id = id, error = %e, "note lookup failed");
            Err(AppError::from_store(e, "Note", "Could not load note."))
        }
    }
}

#[instrument(skip(state, id, payload))]
pub async fn update_note(
    State(state): State<NotesState>,
    id: Result<Path<i64>, PathRejection>,
    ValidatedJson(payload): ValidatedJson<UpdateNoteRequest>,
) -> Result<Json<Note>, AppError> {
    let Path(id) = id?;
    let note = state
        .notes
        .update(id, payload.into())
        .await
        .map_err(|e| AppError::from_store(e, "Note", "Could not update note."))?;
    info!(note_id = note.id, "note updated");
    Ok(Json(note))
}

#[instrument(skip(state, id))]
pub async fn delete_note(
    State(state): State<NotesState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state
        .notes
        .delete(id)
        .await
        .map_err(|e| AppError::from_store(e, "Note", "Could not delete note."))?;
    info!(note_id = id, "note deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, Response},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app::notes_app, state::NotesState};

    use super::*;

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        app.clone().oneshot(req).await.unwrap()
    }

    async fn json_body(res: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn app() -> Router {
        notes_app(NotesState::fake())
    }

    #[tokio::test]
    async fn root_and_health() {
        let app = app();
        let res = send(&app, "GET", "/", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            json_body(res).await,
            json!({ "message": "Welcome to the Notes Service!" })
        );

        let res = send(&app, "GET", "/health", None).await;
        assert_eq!(
            json_body(res).await,
            json!({ "status": "ok", "service": "notes-service" })
        );
    }

    #[tokio::test]
    async fn create_list_delete_scenario() {
        let app = app();
        let res = send(
            &app,
            "POST",
            "/notes/",
            Some(json!({ "title": "Test Note", "content": "Test content", "user_id": 1 })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created = json_body(res).await;
        assert_eq!(created["title"], "Test Note");
        assert_eq!(created["content"], "Test content");
        assert_eq!(created["user_id"], 1);
        assert!(created["id"].is_i64());
        assert!(created["created_at"].is_string());
        assert!(created["updated_at"].is_null());
        let id = created["id"].as_i64().unwrap();

        let res = send(&app, "GET", "/notes/?user_id=1", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let listed = json_body(res).await;
        assert!(listed
            .as_array()
            .unwrap()
            .iter()
            .any(|n| n["id"] == created["id"]));

        let res = send(&app, "DELETE", &format!("/notes/{}", id), None).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = send(&app, "GET", &format!("/notes/{}", id), None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(res).await, json!({ "detail": "Note not found" }));
    }

    #[tokio::test]
    async fn invalid_user_id_is_rejected_and_nothing_is_stored() {
        let app = app();
        let res = send(
            &app,
            "POST",
            "/notes/",
            Some(json!({ "title": "Invalid Note", "content": "Content", "user_id": -1 })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(res).await;
        assert_eq!(body["detail"][0]["field"], "user_id");

        let res = send(&app, "GET", "/notes/?user_id=-1", None).await;
        assert_eq!(json_body(res).await, json!([]));
    }

    #[tokio::test]
    async fn missing_fields_and_bad_json_are_validation_failures() {
        let app = app();
        let res = send(&app, "POST", "/notes/", Some(json!({ "title": "t" }))).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = Request::builder()
            .method("POST")
            .uri("/notes/")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn list_requires_user_id_and_checks_paging() {
        let app = app();
        let res = send(&app, "GET", "/notes/", None).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(res).await["detail"][0]["field"], "user_id");

        let res = send(&app, "GET", "/notes/?user_id=1&limit=0", None).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let res = send(&app, "GET", "/notes/?user_id=1&limit=101", None).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let res = send(&app, "GET", "/notes/?user_id=1&skip=-1", None).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let res = send(&app, "GET", "/notes/?user_id=abc", None).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn pagination_returns_earliest_first() {
        let app = app();
        let mut ids = Vec::new();
        for title in ["first", "second", "third"] {
            let res = send(
                &app,
                "POST",
                "/notes",
                Some(json!({ "title": title, "content": "c", "user_id": 7 })),
            )
            .await;
            ids.push(json_body(res).await["id"].clone());
        }
        send(
            &app,
            "POST",
            "/notes",
            Some(json!({ "title": "someone else", "content": "c", "user_id": 8 })),
        )
        .await;

        let res = send(&app, "GET", "/notes?user_id=7&skip=0&limit=1", None).await;
        let page = json_body(res).await;
        assert_eq!(page.as_array().unwrap().len(), 1);
        assert_eq!(page[0]["id"], ids[0]);
        assert_eq!(page[0]["title"], "first");

        let res = send(&app, "GET", "/notes?user_id=7&skip=1&limit=5", None).await;
        let page = json_body(res).await;
        assert_eq!(page.as_array().unwrap().len(), 2);
        assert_eq!(page[0]["id"], ids[1]);
    }

    #[tokio::test]
    async fn get_is_stable_without_mutation() {
        let app = app();
        let res = send(
            &app,
            "POST",
            "/notes/",
            Some(json!({ "title": "Get Test", "content": "Content", "user_id": 1 })),
        )
        .await;
        let id = json_body(res).await["id"].as_i64().unwrap();

        let a = json_body(send(&app, "GET", &format!("/notes/{}", id), None).await).await;
        let b = json_body(send(&app, "GET", &format!("/notes/{}", id), None).await).await;
        assert_eq!(a, b);
        assert_eq!(a["id"], id);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let app = app();
        let res = send(
            &app,
            "POST",
            "/notes/",
            Some(json!({ "title": "Original", "content": "Original content", "user_id": 1 })),
        )
        .await;
        let created = json_body(res).await;
        let uri = format!("/notes/{}", created["id"]);

        let res = send(&app, "PUT", &uri, Some(json!({ "title": "Updated Title" }))).await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated = json_body(res).await;
        assert_eq!(updated["title"], "Updated Title");
        assert_eq!(updated["content"], "Original content");
        assert_eq!(updated["user_id"], 1);
        assert_eq!(updated["created_at"], created["created_at"]);
        assert!(updated["updated_at"].is_string());

        let res = send(&app, "PUT", &uri, Some(json!({ "content": "" }))).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let unchanged = json_body(send(&app, "GET", &uri, None).await).await;
        assert_eq!(unchanged["content"], "Original content");
    }

    #[tokio::test]
    async fn missing_note_is_404_for_every_verb() {
        let app = app();
        let res = send(&app, "GET", "/notes/99999", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = send(&app, "PUT", "/notes/99999", Some(json!({ "title": "x" }))).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = send(&app, "DELETE", "/notes/99999", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_numeric_id_is_a_validation_failure() {
        let res = send(&app(), "GET", "/notes/abc", None).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(res).await["detail"][0]["field"], "path");
    }
}
