use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::books::model::parse_status_filter;
use crate::books::{Book, BookCreate, BookRepository, BookUpdate};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status_filter: Option<String>,
}

/// POST /books - Create a book owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<BookCreate>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let new_book = payload.validate()?;

    let repo = BookRepository::new(state.store.clone());
    let book = repo
        .insert(&user.user_id, &new_book)
        .await?
        .ok_or_else(|| ApiError::internal_server_error("Failed to create book"))?;

    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /books - List the caller's books, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let status = match query.status_filter.as_deref() {
        Some(raw) => Some(parse_status_filter(raw)?),
        None => None,
    };

    let repo = BookRepository::new(state.store.clone());
    let books = repo.list(&user.user_id, status).await?;

    Ok(Json(books))
}

/// PATCH /books/{id} - Partially update an owned book
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<BookUpdate>,
) -> Result<Json<Book>, ApiError> {
    let repo = BookRepository::new(state.store.clone());

    // Ownership check comes first: an id owned by someone else reads the
    // same as an id that does not exist.
    repo.find_owned(&id, &user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Book not found"))?;

    let changes = payload.validate()?;

    // The row can vanish between the check and the update.
    let book = repo
        .update_owned(&id, &user.user_id, changes)
        .await?
        .ok_or_else(|| ApiError::internal_server_error("Failed to update book"))?;

    Ok(Json(book))
}

/// DELETE /books/{id} - Delete an owned book
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let repo = BookRepository::new(state.store.clone());

    repo.find_owned(&id, &user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Book not found"))?;

    repo.delete_owned(&id, &user.user_id).await?;

    Ok(Json(json!({ "message": "Book deleted successfully" })))
}
