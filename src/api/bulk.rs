use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::domain::DomainError;
use crate::import::{self, ImportError};
use crate::infrastructure::auth::AuthUser;
use crate::infrastructure::AppState;
use crate::models::book::NewBook;

fn bad_request(body: Value) -> Response {
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

#[utoipa::path(
    post,
    path = "/api/books/bulk",
    request_body(content = String, content_type = "multipart/form-data", description = "CSV upload in field `file`"),
    responses(
        (status = 200, description = "Books added"),
        (status = 400, description = "Missing file, columns or invalid rows")
    )
)]
pub async fn bulk_upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Response {
    let mut content = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => match field.bytes().await {
                Ok(bytes) => {
                    content = Some(bytes);
                    break;
                }
                Err(e) => return bad_request(json!({ "error": e.body_text() })),
            },
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return bad_request(json!({ "error": e.body_text() })),
        }
    }

    let Some(content) = content else {
        return bad_request(json!({ "error": "No file uploaded" }));
    };

    let existing = match state.book_repo.all_isbns().await {
        Ok(isbns) => isbns,
        Err(e) => return e.into_response(),
    };

    let parsed = match import::parse_bulk_csv(&content, &existing) {
        Ok(parsed) => parsed,
        Err(e @ ImportError::MissingColumns(_)) => {
            return bad_request(json!({ "error": e.to_string() }));
        }
        Err(e) => {
            tracing::warn!("Unreadable CSV from {}: {}", user.email, e);
            return bad_request(json!({ "error": e.to_string() }));
        }
    };

    if !parsed.errors.is_empty() {
        tracing::warn!(
            "Bulk upload from {} rejected with {} row error(s)",
            user.email,
            parsed.errors.len()
        );
        return bad_request(json!({
            "error": "Validation errors found",
            "details": import::validation_details(&parsed.errors),
        }));
    }

    if parsed.books.is_empty() {
        return bad_request(json!({ "error": import::nothing_added_message(&parsed.skipped) }));
    }

    let rows: Vec<NewBook> = parsed
        .books
        .into_iter()
        .map(|row| NewBook {
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            price: row.price,
            description: row.description,
            category: row.category,
            cover_image: None,
            vendor_id: user.id,
        })
        .collect();

    let added = match state.book_repo.create_many(rows).await {
        Ok(added) => added,
        // Lost a race with another insert of the same ISBN
        Err(DomainError::Conflict(msg)) => return bad_request(json!({ "error": msg })),
        Err(e) => return e.into_response(),
    };

    tracing::info!(
        "Bulk upload by {}: {} added, {} skipped",
        user.email,
        added.len(),
        parsed.skipped.len()
    );

    (
        StatusCode::OK,
        Json(json!({
            "message": import::added_message(added.len(), &parsed.skipped),
            "addedBooks": added,
            "skippedCount": parsed.skipped.len(),
        })),
    )
        .into_response()
}

/// IDs from `{ "ids": [...] }`; `None` when the shape is wrong or empty
fn requested_ids(body: &Value) -> Option<Vec<i32>> {
    let ids = body.get("ids")?.as_array()?;
    if ids.is_empty() {
        return None;
    }
    ids.iter()
        .map(|v| v.as_i64().and_then(|n| i32::try_from(n).ok()))
        .collect()
}

#[utoipa::path(
    delete,
    path = "/api/books/bulk-delete",
    responses(
        (status = 200, description = "Books deleted"),
        (status = 400, description = "Missing or empty ID list"),
        (status = 404, description = "None of the IDs matched")
    )
)]
pub async fn bulk_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<Value>,
) -> Response {
    let Some(mut ids) = requested_ids(&body) else {
        return bad_request(json!({ "error": "Invalid request. Expected an array of book IDs." }));
    };

    if let Some(vendor) = user.vendor_scope() {
        let own: Vec<i32> = match state.book_repo.find_all(Some(vendor)).await {
            Ok(books) => books.into_iter().map(|b| b.id).collect(),
            Err(e) => return e.into_response(),
        };
        ids.retain(|id| own.contains(id));
    }

    let deleted = if ids.is_empty() {
        0
    } else {
        match state.book_repo.delete_many(&ids).await {
            Ok(n) => n,
            Err(e) => return e.into_response(),
        }
    };

    if deleted == 0 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No books found with the provided IDs." })),
        )
            .into_response();
    }

    tracing::info!("{} deleted {} book(s)", user.email, deleted);
    (
        StatusCode::OK,
        Json(json!({
            "message": format!("Successfully deleted {} book(s).", deleted),
            "deletedCount": deleted,
        })),
    )
        .into_response()
}
