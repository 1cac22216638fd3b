use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::api::error::ApiResult;
use crate::domain::{BookFilter, DomainError};
use crate::infrastructure::auth::AuthUser;
use crate::infrastructure::AppState;
use crate::models::book::{BookChanges, BookStatus, NewBook};
use crate::models::Book;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Highest page whose offset still fits a SQL offset at the largest page size
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page
    pub page: Option<u64>,
    /// Page size, at most 100
    pub limit: Option<u64>,
    /// Title, author, ISBN or category
    pub search: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn limit(&self) -> u64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    pub price: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub cover_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<String>,
}

impl CreateBookRequest {
    /// Trimmed, validated insert for `vendor_id`
    pub fn validate(self, vendor_id: i32) -> Result<NewBook, DomainError> {
        let title = self.title.trim().to_string();
        let author = self.author.trim().to_string();
        let isbn = self.isbn.trim().to_string();
        let category = self.category.trim().to_string();

        // A zero price counts as missing
        let price = self.price.filter(|p| *p != 0.0);
        if title.is_empty() || author.is_empty() || isbn.is_empty() || category.is_empty() {
            return Err(DomainError::Validation("Missing required fields".to_string()));
        }
        let Some(price) = price else {
            return Err(DomainError::Validation("Missing required fields".to_string()));
        };
        if !price.is_finite() || price < 0.0 {
            return Err(DomainError::Validation("Invalid price".to_string()));
        }

        Ok(NewBook {
            title,
            author,
            isbn,
            price,
            description: self.description.trim().to_string(),
            category,
            cover_image: self.cover_image.map(|c| c.trim().to_string()),
            vendor_id,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl UpdateBookRequest {
    pub fn into_changes(self) -> Result<BookChanges, DomainError> {
        let status = self
            .status
            .map(|s| s.trim().parse::<BookStatus>())
            .transpose()
            .map_err(DomainError::Validation)?;

        Ok(BookChanges {
            title: non_empty(self.title),
            author: non_empty(self.author),
            isbn: non_empty(self.isbn),
            price: self.price.filter(|p| p.is_finite() && *p > 0.0),
            description: non_empty(self.description),
            category: non_empty(self.category),
            cover_image: non_empty(self.cover_image),
            status,
        })
    }
}

/// Duplicate ISBNs are reported as bad input on this resource
fn isbn_conflict_as_validation(e: DomainError) -> DomainError {
    match e {
        DomainError::Conflict(msg) => DomainError::Validation(msg),
        other => other,
    }
}

/// Load a book the caller may manage; other vendors' books look missing
pub(crate) async fn owned_book(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> Result<Book, DomainError> {
    state
        .book_repo
        .find_by_id(id)
        .await?
        .filter(|b| user.vendor_scope().is_none_or(|vendor| b.vendor_id == vendor))
        .ok_or_else(|| DomainError::not_found("Book"))
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(PageQuery),
    responses((status = 200, description = "Page of books"))
)]
pub async fn list_books(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let (page, limit) = (query.page(), query.limit());

    let result = state
        .book_repo
        .find_page(BookFilter {
            search: query.search.clone(),
            vendor_id: user.vendor_scope(),
            purchased: None,
            page,
            limit,
        })
        .await?;

    let total_pages = result.total.div_ceil(limit);
    Ok(Json(json!({
        "books": result.books,
        "pagination": {
            "total": result.total,
            "totalPages": total_pages,
            "currentPage": page,
            "limit": limit,
            "hasNextPage": page < total_pages,
            "hasPreviousPage": page > 1,
        }
    })))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book found"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Book>> {
    Ok(Json(owned_book(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/books",
    responses(
        (status = 201, description = "Book created"),
        (status = 400, description = "Missing fields, invalid price or duplicate ISBN")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBookRequest>,
) -> ApiResult<impl IntoResponse> {
    let new_book = payload.validate(user.id).inspect_err(|e| {
        tracing::warn!("Rejected book from {}: {}", user.email, e);
    })?;

    let book = state
        .book_repo
        .create(new_book)
        .await
        .map_err(isbn_conflict_as_validation)?;

    tracing::info!("Book {} ({}) added by {}", book.id, book.isbn, user.email);
    Ok((StatusCode::CREATED, Json(book)))
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book updated"),
        (status = 400, description = "Invalid status or duplicate ISBN"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBookRequest>,
) -> ApiResult<Json<Book>> {
    owned_book(&state, &user, id).await?;
    let changes = payload.into_changes()?;

    let book = state
        .book_repo
        .update(id, changes)
        .await
        .map_err(isbn_conflict_as_validation)?;
    Ok(Json(book))
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    owned_book(&state, &user, id).await?;
    state.book_repo.delete(id).await?;

    tracing::info!("Book {} deleted by {}", id, user.email);
    Ok(Json(json!({ "message": "Book deleted successfully" })))
}
