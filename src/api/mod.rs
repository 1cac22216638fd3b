pub mod auth;
pub mod books;
pub mod bulk;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod orders;
pub mod profile;

use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;

use crate::infrastructure::AppState;

/// `{ "success": true, "data": ... }` body of the dashboard and profile routes
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Success<T> {
    pub fn json(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/bulk", post(bulk::bulk_upload))
        .route("/books/bulk-delete", delete(bulk::bulk_delete))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Orders
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/status", put(orders::update_order_status))
        // Dashboard
        .route("/dashboard/metrics", get(dashboard::metrics))
        .route("/dashboard/monthly-sales", get(dashboard::monthly_sales))
        .route("/dashboard/monthly-target", get(dashboard::monthly_target))
        .route("/dashboard/statistics", get(dashboard::statistics))
        .route("/dashboard/recent-orders", get(dashboard::recent_orders))
        .route("/dashboard/all-orders", get(dashboard::all_orders))
        .route(
            "/dashboard/purchase-locations",
            get(dashboard::purchase_locations),
        )
        .with_state(state)
}
