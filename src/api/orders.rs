use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::api::books::PageQuery;
use crate::api::error::ApiResult;
use crate::infrastructure::auth::AuthUser;
use crate::infrastructure::AppState;
use crate::models::Order;
use crate::services::order_service::{self, PlaceOrderRequest, StatusChangeRequest};

#[utoipa::path(
    post,
    path = "/api/orders",
    responses(
        (status = 201, description = "Order placed"),
        (status = 400, description = "Invalid items, address or payment method"),
        (status = 404, description = "Unknown book"),
        (status = 409, description = "Book already purchased")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    let order = order_service::place_order(
        state.book_repo.as_ref(),
        state.order_repo.as_ref(),
        &user,
        payload,
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(PageQuery),
    responses((status = 200, description = "Orders visible to the caller"))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let (page, limit) = (query.page(), query.limit());
    let result =
        order_service::list_orders(state.order_repo.as_ref(), &user, page, limit, Utc::now())
            .await?;

    Ok(Json(json!({
        "orders": result.orders,
        "pagination": {
            "total": result.total,
            "totalPages": result.total.div_ceil(limit),
            "currentPage": page,
            "limit": limit,
        }
    })))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Order>> {
    let order = order_service::get_order(state.order_repo.as_ref(), &user, id, Utc::now()).await?;
    Ok(Json(order))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid or terminal status"),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<StatusChangeRequest>,
) -> ApiResult<Json<Order>> {
    let order =
        order_service::update_status(state.order_repo.as_ref(), &user, id, payload, Utc::now())
            .await?;
    Ok(Json(order))
}
