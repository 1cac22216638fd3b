//! Dashboard widgets. Every route is scoped to the caller's own books unless
//! the caller is an administrator.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::api::books::PageQuery;
use crate::api::error::ApiResult;
use crate::api::Success;
use crate::infrastructure::auth::AuthUser;
use crate::infrastructure::AppState;
use crate::services::analytics_service::{
    self, DashboardMetrics, MonthlySales, MonthlyTarget, OrderPage, OrderSummary, Statistics,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/metrics",
    responses((status = 200, description = "Headline counters with growth"))
)]
pub async fn metrics(State(state): State<AppState>, user: AuthUser) -> Json<Value> {
    let result = analytics_service::metrics(
        state.book_repo.as_ref(),
        state.user_repo.as_ref(),
        &user,
        Utc::now(),
    )
    .await;

    let metrics = result.unwrap_or_else(|e| {
        tracing::error!("Failed to compute dashboard metrics: {}", e);
        DashboardMetrics::zero()
    });
    Json(json!({ "success": true, "metrics": metrics }))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/monthly-sales",
    responses((status = 200, description = "Revenue per month of the current year"))
)]
pub async fn monthly_sales(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Success<MonthlySales>>> {
    let sales = analytics_service::monthly_sales(state.book_repo.as_ref(), &user, Utc::now()).await?;
    Ok(Success::json(sales))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/monthly-target",
    responses((status = 200, description = "Target and progress for the current month"))
)]
pub async fn monthly_target(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Success<MonthlyTarget>>> {
    let target =
        analytics_service::monthly_target(state.book_repo.as_ref(), &user, Utc::now()).await?;
    Ok(Success::json(target))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/statistics",
    responses((status = 200, description = "Monthly sales and revenue against targets"))
)]
pub async fn statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Success<Statistics>>> {
    let stats = analytics_service::statistics(state.book_repo.as_ref(), &user, Utc::now()).await?;
    Ok(Success::json(stats))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/recent-orders",
    responses((status = 200, description = "Five most recent purchases"))
)]
pub async fn recent_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Success<Vec<OrderSummary>>>> {
    let orders =
        analytics_service::recent_orders(state.book_repo.as_ref(), &user, Utc::now()).await?;
    Ok(Success::json(orders))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/all-orders",
    params(PageQuery),
    responses((status = 200, description = "Purchases, newest first"))
)]
pub async fn all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Success<OrderPage>>> {
    let page = analytics_service::all_orders(
        state.book_repo.as_ref(),
        &user,
        query.page(),
        query.limit(),
        Utc::now(),
    )
    .await?;
    Ok(Success::json(page))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/purchase-locations",
    responses((status = 200, description = "Purchases grouped by country"))
)]
pub async fn purchase_locations(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Success<Value>>> {
    let locations =
        analytics_service::purchase_locations(state.book_repo.as_ref(), &user).await?;
    Ok(Success::json(json!({
        "hasPurchases": !locations.is_empty(),
        "locations": locations,
    })))
}
