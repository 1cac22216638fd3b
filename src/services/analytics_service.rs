//! Analytics Service - dashboard widgets computed from the catalog
//!
//! Every widget loads the books visible to the viewer (admins see the whole
//! catalog, everyone else only the books they vend) and folds them in memory.
//! The folds are plain functions over `&[Book]` and an explicit `now` so they
//! can be tested without a database.

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::domain::{BookFilter, BookRepository, DomainError, UserRepository};
use crate::infrastructure::auth::AuthUser;
use crate::models::book::{Book, BookStatus};
use crate::models::user::Role;
use crate::utils::time::{format_timestamp, parse_timestamp};

pub const MIN_MONTHLY_TARGET: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountMetric {
    pub total: u64,
    pub growth: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyMetric {
    pub total: String,
    pub growth: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetric {
    pub value: String,
    pub growth: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub books: CountMetric,
    pub users: CountMetric,
    pub revenue: MoneyMetric,
    pub avg_order: AverageMetric,
}

impl DashboardMetrics {
    pub fn zero() -> Self {
        let zero = || "0.00".to_string();
        Self {
            books: CountMetric { total: 0, growth: zero() },
            users: CountMetric { total: 0, growth: zero() },
            revenue: MoneyMetric { total: zero(), growth: zero() },
            avg_order: AverageMetric { value: zero(), growth: zero() },
        }
    }
}

/// User head-count for the metrics card. `previous: None` reports no growth.
#[derive(Debug, Clone, Copy)]
pub struct UserCounts {
    pub total: u64,
    pub previous: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    pub monthly_sales: Vec<f64>,
    pub total_sales: f64,
    pub current_month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTarget {
    pub target: f64,
    pub current_revenue: f64,
    pub previous_revenue: f64,
    pub today_revenue: f64,
    pub progress_percentage: f64,
    pub revenue_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<T> {
    pub actual: Vec<T>,
    pub target: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub sales: Series<u64>,
    pub revenue: Series<f64>,
    pub current_month: u32,
    pub has_sales: bool,
}

/// A purchased book as shown in the order tables
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub image: String,
    pub purchased_at: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<OrderSummary>,
    pub pagination: OrderPagination,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_orders: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    pub country: String,
    pub lat_lng: Option<[f64; 2]>,
    pub purchase_count: u64,
    pub total_revenue: f64,
}

// ---------------------------------------------------------------------------
// Pure folds
// ---------------------------------------------------------------------------

/// Percentage change, reporting 100 when growing from nothing
pub fn growth_rate(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

fn fixed2(value: f64) -> String {
    format!("{:.2}", value)
}

fn start_of_month(at: DateTime<Utc>) -> DateTime<Utc> {
    let date = at.date_naive();
    date.with_day(1)
        .unwrap_or(date)
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Any instant inside the calendar month before `now`
fn previous_month(now: DateTime<Utc>) -> DateTime<Utc> {
    start_of_month(now) - Duration::days(1)
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn purchase_time(book: &Book) -> Option<DateTime<Utc>> {
    book.purchased_at.as_deref().and_then(parse_timestamp)
}

/// Price sum and count of books purchased at instants accepted by `window`
fn revenue_where<F>(books: &[Book], window: F) -> (f64, usize)
where
    F: Fn(DateTime<Utc>) -> bool,
{
    books
        .iter()
        .filter(|b| purchase_time(b).is_some_and(&window))
        .fold((0.0, 0), |(sum, n), b| (sum + b.price, n + 1))
}

/// Distinct customers who bought any of these books
pub fn distinct_purchasers(books: &[Book]) -> u64 {
    books
        .iter()
        .filter(|b| b.purchased_at.is_some())
        .filter_map(|b| b.purchased_by)
        .collect::<HashSet<_>>()
        .len() as u64
}

pub fn compute_metrics(books: &[Book], users: UserCounts, now: DateTime<Utc>) -> DashboardMetrics {
    let month_ago = now.checked_sub_months(Months::new(1)).unwrap_or(now);

    let total_books = books.len() as u64;
    let books_before = books
        .iter()
        .filter(|b| parse_timestamp(&b.created_at).is_some_and(|c| c < month_ago))
        .count() as u64;

    let (total_revenue, purchased) = revenue_where(books, |_| true);
    let prev = previous_month(now);
    let (prev_revenue, prev_count) = revenue_where(books, |at| same_month(at, prev));

    let avg_order = if purchased > 0 {
        total_revenue / purchased as f64
    } else {
        0.0
    };
    let prev_avg = if prev_count > 0 {
        prev_revenue / prev_count as f64
    } else {
        0.0
    };

    let users_growth = users
        .previous
        .map(|p| growth_rate(users.total as f64, p as f64))
        .unwrap_or(0.0);

    DashboardMetrics {
        books: CountMetric {
            total: total_books,
            growth: fixed2(growth_rate(total_books as f64, books_before as f64)),
        },
        users: CountMetric {
            total: users.total,
            growth: fixed2(users_growth),
        },
        revenue: MoneyMetric {
            total: fixed2(total_revenue),
            growth: fixed2(growth_rate(total_revenue, prev_revenue)),
        },
        avg_order: AverageMetric {
            value: fixed2(avg_order),
            growth: fixed2(growth_rate(avg_order, prev_avg)),
        },
    }
}

pub fn compute_monthly_sales(books: &[Book], now: DateTime<Utc>) -> MonthlySales {
    let mut monthly = vec![0.0; 12];
    for book in books {
        if let Some(at) = purchase_time(book) {
            if at.year() == now.year() && at.month0() <= now.month0() {
                monthly[at.month0() as usize] += book.price;
            }
        }
    }

    MonthlySales {
        total_sales: monthly.iter().sum(),
        monthly_sales: monthly,
        current_month: now.month0(),
    }
}

/// Previous month +15% when there was revenue, otherwise half the unsold
/// catalog; never below [`MIN_MONTHLY_TARGET`]
pub fn calculate_monthly_target(previous_revenue: f64, catalog_value: f64) -> f64 {
    let previous_revenue = previous_revenue.max(0.0);
    let catalog_value = catalog_value.max(0.0);

    let target = if previous_revenue == 0.0 {
        (catalog_value * 0.5).round()
    } else {
        (previous_revenue * 1.15).round()
    };
    target.max(MIN_MONTHLY_TARGET)
}

pub fn compute_monthly_target(books: &[Book], now: DateTime<Utc>) -> MonthlyTarget {
    let prev = previous_month(now);
    let (previous_revenue, _) = revenue_where(books, |at| same_month(at, prev));
    let (current_revenue, _) = revenue_where(books, |at| same_month(at, now));
    let (today_revenue, _) = revenue_where(books, |at| at.date_naive() == now.date_naive());

    let catalog_value: f64 = books
        .iter()
        .filter(|b| b.purchased_at.is_none())
        .map(|b| b.price)
        .sum();

    let target = calculate_monthly_target(previous_revenue, catalog_value);
    let progress_percentage = if target > 0.0 {
        (current_revenue / target * 100.0).round().min(100.0)
    } else {
        0.0
    };

    MonthlyTarget {
        target,
        current_revenue,
        previous_revenue,
        today_revenue,
        progress_percentage,
        revenue_growth: growth_rate(current_revenue, previous_revenue).round(),
    }
}

pub fn compute_statistics(books: &[Book], now: DateTime<Utc>) -> Statistics {
    let mut sales = vec![0u64; 12];
    let mut revenue = vec![0.0f64; 12];
    let mut has_sales = false;

    for book in books {
        let Some(at) = purchase_time(book) else {
            continue;
        };
        if at.year() != now.year() {
            continue;
        }
        has_sales = true;
        if at.month0() <= now.month0() {
            let m = at.month0() as usize;
            sales[m] += 1;
            revenue[m] += book.price;
        }
    }

    // Targets sit 20% above what was achieved
    let sales_target = sales.iter().map(|&s| (s as f64 * 1.2).ceil() as u64).collect();
    let revenue_target = revenue.iter().map(|&r| (r * 1.2).ceil()).collect();

    Statistics {
        sales: Series {
            actual: sales,
            target: sales_target,
        },
        revenue: Series {
            actual: revenue,
            target: revenue_target,
        },
        current_month: now.month0(),
        has_sales,
    }
}

/// Fulfilment status for a purchased book: the stored status once it has
/// moved past `Available`, otherwise derived from how long ago it sold
pub fn order_status(book: &Book, now: DateTime<Utc>) -> String {
    if book.status != BookStatus::Available.as_str() {
        return book.status.clone();
    }
    match purchase_time(book) {
        Some(at) if now - at < Duration::hours(24) => BookStatus::Pending.to_string(),
        Some(_) => BookStatus::Delivered.to_string(),
        None => book.status.clone(),
    }
}

pub fn summarize_order(book: &Book, now: DateTime<Utc>) -> OrderSummary {
    OrderSummary {
        id: book.id.to_string(),
        name: book.title.clone(),
        category: book.category.clone(),
        price: book.price,
        image: book.cover_image.clone(),
        purchased_at: book.purchased_at.clone(),
        status: order_status(book, now),
    }
}

/// Group purchases by country, keeping first-seen order and coordinates
pub fn group_by_country(books: &[Book]) -> Vec<LocationSummary> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut locations: Vec<LocationSummary> = Vec::new();

    for book in books.iter().filter(|b| b.purchased_at.is_some()) {
        let Some(location) = &book.purchase_location else {
            continue;
        };
        match index.get(&location.country) {
            Some(&i) => {
                locations[i].purchase_count += 1;
                locations[i].total_revenue += book.price;
            }
            None => {
                index.insert(location.country.clone(), locations.len());
                locations.push(LocationSummary {
                    country: location.country.clone(),
                    lat_lng: location.lat_lng,
                    purchase_count: 1,
                    total_revenue: book.price,
                });
            }
        }
    }

    locations
}

// ---------------------------------------------------------------------------
// Repository-backed widgets
// ---------------------------------------------------------------------------

pub async fn metrics(
    books: &dyn BookRepository,
    users: &dyn UserRepository,
    viewer: &AuthUser,
    now: DateTime<Utc>,
) -> Result<DashboardMetrics, DomainError> {
    let catalog = books.find_all(viewer.vendor_scope()).await?;

    let user_counts = if viewer.is_admin() {
        let month_ago = now.checked_sub_months(Months::new(1)).unwrap_or(now);
        UserCounts {
            total: users.count_by_role(Role::User, None).await?,
            previous: Some(
                users
                    .count_by_role(Role::User, Some(format_timestamp(month_ago)))
                    .await?,
            ),
        }
    } else {
        UserCounts {
            total: distinct_purchasers(&catalog),
            previous: None,
        }
    };

    Ok(compute_metrics(&catalog, user_counts, now))
}

pub async fn monthly_sales(
    books: &dyn BookRepository,
    viewer: &AuthUser,
    now: DateTime<Utc>,
) -> Result<MonthlySales, DomainError> {
    let catalog = books.find_all(viewer.vendor_scope()).await?;
    Ok(compute_monthly_sales(&catalog, now))
}

pub async fn monthly_target(
    books: &dyn BookRepository,
    viewer: &AuthUser,
    now: DateTime<Utc>,
) -> Result<MonthlyTarget, DomainError> {
    let catalog = books.find_all(viewer.vendor_scope()).await?;
    Ok(compute_monthly_target(&catalog, now))
}

pub async fn statistics(
    books: &dyn BookRepository,
    viewer: &AuthUser,
    now: DateTime<Utc>,
) -> Result<Statistics, DomainError> {
    let catalog = books.find_all(viewer.vendor_scope()).await?;
    Ok(compute_statistics(&catalog, now))
}

pub async fn recent_orders(
    books: &dyn BookRepository,
    viewer: &AuthUser,
    now: DateTime<Utc>,
) -> Result<Vec<OrderSummary>, DomainError> {
    let page = books
        .find_page(BookFilter {
            vendor_id: viewer.vendor_scope(),
            purchased: Some(true),
            page: 1,
            limit: 5,
            ..Default::default()
        })
        .await?;
    Ok(page.books.iter().map(|b| summarize_order(b, now)).collect())
}

pub async fn all_orders(
    books: &dyn BookRepository,
    viewer: &AuthUser,
    page: u64,
    limit: u64,
    now: DateTime<Utc>,
) -> Result<OrderPage, DomainError> {
    let result = books
        .find_page(BookFilter {
            vendor_id: viewer.vendor_scope(),
            purchased: Some(true),
            page,
            limit,
            ..Default::default()
        })
        .await?;

    Ok(OrderPage {
        orders: result.books.iter().map(|b| summarize_order(b, now)).collect(),
        pagination: OrderPagination {
            current_page: page,
            total_pages: result.total.div_ceil(limit),
            total_orders: result.total,
            limit,
        },
    })
}

pub async fn purchase_locations(
    books: &dyn BookRepository,
    viewer: &AuthUser,
) -> Result<Vec<LocationSummary>, DomainError> {
    let catalog = books.find_all(viewer.vendor_scope()).await?;
    Ok(group_by_country(&catalog))
}
