//! Order Service - checkout and fulfilment rules on top of the repositories

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;

use crate::domain::{
    BookRepository, DomainError, NewOrder, OrderFilter, OrderRepository, PaginatedOrders,
    PurchaseMark, StatusUpdate,
};
use crate::infrastructure::auth::AuthUser;
use crate::models::book::BookStatus;
use crate::models::order::{Order, OrderItem, OrderStatus, PaymentMethod, ShippingAddress};
use crate::utils::time::format_timestamp;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub book_id: i32,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: String,
    pub note: Option<String>,
    /// Buyer coordinates recorded on the purchased books
    pub lat_lng: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    pub status: String,
    pub note: Option<String>,
    pub cancel_reason: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
}

fn with_effective_status(mut order: Order, now: DateTime<Utc>) -> Order {
    order.status = order.effective_status(now).to_string();
    order
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

fn validate_request(request: &PlaceOrderRequest) -> Result<(PaymentMethod, ShippingAddress), DomainError> {
    if request.items.is_empty() {
        return Err(DomainError::Validation(
            "Order must contain at least one item".to_string(),
        ));
    }
    if request.items.iter().any(|line| line.quantity != 1) {
        return Err(DomainError::Validation(
            "Each book is a single copy; quantity must be 1".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    if !request.items.iter().all(|line| seen.insert(line.book_id)) {
        return Err(DomainError::Validation(
            "Each book may only appear once per order".to_string(),
        ));
    }

    let address = &request.shipping_address;
    let address = ShippingAddress {
        street: trimmed(&address.street),
        city: trimmed(&address.city),
        state: trimmed(&address.state),
        zip_code: trimmed(&address.zip_code),
        country: trimmed(&address.country),
    };
    if [
        &address.street,
        &address.city,
        &address.state,
        &address.zip_code,
        &address.country,
    ]
    .iter()
    .any(|field| field.is_empty())
    {
        return Err(DomainError::Validation(
            "Shipping address is incomplete".to_string(),
        ));
    }

    let method = request
        .payment_method
        .trim()
        .parse::<PaymentMethod>()
        .map_err(DomainError::Validation)?;

    Ok((method, address))
}

pub async fn place_order(
    books: &dyn BookRepository,
    orders: &dyn OrderRepository,
    buyer: &AuthUser,
    request: PlaceOrderRequest,
    now: DateTime<Utc>,
) -> Result<Order, DomainError> {
    let (payment_method, shipping_address) = validate_request(&request)?;

    let mut items = Vec::with_capacity(request.items.len());
    for line in &request.items {
        let book = books
            .find_by_id(line.book_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Book {} not found", line.book_id)))?;
        if book.purchased_at.is_some() {
            return Err(DomainError::Conflict(format!(
                "Book '{}' has already been purchased",
                book.title
            )));
        }
        items.push(OrderItem {
            book_id: book.id,
            quantity: line.quantity,
            price: book.price,
        });
    }

    let total_amount = items
        .iter()
        .map(|item| item.price * item.quantity as f64)
        .sum();
    let created_at = format_timestamp(now);

    let mark = PurchaseMark {
        purchased_at: created_at.clone(),
        purchased_by: buyer.id,
        country: shipping_address.country.clone(),
        lat_lng: request.lat_lng,
    };
    let order = orders
        .place(
            NewOrder {
                user_id: buyer.id,
                items,
                total_amount,
                shipping_address,
                payment_method,
                transaction_id: format!("TXN-{}", uuid::Uuid::new_v4().simple()),
                note: request.note.filter(|n| !n.trim().is_empty()),
                created_at,
            },
            mark,
        )
        .await?;

    tracing::info!(
        "Order {} placed by user {} for {:.2}",
        order.id,
        buyer.id,
        order.total_amount
    );
    Ok(order)
}

pub async fn list_orders(
    orders: &dyn OrderRepository,
    viewer: &AuthUser,
    page: u64,
    limit: u64,
    now: DateTime<Utc>,
) -> Result<PaginatedOrders, DomainError> {
    let result = orders
        .find_page(OrderFilter {
            user_id: if viewer.is_admin() { None } else { Some(viewer.id) },
            page,
            limit,
        })
        .await?;

    Ok(PaginatedOrders {
        orders: result
            .orders
            .into_iter()
            .map(|o| with_effective_status(o, now))
            .collect(),
        total: result.total,
    })
}

/// Orders belonging to someone else are reported as missing
pub async fn get_order(
    orders: &dyn OrderRepository,
    viewer: &AuthUser,
    id: i32,
    now: DateTime<Utc>,
) -> Result<Order, DomainError> {
    let order = orders
        .find_by_id(id)
        .await?
        .filter(|o| viewer.is_admin() || o.user_id == viewer.id)
        .ok_or_else(|| DomainError::not_found("Order"))?;
    Ok(with_effective_status(order, now))
}

pub async fn update_status(
    orders: &dyn OrderRepository,
    viewer: &AuthUser,
    id: i32,
    request: StatusChangeRequest,
    now: DateTime<Utc>,
) -> Result<Order, DomainError> {
    if !viewer.is_admin() {
        return Err(DomainError::Forbidden(
            "Only administrators can update order status".to_string(),
        ));
    }

    let status: OrderStatus = request
        .status
        .trim()
        .parse()
        .map_err(DomainError::Validation)?;

    let book_status = match status {
        OrderStatus::Delivered => Some(BookStatus::Delivered),
        OrderStatus::Cancelled => Some(BookStatus::Canceled),
        _ => None,
    };

    let updated = orders
        .update_status(
            id,
            StatusUpdate {
                status,
                note: request.note,
                cancel_reason: request.cancel_reason,
                tracking_number: request.tracking_number,
                tracking_url: request.tracking_url,
                at: now,
                book_status,
            },
        )
        .await?;

    tracing::info!("Order {} moved to {}", id, status);
    Ok(with_effective_status(updated, now))
}
