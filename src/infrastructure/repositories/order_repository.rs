//! SeaORM implementation of OrderRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::domain::{
    page_offset, DomainError, NewOrder, OrderFilter, OrderRepository, PaginatedOrders, PurchaseMark,
    StatusUpdate,
};
use crate::models::book::{self, BookStatus};
use crate::models::order::{
    ActiveModel, Column, Entity as OrderEntity, Order, OrderItem, OrderStatus, PaymentMethod,
    StatusChange,
};
use crate::utils::time::format_timestamp;

pub struct SeaOrmOrderRepository {
    db: DatabaseConnection,
}

impl SeaOrmOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DomainError> {
    serde_json::to_string(value).map_err(|e| DomainError::Internal(e.to_string()))
}

fn book_ids(items: &[OrderItem]) -> Vec<i32> {
    let mut ids: Vec<i32> = items.iter().map(|i| i.book_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn place(&self, order: NewOrder, mark: PurchaseMark) -> Result<Order, DomainError> {
        let ids = book_ids(&order.items);
        let items_json = to_json(&order.items)?;
        let history_json = to_json(&vec![StatusChange {
            status: OrderStatus::Pending,
            timestamp: order.created_at.clone(),
            note: None,
        }])?;

        // Cash is collected on delivery; everything else is captured up front
        let (payment_status, paid_at) = match order.payment_method {
            PaymentMethod::CashOnDelivery => ("pending", None),
            _ => ("completed", Some(order.created_at.clone())),
        };

        let placed = self
            .db
            .transaction::<_, Order, DomainError>(|txn| {
                Box::pin(async move {
                    let address = order.shipping_address;
                    let model = ActiveModel {
                        user_id: Set(order.user_id),
                        items: Set(items_json),
                        total_amount: Set(order.total_amount),
                        ship_street: Set(address.street),
                        ship_city: Set(address.city),
                        ship_state: Set(address.state),
                        ship_zip_code: Set(address.zip_code),
                        ship_country: Set(address.country),
                        payment_method: Set(order.payment_method.as_str().to_string()),
                        transaction_id: Set(Some(order.transaction_id)),
                        payment_status: Set(payment_status.to_string()),
                        paid_at: Set(paid_at),
                        status: Set(OrderStatus::Pending.to_string()),
                        status_history: Set(history_json),
                        note: Set(order.note),
                        created_at: Set(order.created_at.clone()),
                        updated_at: Set(order.created_at),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    let (lat, lng) = match mark.lat_lng {
                        Some([lat, lng]) => (Some(lat), Some(lng)),
                        None => (None, None),
                    };

                    // Only unsold books are stamped; anything else means a concurrent sale
                    let stamped = book::Entity::update_many()
                        .col_expr(book::Column::PurchasedAt, Expr::value(mark.purchased_at.clone()))
                        .col_expr(book::Column::PurchasedBy, Expr::value(mark.purchased_by))
                        .col_expr(book::Column::PurchaseCountry, Expr::value(mark.country))
                        .col_expr(book::Column::PurchaseLat, Expr::value(lat))
                        .col_expr(book::Column::PurchaseLng, Expr::value(lng))
                        .col_expr(
                            book::Column::Status,
                            Expr::value(BookStatus::Pending.to_string()),
                        )
                        .col_expr(book::Column::UpdatedAt, Expr::value(mark.purchased_at))
                        .filter(book::Column::Id.is_in(ids.clone()))
                        .filter(book::Column::PurchasedAt.is_null())
                        .exec(txn)
                        .await?;

                    if stamped.rows_affected != ids.len() as u64 {
                        return Err(DomainError::Conflict(
                            "One or more books have already been purchased".to_string(),
                        ));
                    }

                    Ok(Order::from(model))
                })
            })
            .await?;

        Ok(placed)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, DomainError> {
        let order = OrderEntity::find_by_id(id).one(&self.db).await?;
        Ok(order.map(Order::from))
    }

    async fn find_page(&self, filter: OrderFilter) -> Result<PaginatedOrders, DomainError> {
        let limit = filter.limit.max(1);
        let mut query = OrderEntity::find();
        if let Some(user_id) = filter.user_id {
            query = query.filter(Column::UserId.eq(user_id));
        }

        let paginator = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, limit);
        let total = paginator.num_items().await?;
        if page_offset(filter.page, limit).is_none() {
            return Ok(PaginatedOrders { orders: Vec::new(), total });
        }
        let orders = paginator
            .fetch_page(filter.page.saturating_sub(1))
            .await?
            .into_iter()
            .map(Order::from)
            .collect();

        Ok(PaginatedOrders { orders, total })
    }

    async fn update_status(&self, id: i32, update: StatusUpdate) -> Result<Order, DomainError> {
        let at = format_timestamp(update.at);
        let updated = self
            .db
            .transaction::<_, Order, DomainError>(|txn| {
                Box::pin(async move {
                    let existing = OrderEntity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| DomainError::not_found("Order"))?;
                    let previous_history = existing.status_history.clone();
                    let current = Order::from(existing.clone());

                    let shown = current.effective_status(update.at);
                    if shown.is_terminal() {
                        return Err(DomainError::Validation(format!(
                            "Order is already {} and cannot be changed",
                            shown
                        )));
                    }

                    let mut history = current.status_history;
                    history.push(StatusChange {
                        status: update.status,
                        timestamp: at.clone(),
                        note: update.note.clone(),
                    });

                    let mut active: ActiveModel = existing.into();
                    active.status = Set(update.status.to_string());
                    active.status_history = Set(to_json(&history)?);
                    match update.status {
                        OrderStatus::Delivered => {
                            active.delivered_at = Set(Some(at.clone()));
                            if current.payment_details.status == "pending" {
                                active.payment_status = Set("completed".to_string());
                                active.paid_at = Set(Some(at.clone()));
                            }
                        }
                        OrderStatus::Cancelled => {
                            active.cancelled_at = Set(Some(at.clone()));
                            active.cancel_reason = Set(update.cancel_reason);
                            if current.payment_details.status == "completed" {
                                active.payment_status = Set("refunded".to_string());
                            }
                        }
                        _ => {}
                    }
                    if let Some(tracking_number) = update.tracking_number {
                        active.tracking_number = Set(Some(tracking_number));
                    }
                    if let Some(tracking_url) = update.tracking_url {
                        active.tracking_url = Set(Some(tracking_url));
                    }
                    active.updated_at = Set(at.clone());

                    // The history only grows, so an unchanged history means nobody else got here first
                    let written = OrderEntity::update_many()
                        .set(active)
                        .filter(Column::Id.eq(id))
                        .filter(Column::StatusHistory.eq(previous_history))
                        .exec(txn)
                        .await?;
                    if written.rows_affected == 0 {
                        return Err(DomainError::Conflict(
                            "Order was updated by another request".to_string(),
                        ));
                    }

                    if let Some(book_status) = update.book_status {
                        book::Entity::update_many()
                            .col_expr(book::Column::Status, Expr::value(book_status.to_string()))
                            .col_expr(book::Column::UpdatedAt, Expr::value(at))
                            .filter(book::Column::Id.is_in(book_ids(&current.items)))
                            .exec(txn)
                            .await?;
                    }

                    let model = OrderEntity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| DomainError::not_found("Order"))?;
                    Ok(Order::from(model))
                })
            })
            .await?;

        Ok(updated)
    }
}
