use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::time::parse_timestamp;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub items: String, // JSON array of OrderItem
    pub total_amount: f64,
    pub ship_street: String,
    pub ship_city: String,
    pub ship_state: String,
    pub ship_zip_code: String,
    pub ship_country: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    #[sea_orm(default_value = "pending")]
    pub payment_status: String,
    pub paid_at: Option<String>,
    #[sea_orm(default_value = "pending")]
    pub status: String,
    pub status_history: String, // JSON array of StatusChange
    pub delivered_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancel_reason: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Delivered and cancelled orders accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Invalid order status: {}", other)),
        }
    }
}

/// Status shown to clients: explicit terminal states win, otherwise the
/// order progresses with age
pub fn effective_status(
    status: &str,
    delivered_at: Option<&str>,
    created_at: &str,
    now: DateTime<Utc>,
) -> OrderStatus {
    if status == OrderStatus::Cancelled.as_str() {
        return OrderStatus::Cancelled;
    }
    if status == OrderStatus::Delivered.as_str() || delivered_at.is_some() {
        return OrderStatus::Delivered;
    }

    let Some(created) = parse_timestamp(created_at) else {
        return status.parse().unwrap_or_default();
    };
    let age = now - created;
    if age >= Duration::days(3) {
        OrderStatus::Delivered
    } else if age >= Duration::days(1) {
        OrderStatus::Shipped
    } else {
        OrderStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Upi,
    CashOnDelivery,
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::Wallet => "wallet",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "upi" => Ok(PaymentMethod::Upi),
            "cash_on_delivery" => Ok(PaymentMethod::CashOnDelivery),
            "wallet" => Ok(PaymentMethod::Wallet),
            other => Err(format!("Invalid payment method: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub book_id: i32,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: OrderStatus,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub transaction_id: Option<String>,
    pub status: String,
    pub paid_at: Option<String>,
}

// DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub payment_details: PaymentDetails,
    pub status: String,
    pub status_history: Vec<StatusChange>,
    pub delivered_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancel_reason: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Model> for Order {
    fn from(model: Model) -> Self {
        let items: Vec<OrderItem> = serde_json::from_str(&model.items).unwrap_or_default();
        let status_history: Vec<StatusChange> =
            serde_json::from_str(&model.status_history).unwrap_or_default();

        Self {
            id: model.id,
            user_id: model.user_id,
            items,
            total_amount: model.total_amount,
            shipping_address: ShippingAddress {
                street: model.ship_street,
                city: model.ship_city,
                state: model.ship_state,
                zip_code: model.ship_zip_code,
                country: model.ship_country,
            },
            payment_method: model.payment_method,
            payment_details: PaymentDetails {
                transaction_id: model.transaction_id,
                status: model.payment_status,
                paid_at: model.paid_at,
            },
            status: model.status,
            status_history,
            delivered_at: model.delivered_at,
            cancelled_at: model.cancelled_at,
            cancel_reason: model.cancel_reason,
            tracking_number: model.tracking_number,
            tracking_url: model.tracking_url,
            note: model.note,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl Order {
    pub fn effective_status(&self, now: DateTime<Utc>) -> OrderStatus {
        effective_status(
            &self.status,
            self.delivered_at.as_deref(),
            &self.created_at,
            now,
        )
    }
}
