//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::DomainError;
use crate::models::book::{Book, BookChanges, BookStatus, NewBook};
use crate::models::order::{Order, OrderItem, OrderStatus, PaymentMethod, ShippingAddress};
use crate::models::user::{self, Role};

/// Filter criteria for catalog queries
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    /// Case-insensitive match against title, author, isbn and category
    pub search: Option<String>,
    /// Restrict to a single vendor's books
    pub vendor_id: Option<i32>,
    /// `Some(true)` only purchased, `Some(false)` only unsold
    pub purchased: Option<bool>,
    /// 1-based page
    pub page: u64,
    pub limit: u64,
}

/// Row offset of a 1-based page. `None` when it does not fit a SQL offset,
/// which callers treat as a page past the end.
pub fn page_offset(page: u64, limit: u64) -> Option<u64> {
    page.saturating_sub(1)
        .checked_mul(limit.max(1))
        .filter(|offset| i64::try_from(*offset).is_ok())
}

/// Paginated result with total count
#[derive(Debug)]
pub struct PaginatedBooks {
    pub books: Vec<Book>,
    pub total: u64,
}

/// Purchase stamp written onto every book of a new order
#[derive(Debug, Clone)]
pub struct PurchaseMark {
    pub purchased_at: String,
    pub purchased_by: i32,
    pub country: String,
    pub lat_lng: Option<[f64; 2]>,
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find one page of books matching the filter, newest purchases first when
    /// `purchased` is set, insertion order otherwise
    async fn find_page(&self, filter: BookFilter) -> Result<PaginatedBooks, DomainError>;

    /// Every book visible to a scope, for in-memory aggregation
    async fn find_all(&self, vendor_id: Option<i32>) -> Result<Vec<Book>, DomainError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError>;

    /// All ISBNs currently in the catalog
    async fn all_isbns(&self) -> Result<HashSet<String>, DomainError>;

    /// Create a new book
    async fn create(&self, book: NewBook) -> Result<Book, DomainError>;

    /// Insert many books atomically
    async fn create_many(&self, books: Vec<NewBook>) -> Result<Vec<Book>, DomainError>;

    /// Apply a partial update
    async fn update(&self, id: i32, changes: BookChanges) -> Result<Book, DomainError>;

    /// Delete a book by ID
    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    /// Delete every book whose ID is listed, returning how many went away
    async fn delete_many(&self, ids: &[i32]) -> Result<u64, DomainError>;
}

/// Input for registering an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Profile fields to overwrite; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub avatar: Option<String>,
}

/// Repository trait for User entity
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DomainError>;

    async fn create(&self, input: NewUser) -> Result<user::Model, DomainError>;

    async fn update_profile(
        &self,
        id: i32,
        changes: ProfileChanges,
    ) -> Result<user::Model, DomainError>;

    /// Count users with a role, optionally only those created before a timestamp
    async fn count_by_role(
        &self,
        role: Role,
        created_before: Option<String>,
    ) -> Result<u64, DomainError>;
}

/// Input for placing an order; prices are already resolved from the catalog
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i32,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
    pub note: Option<String>,
    pub created_at: String,
}

/// Status transition applied by an administrator
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub cancel_reason: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    /// When the change happens; also decides the order's age-derived status
    pub at: DateTime<Utc>,
    /// Status propagated to the order's books
    pub book_status: Option<BookStatus>,
}

#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub user_id: Option<i32>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug)]
pub struct PaginatedOrders {
    pub orders: Vec<Order>,
    pub total: u64,
}

/// Repository trait for Order entity
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order and stamp its books as purchased in one transaction
    async fn place(&self, order: NewOrder, mark: PurchaseMark) -> Result<Order, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, DomainError>;

    /// Newest first
    async fn find_page(&self, filter: OrderFilter) -> Result<PaginatedOrders, DomainError>;

    /// Record a status change and sync the books it covers. Orders whose
    /// effective status is already terminal are rejected.
    async fn update_status(&self, id: i32, update: StatusUpdate) -> Result<Order, DomainError>;
}
