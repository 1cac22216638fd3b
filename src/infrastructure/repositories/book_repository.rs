//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr, TransactionTrait,
};
use std::collections::HashSet;

use crate::domain::{page_offset, BookFilter, BookRepository, DomainError, PaginatedBooks};
use crate::models::book::{
    ActiveModel, Book, BookChanges, Column, DEFAULT_COVER_IMAGE, Entity as BookEntity, NewBook,
};
use crate::utils::time::now_timestamp;

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Map a unique-index violation on `isbn` to a conflict the API can report
fn map_write_error(e: DbErr, isbn: &str) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(format!(
            "A book with ISBN {} already exists in the database",
            isbn
        )),
        _ => DomainError::from(e),
    }
}

fn new_active_model(book: NewBook, now: &str) -> ActiveModel {
    ActiveModel {
        title: Set(book.title),
        author: Set(book.author),
        isbn: Set(book.isbn),
        price: Set(book.price),
        description: Set(book.description),
        category: Set(book.category),
        cover_image: Set(book
            .cover_image
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_string())),
        vendor_id: Set(book.vendor_id),
        status: Set("Available".to_string()),
        created_at: Set(now.to_owned()),
        updated_at: Set(now.to_owned()),
        ..Default::default()
    }
}

const LIKE_ESCAPE: char = '!';

/// Make LIKE wildcards in user input match literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Substring match on any of the searchable columns
fn search_condition(q: &str) -> Condition {
    let pattern = LikeExpr::new(format!("%{}%", escape_like(q))).escape(LIKE_ESCAPE);
    [Column::Title, Column::Author, Column::Isbn, Column::Category]
        .into_iter()
        .fold(Condition::any(), |cond, col| {
            cond.add(Expr::col((col.entity_name(), col)).like(pattern.clone()))
        })
}

fn scoped(vendor_id: Option<i32>) -> Select<BookEntity> {
    let mut query = BookEntity::find();
    if let Some(vendor_id) = vendor_id {
        query = query.filter(Column::VendorId.eq(vendor_id));
    }
    query
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_page(&self, filter: BookFilter) -> Result<PaginatedBooks, DomainError> {
        let mut query = scoped(filter.vendor_id);

        match filter.purchased {
            Some(true) => query = query.filter(Column::PurchasedAt.is_not_null()),
            Some(false) => query = query.filter(Column::PurchasedAt.is_null()),
            None => {}
        }

        if let Some(q) = filter.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            // SQLite LIKE is case-insensitive for ASCII only
            query = query.filter(search_condition(q));
        }

        query = if filter.purchased == Some(true) {
            query.order_by_desc(Column::PurchasedAt)
        } else {
            query.order_by_asc(Column::Id)
        };

        let limit = filter.limit.max(1);
        let paginator = query.paginate(&self.db, limit);
        let total = paginator.num_items().await?;
        if page_offset(filter.page, limit).is_none() {
            return Ok(PaginatedBooks { books: Vec::new(), total });
        }
        let books = paginator
            .fetch_page(filter.page.saturating_sub(1))
            .await?
            .into_iter()
            .map(Book::from)
            .collect();

        Ok(PaginatedBooks { books, total })
    }

    async fn find_all(&self, vendor_id: Option<i32>) -> Result<Vec<Book>, DomainError> {
        let books = scoped(vendor_id)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
        let book = BookEntity::find_by_id(id).one(&self.db).await?;
        Ok(book.map(Book::from))
    }

    async fn all_isbns(&self) -> Result<HashSet<String>, DomainError> {
        let isbns: Vec<String> = BookEntity::find()
            .select_only()
            .column(Column::Isbn)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(isbns.into_iter().collect())
    }

    async fn create(&self, book: NewBook) -> Result<Book, DomainError> {
        let isbn = book.isbn.clone();
        let now = now_timestamp();

        let model = new_active_model(book, &now)
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, &isbn))?;
        Ok(Book::from(model))
    }

    async fn create_many(&self, books: Vec<NewBook>) -> Result<Vec<Book>, DomainError> {
        let now = now_timestamp();

        let inserted = self
            .db
            .transaction::<_, Vec<Book>, DomainError>(|txn| {
                Box::pin(async move {
                    let mut inserted = Vec::with_capacity(books.len());
                    for book in books {
                        let isbn = book.isbn.clone();
                        let model = new_active_model(book, &now)
                            .insert(txn)
                            .await
                            .map_err(|e| map_write_error(e, &isbn))?;
                        inserted.push(Book::from(model));
                    }
                    Ok(inserted)
                })
            })
            .await?;

        Ok(inserted)
    }

    async fn update(&self, id: i32, changes: BookChanges) -> Result<Book, DomainError> {
        let existing = BookEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Book"))?;

        let isbn = changes.isbn.clone().unwrap_or_else(|| existing.isbn.clone());
        let mut active: ActiveModel = existing.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(author) = changes.author {
            active.author = Set(author);
        }
        if let Some(isbn) = changes.isbn {
            active.isbn = Set(isbn);
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(category) = changes.category {
            active.category = Set(category);
        }
        if let Some(cover_image) = changes.cover_image {
            active.cover_image = Set(cover_image);
        }
        if let Some(status) = changes.status {
            active.status = Set(status.to_string());
        }
        active.updated_at = Set(now_timestamp());

        let result = active
            .update(&self.db)
            .await
            .map_err(|e| map_write_error(e, &isbn))?;
        Ok(Book::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = BookEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Book"));
        }

        Ok(())
    }

    async fn delete_many(&self, ids: &[i32]) -> Result<u64, DomainError> {
        let result = BookEntity::delete_many()
            .filter(Column::Id.is_in(ids.to_vec()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off!"), "50!%!_off!!");
        assert_eq!(escape_like("Dune"), "Dune");
    }

    #[test]
    fn search_uses_escape_clause() {
        let sql = BookEntity::find()
            .filter(search_condition("50%"))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("LIKE '%50!%%' ESCAPE '!'"), "{}", sql);
    }
}
