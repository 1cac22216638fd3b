//! Repository implementations using SeaORM

pub mod book_repository;
pub mod order_repository;
pub mod user_repository;

pub use book_repository::SeaOrmBookRepository;
pub use order_repository::SeaOrmOrderRepository;
pub use user_repository::SeaOrmUserRepository;
