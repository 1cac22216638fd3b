pub mod book;
pub mod order;
pub mod user;

pub use book::Book;
pub use order::Order;
pub use user::Profile;
