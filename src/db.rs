pub mod connection;
pub use connection::{close, connect};
pub mod product_repo;
pub use product_repo::{ErpSession, ProductRepository, ProductSource};
