pub mod connection;
pub mod product;
