pub mod connection;
pub mod label;
pub mod product;
pub mod search;
