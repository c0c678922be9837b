pub mod error;
pub mod templates;
