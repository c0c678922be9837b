pub mod barcode_service;
pub mod pricing;
pub mod product_service;
pub use product_service::ProductService;
