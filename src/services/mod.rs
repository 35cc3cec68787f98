pub mod catalog;
pub mod orders;

pub use catalog::CatalogService;
pub use orders::OrderService;
