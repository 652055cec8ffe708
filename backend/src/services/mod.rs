//! Business logic services for the Stockroom server

pub mod dashboard;
pub mod export;
pub mod location;
pub mod product;
pub mod product_import;
pub mod stock;
pub mod stock_movement;

pub use dashboard::DashboardService;
pub use export::ExportService;
pub use location::LocationService;
pub use product::ProductService;
pub use product_import::ProductImportService;
pub use stock::StockService;
pub use stock_movement::StockMovementService;
