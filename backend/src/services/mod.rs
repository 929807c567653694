//! Quote and catalog services over the record store

pub mod catalog;
pub mod mapping;
pub mod quote;

pub use catalog::CatalogService;
pub use quote::QuoteGateway;
