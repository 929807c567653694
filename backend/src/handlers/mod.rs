//! HTTP request handlers

pub mod catalog;
pub mod health;
pub mod quote;

pub use catalog::*;
pub use health::*;
pub use quote::*;
