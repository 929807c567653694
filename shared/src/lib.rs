//! Shared types and pricing logic for the Quote Builder
//!
//! This crate contains the quote record shapes, the pricing derivation engine
//! and the editing state machine shared between the backend and the browser
//! (via WASM).

pub mod editor;
pub mod history;
pub mod models;
pub mod pricing;
pub mod recalc;
pub mod types;
pub mod validation;

pub use editor::*;
pub use history::*;
pub use models::*;
pub use pricing::*;
pub use recalc::*;
pub use types::*;
pub use validation::*;
