//! Domain models for the Quote Builder

mod catalog;
mod item;
mod option;
mod payload;
mod quote;

pub use catalog::*;
pub use item::*;
pub use option::*;
pub use payload::*;
pub use quote::*;
