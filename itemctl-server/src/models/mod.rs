//! Domain models with validation at construction
//!
//! Request bodies deserialize into these types; anything that does not fit
//! the shape becomes a ValidationError before the store is touched.

pub mod item;
pub mod validation;

pub use item::{Item, ItemPatch, NewItem, UpdateItemRequest};
pub use validation::ValidationError;
