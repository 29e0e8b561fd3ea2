//! Salad Recipes Shared Library
//!
//! Domain models, pagination types and input validation used by the
//! persistence layer and by its callers.

pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use models::*;
pub use types::*;
