//! Salad Recipes Backend Library
//!
//! PostgreSQL persistence for the salad recipes catalogue: repositories for
//! every entity, the recipe step renumbering engine and the filtered
//! salad listing.

pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod state;
