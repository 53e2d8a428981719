//! v1 API Data Transfer Objects.
//!
//! These types define the wire format for the v1 REST API. They are separate
//! from the domain models in `src/models/` and own the camelCase naming.

pub mod admin;
pub mod history;
pub mod reports;
pub mod research;

pub use admin::*;
pub use history::*;
pub use reports::*;
pub use research::*;
