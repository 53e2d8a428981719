pub mod admin;
pub(crate) mod health;
pub mod history;
pub mod reports;
pub mod research;

pub use health::health_check;
