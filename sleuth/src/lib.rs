pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod search;
