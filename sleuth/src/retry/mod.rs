mod executor;

pub use executor::{RetryError, RetryExecutor, RetryPolicy};
