mod connection;
mod libsql;
mod repository;
mod schema;
pub mod similarity;
mod traits;

pub use self::libsql::LibSqlHistoryStore;
pub use connection::Database;
pub use repository::ResearchRepository;
pub use traits::HistoryStore;
