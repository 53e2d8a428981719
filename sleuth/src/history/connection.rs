use libsql::{Builder, Connection};
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

/// libSQL database handle.
///
/// Keeps one primary connection: every `:memory:` connection opens its own
/// empty database, so the store must reuse a single connection.
#[derive(Clone)]
pub struct Database {
    db: Arc<libsql::Database>,
    conn: Connection,
    remote: bool,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let remote = config.url.starts_with("libsql://") || config.url.starts_with("https://");

        let db = if remote {
            if let Some(ref local_path) = config.local_path {
                Builder::new_remote_replica(
                    local_path,
                    config.url.clone(),
                    config.auth_token.clone().unwrap_or_default(),
                )
                .build()
                .await?
            } else {
                Builder::new_remote(
                    config.url.clone(),
                    config.auth_token.clone().unwrap_or_default(),
                )
                .build()
                .await?
            }
        } else if config.url == ":memory:" {
            Builder::new_local(":memory:").build().await?
        } else {
            let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
            Builder::new_local(path).build().await?
        };

        let conn = db.connect()?;
        let database = Self {
            db: Arc::new(db),
            conn,
            remote,
        };
        database.configure().await;
        schema::init_schema(&database.conn).await?;

        tracing::info!(url = %redact_url(&config.url), remote, "History database ready");
        Ok(database)
    }

    pub async fn in_memory() -> Result<Self> {
        Self::new(&DatabaseConfig {
            url: ":memory:".to_string(),
            auth_token: None,
            local_path: None,
        })
        .await
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    async fn configure(&self) {
        if self.remote {
            return;
        }

        if let Err(error) = self.conn.execute_batch("PRAGMA busy_timeout = 5000").await {
            tracing::warn!(error = %error, "Failed to set SQLite busy_timeout");
        }
    }

    /// Pull remote replica changes. No-op for local databases.
    pub async fn sync(&self) -> Result<()> {
        if let Ok(sync) = self.db.sync().await {
            tracing::info!("Database synced: {:?}", sync);
        }
        Ok(())
    }
}

fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{base}?…"),
        None => url.to_string(),
    }
}
