use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Research runs, one row per record id
        CREATE TABLE IF NOT EXISTS research (
            id TEXT PRIMARY KEY,
            topic TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            depth INTEGER NOT NULL DEFAULT 3,
            analysis TEXT,
            sources TEXT NOT NULL DEFAULT '[]',
            error_message TEXT,
            duration_ms INTEGER,
            search_text TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_research_created_at ON research(created_at);
        CREATE INDEX IF NOT EXISTS idx_research_status ON research(status);
        "#,
    )
    .await?;

    Ok(())
}
