//! Database schema definitions and migration logic.

use rusqlite::{Connection, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the dashboard cache.
pub const SCHEMA_SQL: &str = r"
    -- Issues, keyed by their human-readable key
    CREATE TABLE IF NOT EXISTS issues (
        key TEXT PRIMARY KEY,
        remote_id TEXT NOT NULL DEFAULT '',
        project_key TEXT NOT NULL,
        summary TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL DEFAULT '',
        issue_type TEXT NOT NULL DEFAULT '',
        priority TEXT,
        assignee_name TEXT,
        assignee_id TEXT,
        reporter_name TEXT,
        reporter_id TEXT,
        created_at TEXT,
        updated_at TEXT,
        resolved_at TEXT,
        synced_at TEXT NOT NULL,
        CHECK (length(key) >= 1)
    );

    CREATE INDEX IF NOT EXISTS idx_issues_project_key ON issues(project_key);
    CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status);
    CREATE INDEX IF NOT EXISTS idx_issues_assignee_id ON issues(assignee_id);
    CREATE INDEX IF NOT EXISTS idx_issues_created_at ON issues(created_at);

    -- Fix versions, replaced wholesale on every upsert
    CREATE TABLE IF NOT EXISTS issue_fix_versions (
        issue_key TEXT NOT NULL,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        PRIMARY KEY (issue_key, position),
        FOREIGN KEY (issue_key) REFERENCES issues(key) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_issue_fix_versions_name ON issue_fix_versions(name);

    -- Projects
    CREATE TABLE IF NOT EXISTS projects (
        key TEXT PRIMARY KEY,
        remote_id TEXT NOT NULL DEFAULT '',
        name TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        project_type TEXT NOT NULL DEFAULT '',
        lead_name TEXT,
        lead_email TEXT,
        synced_at TEXT NOT NULL
    );

    -- Releases
    CREATE TABLE IF NOT EXISTS versions (
        remote_id TEXT PRIMARY KEY,
        project_key TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        released INTEGER NOT NULL DEFAULT 0,
        archived INTEGER NOT NULL DEFAULT 0,
        release_date TEXT,
        start_date TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_versions_project_key ON versions(project_key);

    -- Metadata (sync stamps)
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

/// Apply the schema to the database.
///
/// Idempotent: every statement uses `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    run_migrations(conn)?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    Ok(())
}

/// Bring an older database up to [`CURRENT_SCHEMA_VERSION`].
fn run_migrations(conn: &Connection) -> Result<()> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    // Version 0 databases predate the `synced_at` column on projects.
    if version < 1 {
        let has_synced_at: bool = conn
            .prepare("SELECT 1 FROM pragma_table_info('projects') WHERE name='synced_at'")
            .and_then(|mut stmt| stmt.exists([]))
            .unwrap_or(false);
        if !has_synced_at {
            conn.execute(
                "ALTER TABLE projects ADD COLUMN synced_at TEXT NOT NULL DEFAULT ''",
                [],
            )?;
        }
    }

    if version != CURRENT_SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    }
    Ok(())
}
