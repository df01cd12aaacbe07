//! `SQLite` storage implementation.

use crate::error::{DashError, Result};
use crate::model::{FilterSet, Issue, Project, ProjectVersion};
use crate::storage::schema::apply_schema;
use crate::util::{format_timestamp, parse_remote_timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const ISSUE_COLUMNS: &str = "key, remote_id, summary, description, status, issue_type, priority,
     assignee_name, assignee_id, reporter_name, reporter_id,
     created_at, updated_at, resolved_at";

/// Metadata key holding the last successful sync of a project.
#[must_use]
pub fn last_sync_key(project_key: &str) -> String {
    format!("last_sync:{project_key}")
}

/// SQLite-backed issue cache.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Outcome of an issue upsert batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertCounts {
    pub created: usize,
    pub updated: usize,
}

impl SqliteStorage {
    /// Open a connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        apply_schema(&conn)?;
        debug!(path = %path.display(), "Opened database");
        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Run `f` inside an immediate transaction. Rolled back on error.
    ///
    /// # Errors
    ///
    /// Returns the closure's error or any database error.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let result = f(&tx)?;
        tx.commit()?;
        debug!(op, "Committed transaction");
        Ok(result)
    }

    // ========================================================================
    // ISSUES
    // ========================================================================

    /// Insert or overwrite issues by key.
    ///
    /// Every mutable column is overwritten and the fix-version list is
    /// replaced wholesale. All rows are written in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is committed in that case.
    pub fn upsert_issues(&mut self, issues: &[Issue]) -> Result<UpsertCounts> {
        let synced_at = format_timestamp(&Utc::now());
        self.mutate("upsert_issues", |tx| {
            let mut counts = UpsertCounts::default();
            for issue in issues {
                if issue.key.is_empty() {
                    return Err(DashError::validation("key", "issue key cannot be empty"));
                }
                let exists = tx
                    .prepare_cached("SELECT 1 FROM issues WHERE key = ?")?
                    .exists([&issue.key])?;
                if exists {
                    counts.updated += 1;
                } else {
                    counts.created += 1;
                }

                tx.prepare_cached(
                    "INSERT INTO issues (
                        key, remote_id, project_key, summary, description, status, issue_type,
                        priority, assignee_name, assignee_id, reporter_name, reporter_id,
                        created_at, updated_at, resolved_at, synced_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                    ON CONFLICT(key) DO UPDATE SET
                        remote_id = excluded.remote_id,
                        project_key = excluded.project_key,
                        summary = excluded.summary,
                        description = excluded.description,
                        status = excluded.status,
                        issue_type = excluded.issue_type,
                        priority = excluded.priority,
                        assignee_name = excluded.assignee_name,
                        assignee_id = excluded.assignee_id,
                        reporter_name = excluded.reporter_name,
                        reporter_id = excluded.reporter_id,
                        created_at = excluded.created_at,
                        updated_at = excluded.updated_at,
                        resolved_at = excluded.resolved_at,
                        synced_at = excluded.synced_at",
                )?
                .execute(params![
                    issue.key,
                    issue.id,
                    issue.project_key(),
                    issue.summary,
                    issue.description,
                    issue.status,
                    issue.issue_type,
                    issue.priority,
                    issue.assignee_name,
                    issue.assignee_id,
                    issue.reporter_name,
                    issue.reporter_id,
                    issue.created_at.as_ref().map(format_timestamp),
                    issue.updated_at.as_ref().map(format_timestamp),
                    issue.resolved_at.as_ref().map(format_timestamp),
                    synced_at,
                ])?;

                tx.prepare_cached("DELETE FROM issue_fix_versions WHERE issue_key = ?")?
                    .execute([&issue.key])?;
                let mut insert = tx.prepare_cached(
                    "INSERT INTO issue_fix_versions (issue_key, position, name) VALUES (?, ?, ?)",
                )?;
                for (position, name) in issue.fix_versions.iter().enumerate() {
                    let position = i64::try_from(position).unwrap_or(i64::MAX);
                    insert.execute(params![issue.key, position, name])?;
                }
            }
            Ok(counts)
        })
    }

    /// Get a single issue by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_issue(&self, key: &str) -> Result<Option<Issue>> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE key = ?");
        let issue = self
            .conn
            .query_row(&sql, [key], Self::issue_from_row)
            .optional()?;
        let Some(mut issue) = issue else {
            return Ok(None);
        };
        issue.fix_versions = self.fix_versions_for(key)?;
        Ok(Some(issue))
    }

    /// List stored issues matching `filters`, ordered by key.
    ///
    /// Equality dimensions are evaluated in SQL; the creation range and the
    /// fix version use the same in-memory evaluation as the fixture source,
    /// so cached and live reads agree.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_issues(&self, filters: &FilterSet) -> Result<Vec<Issue>> {
        let mut sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref project) = filters.project {
            sql.push_str(" AND project_key = ?");
            params.push(Box::new(project.clone()));
        }
        if let Some(ref assignee) = filters.assignee {
            sql.push_str(" AND (assignee_id = ? OR assignee_name = ?)");
            params.push(Box::new(assignee.clone()));
            params.push(Box::new(assignee.clone()));
        }
        if let Some(ref reporter) = filters.reporter {
            sql.push_str(" AND (reporter_id = ? OR reporter_name = ?)");
            params.push(Box::new(reporter.clone()));
            params.push(Box::new(reporter.clone()));
        }
        // Status, type and priority fold case beyond ASCII; `matches` applies them.
        sql.push_str(" ORDER BY key");

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), Self::issue_from_row)?;
        let mut issues = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        let mut versions = self.all_fix_versions()?;
        for issue in &mut issues {
            issue.fix_versions = versions.remove(&issue.key).unwrap_or_default();
        }
        issues.retain(|issue| filters.matches(issue));

        debug!(count = issues.len(), "Listed cached issues");
        Ok(issues)
    }

    /// Number of stored issues.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_issues(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn fix_versions_for(&self, key: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT name FROM issue_fix_versions WHERE issue_key = ? ORDER BY position",
        )?;
        let names = stmt
            .query_map([key], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn all_fix_versions(&self) -> Result<HashMap<String, Vec<String>>> {
        let mut stmt = self.conn.prepare(
            "SELECT issue_key, name FROM issue_fix_versions ORDER BY issue_key, position",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get(1)?)))?;
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            let (key, name) = row?;
            map.entry(key).or_default().push(name);
        }
        Ok(map)
    }

    fn issue_from_row(row: &rusqlite::Row) -> rusqlite::Result<Issue> {
        Ok(Issue {
            key: row.get(0)?,
            id: row.get(1)?,
            summary: row.get(2)?,
            description: row.get(3)?,
            status: row.get(4)?,
            issue_type: row.get(5)?,
            priority: row.get(6)?,
            assignee_name: row.get(7)?,
            assignee_id: row.get(8)?,
            reporter_name: row.get(9)?,
            reporter_id: row.get(10)?,
            created_at: parse_stored(row.get::<_, Option<String>>(11)?.as_deref()),
            updated_at: parse_stored(row.get::<_, Option<String>>(12)?.as_deref()),
            resolved_at: parse_stored(row.get::<_, Option<String>>(13)?.as_deref()),
            fix_versions: Vec::new(),
        })
    }

    // ========================================================================
    // PROJECTS & VERSIONS
    // ========================================================================

    /// Insert or overwrite projects by key.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn upsert_projects(&mut self, projects: &[Project]) -> Result<usize> {
        let synced_at = format_timestamp(&Utc::now());
        self.mutate("upsert_projects", |tx| {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO projects (key, remote_id, name, description, project_type, lead_name, lead_email, synced_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET
                    remote_id = excluded.remote_id,
                    name = excluded.name,
                    description = excluded.description,
                    project_type = excluded.project_type,
                    lead_name = excluded.lead_name,
                    lead_email = excluded.lead_email,
                    synced_at = excluded.synced_at",
            )?;
            for project in projects {
                stmt.execute(params![
                    project.key,
                    project.id,
                    project.name,
                    project.description,
                    project.project_type,
                    project.lead_name,
                    project.lead_email,
                    synced_at,
                ])?;
            }
            Ok(projects.len())
        })
    }

    /// All stored projects, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, remote_id, name, description, project_type, lead_name, lead_email
             FROM projects ORDER BY key",
        )?;
        let projects = stmt
            .query_map([], |row| {
                Ok(Project {
                    key: row.get(0)?,
                    id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    project_type: row.get(4)?,
                    lead_name: row.get(5)?,
                    lead_email: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    /// Insert or overwrite the releases of one project by remote id.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn upsert_versions(&mut self, versions: &[ProjectVersion]) -> Result<usize> {
        self.mutate("upsert_versions", |tx| {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO versions (remote_id, project_key, name, description, released, archived, release_date, start_date)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(remote_id) DO UPDATE SET
                    project_key = excluded.project_key,
                    name = excluded.name,
                    description = excluded.description,
                    released = excluded.released,
                    archived = excluded.archived,
                    release_date = excluded.release_date,
                    start_date = excluded.start_date",
            )?;
            for version in versions {
                stmt.execute(params![
                    version.id,
                    version.project_key,
                    version.name,
                    version.description,
                    version.released,
                    version.archived,
                    version.release_date.map(|d| d.to_string()),
                    version.start_date.map(|d| d.to_string()),
                ])?;
            }
            Ok(versions.len())
        })
    }

    /// Stored releases of a project, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_versions(&self, project_key: &str) -> Result<Vec<ProjectVersion>> {
        let mut stmt = self.conn.prepare(
            "SELECT remote_id, name, project_key, description, released, archived, release_date, start_date
             FROM versions WHERE project_key = ? ORDER BY name",
        )?;
        let versions = stmt
            .query_map([project_key], |row| {
                Ok(ProjectVersion {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    project_key: row.get(2)?,
                    description: row.get(3)?,
                    released: row.get(4)?,
                    archived: row.get(5)?,
                    release_date: parse_day(row.get::<_, Option<String>>(6)?),
                    start_date: parse_day(row.get::<_, Option<String>>(7)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(versions)
    }

    // ========================================================================
    // METADATA
    // ========================================================================

    /// Get a metadata value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a metadata value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub fn set_metadata(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO metadata (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// When `project_key` was last synced, if ever.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn last_sync(&self, project_key: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(parse_stored(
            self.get_metadata(&last_sync_key(project_key))?.as_deref(),
        ))
    }
}

fn parse_stored(value: Option<&str>) -> Option<DateTime<Utc>> {
    parse_remote_timestamp(value)
}

fn parse_day(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}
