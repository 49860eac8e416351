//! Job repository: row-level operations on a status table.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};

/// A raw status row from the database.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: String,
    pub bucket: String,
    pub owner_id: String,
    pub group_id: String,
    pub input_key: String,
    pub output_key: String,
    pub status: String,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub error_message: Option<String>,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            bucket: row.get("bucket")?,
            owner_id: row.get("owner_id")?,
            group_id: row.get("group_id")?,
            input_key: row.get("input_key")?,
            output_key: row.get("output_key")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            completed_at: row.get("completed_at")?,
            error_message: row.get("error_message")?,
        })
    }
}

/// Quotes a table name for interpolation into SQL.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Inserts a new row. Fails if the id already exists.
pub fn insert(db: &Database, table: &str, job: &JobRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            &format!(
                "INSERT INTO {} (id, bucket, owner_id, group_id, input_key, output_key,
                 status, created_at, completed_at, error_message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                quote_identifier(table)
            ),
            params![
                job.id,
                job.bucket,
                job.owner_id,
                job.group_id,
                job.input_key,
                job.output_key,
                job.status,
                job.created_at,
                job.completed_at,
                job.error_message,
            ],
        )?;
        Ok(())
    })
}

/// Moves a PENDING row to `status` in a single conditional update.
///
/// `completed_at` is raised to `created_at` if it is earlier. Returns the
/// number of rows changed: 0 when the id is unknown or the row is no
/// longer PENDING.
pub fn finalize_pending(
    db: &Database,
    table: &str,
    id: &str,
    status: &str,
    completed_at: &str,
    error_message: Option<&str>,
) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            &format!(
                "UPDATE {} SET status = ?2, completed_at = MAX(?3, created_at), error_message = ?4
                 WHERE id = ?1 AND status = 'PENDING'",
                quote_identifier(table)
            ),
            params![id, status, completed_at, error_message],
        )?;
        Ok(changed)
    })
}

/// Finds a row by its ID.
pub fn find_by_id(db: &Database, table: &str, id: &str) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE id = ?1", quote_identifier(table)),
                params![id],
                JobRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Rows for an owner, optionally narrowed to one group, newest first.
pub fn query_by_owner(
    db: &Database,
    table: &str,
    owner_id: &str,
    group_id: Option<&str>,
) -> Result<Vec<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let table = quote_identifier(table);
        let rows = match group_id {
            Some(group_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT * FROM {} WHERE owner_id = ?1 AND group_id = ?2
                     ORDER BY created_at DESC, id DESC",
                    table
                ))?;
                let rows = stmt
                    .query_map(params![owner_id, group_id], JobRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT * FROM {} WHERE owner_id = ?1 ORDER BY created_at DESC, id DESC",
                    table
                ))?;
                let rows = stmt
                    .query_map(params![owner_id], JobRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    })
}
