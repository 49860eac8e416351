//! Database migration system.
//!
//! The status table name is configurable, so migrations are SQL templates
//! rendered per table. Applied versions are tracked in `_migrations` keyed
//! by `(table_name, version)`; pending ones are applied in order.

use rusqlite::{params, Connection};

use super::error::DatabaseError;
use super::job_repo::quote_identifier;

/// A single migration definition.
struct Migration {
    version: u32,
    description: &'static str,
    /// Template; see [`render`] for the placeholders.
    sql: &'static str,
}

/// All migrations in order. Each is applied at most once per table.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_status_table",
        sql: "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY NOT NULL,
                bucket TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                group_id TEXT NOT NULL,
                input_key TEXT NOT NULL,
                output_key TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('PENDING', 'SUCCESS', 'FAILED')),
                created_at TEXT NOT NULL,
                completed_at TEXT,
                error_message TEXT,
                CHECK ((status = 'PENDING') = (completed_at IS NULL)),
                CHECK ((status = 'FAILED') = (error_message IS NOT NULL AND error_message <> ''))
            );",
    },
    Migration {
        version: 2,
        description: "add_transition_guards",
        sql: "CREATE TRIGGER IF NOT EXISTS {output_guard}
                BEFORE UPDATE OF output_key ON {table}
                WHEN NEW.output_key IS NOT OLD.output_key
            BEGIN
                SELECT RAISE(ABORT, 'output_key is immutable');
            END;
            CREATE TRIGGER IF NOT EXISTS {terminal_guard}
                BEFORE UPDATE ON {table}
                WHEN OLD.status <> 'PENDING'
            BEGIN
                SELECT RAISE(ABORT, 'job record is already terminal');
            END;",
    },
    Migration {
        version: 3,
        description: "index_owner_group_created",
        sql: "CREATE INDEX IF NOT EXISTS {owner_index}
                ON {table} (owner_id, group_id, created_at);",
    },
];

/// Highest schema version a status table is migrated to.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

/// Substitutes the quoted table name and the names of objects derived
/// from it.
fn render(sql: &str, table: &str) -> String {
    sql.replace("{table}", &quote_identifier(table))
        .replace(
            "{output_guard}",
            &quote_identifier(&format!("{}__output_key_immutable", table)),
        )
        .replace(
            "{terminal_guard}",
            &quote_identifier(&format!("{}__terminal_is_final", table)),
        )
        .replace(
            "{owner_index}",
            &quote_identifier(&format!("{}__owner_group_created", table)),
        )
}

/// Runs all pending migrations for `table` on the given connection.
pub fn run_all(conn: &Connection, table: &str) -> Result<(), DatabaseError> {
    // Create the migrations tracking table.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            table_name TEXT NOT NULL,
            version INTEGER NOT NULL,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (table_name, version)
        );",
    )?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations WHERE table_name = ?1",
        params![table],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        log::info!(
            "Running migration v{} on '{}': {}",
            migration.version,
            table,
            migration.description
        );

        let sql = render(migration.sql, table);
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| DatabaseError::Migration {
                table: table.to_string(),
                version: migration.version,
                reason: e.to_string(),
            })?;
        tx.execute(
            "INSERT INTO _migrations (table_name, version, description) VALUES (?1, ?2, ?3)",
            params![table, migration.version, migration.description],
        )?;
        tx.commit()?;
    }

    Ok(())
}
