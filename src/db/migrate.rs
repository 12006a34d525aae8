use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension};

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> AppResult<bool> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn migration_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let hit: Option<i32> = conn
        .query_row(
            "SELECT 1 FROM log
             WHERE operation = 'migration_applied' AND target = ?1
             LIMIT 1",
            [version],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Create the four domain tables with their foreign-key rules.
fn create_domain_tables(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS job_sites (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            client_name   TEXT NOT NULL,
            client_type   TEXT NOT NULL DEFAULT 'R' CHECK(client_type IN ('R','P')),
            address       TEXT NOT NULL DEFAULT '',
            latitude      REAL,
            longitude     REAL,
            mow_enabled   INTEGER NOT NULL DEFAULT 1,
            trim_enabled  INTEGER NOT NULL DEFAULT 1,
            weed_enabled  INTEGER NOT NULL DEFAULT 1,
            notes         TEXT NOT NULL DEFAULT '',
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS interventions (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            job_site_id      INTEGER NOT NULL REFERENCES job_sites(id) ON DELETE CASCADE,
            kind             TEXT NOT NULL CHECK(kind IN ('mow','trim','weed')),
            date             TEXT NOT NULL,
            started_at       TEXT,
            ended_at         TEXT,
            duration_minutes INTEGER,
            status           TEXT NOT NULL DEFAULT 'completed'
                             CHECK(status IN ('in_progress','completed')),
            notes            TEXT NOT NULL DEFAULT '',
            created_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS planned_weedings (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            job_site_id   INTEGER NOT NULL REFERENCES job_sites(id) ON DELETE CASCADE,
            planned_date  TEXT NOT NULL,
            done          INTEGER NOT NULL DEFAULT 0,
            notes         TEXT NOT NULL DEFAULT '',
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS extras (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            job_site_id   INTEGER REFERENCES job_sites(id) ON DELETE SET NULL,
            client_label  TEXT,
            description   TEXT NOT NULL,
            date          TEXT NOT NULL,
            amount        REAL NOT NULL DEFAULT 0,
            status        TEXT NOT NULL DEFAULT 'to_invoice'
                          CHECK(status IN ('to_invoice','invoiced')),
            notes         TEXT NOT NULL DEFAULT '',
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_interventions_site_kind_date
            ON interventions(job_site_id, kind, date);
        CREATE INDEX IF NOT EXISTS idx_interventions_status ON interventions(status);
        CREATE INDEX IF NOT EXISTS idx_weedings_site_date ON planned_weedings(job_site_id, planned_date);
        CREATE INDEX IF NOT EXISTS idx_extras_status ON extras(status);
        "#,
    )?;
    Ok(())
}

/// Databases created before client types existed lack `job_sites.client_type`.
fn migrate_add_client_type(conn: &Connection) -> AppResult<()> {
    let version = "20250412_0002_add_client_type";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    if !table_has_column(conn, "job_sites", "client_type")? {
        conn.execute(
            "ALTER TABLE job_sites ADD COLUMN client_type TEXT NOT NULL DEFAULT 'R'",
            [],
        )
        .map_err(|e| AppError::Migration(format!("Failed to add 'client_type' column: {e}")))?;

        success(format!(
            "Migration applied: {} → added 'client_type' to job_sites table",
            version
        ));
    }

    mark_applied(conn, version, "Added client_type to job_sites")?;
    Ok(())
}

/// Older databases stored no duration for timed visits.
fn migrate_add_duration(conn: &Connection) -> AppResult<()> {
    let version = "20250603_0003_add_intervention_duration";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    if !table_has_column(conn, "interventions", "duration_minutes")? {
        conn.execute_batch(
            r#"
            ALTER TABLE interventions ADD COLUMN duration_minutes INTEGER;

            UPDATE interventions
               SET duration_minutes =
                   CAST((julianday(ended_at) - julianday(started_at)) * 1440 AS INTEGER)
             WHERE started_at IS NOT NULL AND ended_at IS NOT NULL;
            "#,
        )
        .map_err(|e| AppError::Migration(format!("Failed to add 'duration_minutes': {e}")))?;

        success(format!(
            "Migration applied: {} → added 'duration_minutes' to interventions table",
            version
        ));
    }

    mark_applied(conn, version, "Added duration_minutes to interventions")?;
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Called by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    let fresh = !table_exists(conn, "job_sites")?;
    create_domain_tables(conn)?;

    if fresh {
        success("Created job site tables.");
    }

    migrate_add_client_type(conn)?;
    migrate_add_duration(conn)?;

    Ok(())
}
