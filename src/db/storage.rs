//! Two-phase startup
//!
//! `prepare_storage` opens the database, backs it up when migrations are
//! pending, applies every migration and detects the resulting schema shape.
//! Only then does a `PreparedStorage` exist, and services are built from it,
//! so nothing can touch the store before migrations finished.

use super::migration_tool::backup_database;
use super::migrations::{self, MigrationReport};
use super::schema::SchemaShape;
use super::{Database, DbResult};
use crate::config::StorageConfig;

/// Proof that migrations ran against `db`
pub struct PreparedStorage {
    db: Database,
    shape: SchemaShape,
    report: MigrationReport,
}

impl PreparedStorage {
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn shape(&self) -> SchemaShape {
        self.shape
    }

    pub fn report(&self) -> &MigrationReport {
        &self.report
    }

    pub fn into_parts(self) -> (Database, SchemaShape) {
        (self.db, self.shape)
    }
}

/// Open and migrate the database described by `config`
pub fn prepare_storage(config: &StorageConfig) -> DbResult<PreparedStorage> {
    let db_path = config.db_path();
    let existed = db_path.exists();

    let db = Database::open_in_dir(config)?;
    tracing::info!("Initializing database at {:?}", db_path);

    let report = db.with_connection(|conn| {
        let pending = migrations::pending(conn)?;

        if existed && config.backup_before_migrate && !pending.is_empty() {
            // Fold the WAL into the main file so the copy is complete
            conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
            let backup = backup_database(&db_path)?;
            tracing::info!(
                "Backed up database to {} before applying {:?}",
                backup.display(),
                pending
            );
        }

        migrations::apply_all(conn)
    })?;

    let shape = db.with_connection(SchemaShape::detect)?;

    tracing::info!(
        "Storage ready: {} migration(s) applied, {} skipped, schema {:?}",
        report.applied.len(),
        report.skipped.len(),
        shape
    );

    Ok(PreparedStorage { db, shape, report })
}
