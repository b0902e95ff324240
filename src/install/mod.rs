//! Installation wizard core: validation, the install session, the schema
//! installer, seed records and the artifact writer.

pub mod artifact;
pub mod installer;
pub mod seed;
pub mod session;
pub mod validate;

use std::borrow::Cow;
use std::fs;

use tracing::{info, warn};

use crate::config::{InstallConfig, MAIN_CONNECTION};
use crate::db::{BackendConfig, ConnectionConfig, ConnectionRegistry, INSTALL_SQL, OpenMode};
use crate::error::TrackletError;
use validate::AdminAccountInput;

/// Outcome of a successful finalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Rendered artifact content.
    pub artifact: String,
    /// False when the artifact could not be written and must be placed by hand.
    pub written: bool,
    pub seed: seed::SeedSummary,
}

/// Install script to run: the configured override or the bundled one.
pub fn install_script(install: &InstallConfig) -> Result<Cow<'static, str>, TrackletError> {
    match &install.sql_path {
        Some(path) => Ok(Cow::Owned(fs::read_to_string(install.resolve(path))?)),
        None => Ok(Cow::Borrowed(INSTALL_SQL)),
    }
}

/// Open the database, create the schema and seed rows in one transaction,
/// then write the artifact.
pub async fn finalize(
    install: &InstallConfig,
    max_connections: u32,
    db: &ConnectionConfig,
    admin: &AdminAccountInput,
    host: &str,
) -> Result<Completion, TrackletError> {
    let script = install_script(install)?;
    let statements = installer::prepare(&script, db.backend(), &db.prefix);

    let mut registry = ConnectionRegistry::new(max_connections);
    let conn = registry.open(db, MAIN_CONNECTION).await?;

    let mut tx = conn.pool().begin().await?;
    let applied = async {
        let count = installer::run(&mut *tx, &statements).await?;
        let seed = seed::write(&mut *tx, conn.backend(), conn.prefix(), admin, host).await?;
        Ok::<_, TrackletError>((count, seed))
    }
    .await;

    let (count, seed) = match applied {
        Ok(done) => done,
        Err(err) => {
            if let Err(rb) = tx.rollback().await {
                warn!(error = %rb, "rollback after failed install did not complete");
            }
            conn.pool().close().await;
            return Err(err);
        }
    };
    tx.commit().await?;
    conn.pool().close().await;
    info!(statements = count, backend = %db.backend(), "schema installed");

    let content = artifact::render(db, &install.base_path)?;
    let target = install.artifact_file();
    let written = match artifact::persist(&target, &content) {
        Ok(()) => {
            info!(path = %target.display(), "installation artifact written");
            true
        }
        Err(e) => {
            warn!(path = %target.display(), error = %e, "could not write installation artifact");
            false
        }
    };

    Ok(Completion {
        artifact: content,
        written,
        seed,
    })
}

/// True when the target database already holds an install under the
/// submitted prefix. Opens read only, so nothing is created; a missing SQLite
/// file, connection or query failures count as "not installed".
pub async fn installed_with_prefix(db: &ConnectionConfig) -> bool {
    if let BackendConfig::Sqlite { path } = &db.backend
        && !path.exists()
    {
        return false;
    }
    let mut registry = ConnectionRegistry::new(1);
    let conn = match registry.open_with(db, "install_check", OpenMode::ReadOnly).await {
        Ok(conn) => conn,
        Err(e) => {
            warn!(error = %e, "install check could not connect");
            return false;
        }
    };
    let sql = conn.sql("SELECT value FROM {prefix}settings WHERE setting = ?");
    let found = sqlx::query(&sql)
        .bind("db_version".to_string())
        .fetch_optional(conn.pool())
        .await
        .ok()
        .flatten()
        .is_some();
    conn.pool().close().await;
    found
}
