use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::{Any, Pool};
use std::collections::HashMap;
use tracing::info;

use crate::db::backend::{Backend, ConnectionConfig, OpenMode};
use crate::db::storage::Storage;
use crate::error::TrackletError;

pub type AnyPool = Pool<Any>;

/// A database handle registered under a unique name.
#[derive(Clone, Debug)]
pub struct NamedConnection {
    name: String,
    backend: Backend,
    prefix: String,
    pool: AnyPool,
}

impl NamedConnection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Render a query written with `{prefix}` and `?` for this backend.
    pub fn sql(&self, sql: &str) -> String {
        self.backend.render_query(&self.prefix, sql)
    }

    pub fn storage(&self) -> Storage {
        Storage::new(self.clone())
    }
}

/// Name → handle registry. A name can be opened once for the lifetime of
/// the registry.
pub struct ConnectionRegistry {
    connections: HashMap<String, NamedConnection>,
    max_connections: u32,
}

impl ConnectionRegistry {
    pub fn new(max_connections: u32) -> Self {
        Self {
            connections: HashMap::new(),
            max_connections: max_connections.max(1),
        }
    }

    pub async fn open(
        &mut self,
        config: &ConnectionConfig,
        name: &str,
    ) -> Result<&NamedConnection, TrackletError> {
        self.open_with(config, name, OpenMode::default()).await
    }

    pub async fn open_with(
        &mut self,
        config: &ConnectionConfig,
        name: &str,
        mode: OpenMode,
    ) -> Result<&NamedConnection, TrackletError> {
        if self.is_open(name) {
            return Err(TrackletError::DuplicateConnection(name.to_string()));
        }

        let backend = config.backend();
        let pool = connect(config, self.max_connections, mode).await?;
        info!(name, backend = %backend, "database connection opened");

        let conn = NamedConnection {
            name: name.to_string(),
            backend,
            prefix: config.prefix.clone(),
            pool,
        };
        Ok(self.connections.entry(name.to_string()).or_insert(conn))
    }

    pub fn lookup(&self, name: &str) -> Option<&NamedConnection> {
        self.connections.get(name)
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    /// Like [`lookup`](Self::lookup) but reports a missing name as an error.
    pub fn require(&self, name: &str) -> Result<&NamedConnection, TrackletError> {
        self.lookup(name)
            .ok_or_else(|| TrackletError::UnknownConnection(name.to_string()))
    }
}

async fn connect(
    config: &ConnectionConfig,
    max_connections: u32,
    mode: OpenMode,
) -> Result<AnyPool, TrackletError> {
    install_default_drivers();
    let url = config.url_with(mode)?;
    // SQLite pools hold a single connection.
    let max = match config.backend() {
        Backend::Sqlite => 1,
        Backend::Mysql | Backend::Postgresql => max_connections,
    };
    let pool = AnyPoolOptions::new()
        .max_connections(max)
        .connect(&url)
        .await?;
    Ok(pool)
}
