//! Backend selection and the connection parameters collected by the installer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::TrackletError;

/// Generic table prefix used by the bundled install script.
pub const GENERIC_PREFIX: &str = "tracklet_";

/// Driver layer used to reach the backend. Only sqlx exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    #[default]
    Sqlx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Mysql,
    Postgresql,
    Sqlite,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Mysql, Backend::Postgresql, Backend::Sqlite];

    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Mysql => "mysql",
            Backend::Postgresql => "postgresql",
            Backend::Sqlite => "sqlite",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Backend::Mysql => "MySQL",
            Backend::Postgresql => "PostgreSQL",
            Backend::Sqlite => "SQLite",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Backend::ALL.into_iter().find(|b| b.as_str() == value)
    }

    /// File based backends only need a path; network ones need a server.
    pub fn is_file_based(self) -> bool {
        matches!(self, Backend::Sqlite)
    }

    /// Literal substitutions applied to the generic install script.
    pub fn script_replacements(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Backend::Mysql => &[(
                "COLLATE utf8_unicode_ci",
                "CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci",
            )],
            Backend::Sqlite => &[
                ("COLLATE utf8_unicode_ci", "COLLATE NOCASE"),
                ("AUTO_INCREMENT", ""),
            ],
            Backend::Postgresql => &[
                ("integer NOT NULL AUTO_INCREMENT", "SERIAL NOT NULL"),
                ("COLLATE utf8_unicode_ci", ""),
            ],
        }
    }

    /// Rewrites `{prefix}` table references and, for PostgreSQL, numbers the
    /// `?` placeholders as `$1`, `$2`, ...
    pub fn render_query(self, prefix: &str, sql: &str) -> String {
        let sql = sql.replace("{prefix}", prefix);
        if self != Backend::Postgresql {
            return sql;
        }
        let mut out = String::with_capacity(sql.len() + 8);
        let mut n = 0;
        for ch in sql.chars() {
            if ch == '?' {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            } else {
                out.push(ch);
            }
        }
        out
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a SQLite database file is opened. Server backends ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Read and write, creating the file when missing.
    #[default]
    ReadWriteCreate,
    /// Read only; a missing file is an error.
    ReadOnly,
}

impl OpenMode {
    fn sqlite_mode(self) -> &'static str {
        match self {
            OpenMode::ReadWriteCreate => "rwc",
            OpenMode::ReadOnly => "ro",
        }
    }
}

/// Backend specific connection fields, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    Mysql(ServerConfig),
    Postgresql(ServerConfig),
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
}

/// Connection parameters gathered by the installer and persisted in the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub driver: Driver,
    #[serde(flatten)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub prefix: String,
}

impl BackendConfig {
    pub fn backend(&self) -> Backend {
        match self {
            BackendConfig::Mysql(_) => Backend::Mysql,
            BackendConfig::Postgresql(_) => Backend::Postgresql,
            BackendConfig::Sqlite { .. } => Backend::Sqlite,
        }
    }
}

impl ConnectionConfig {
    pub fn backend(&self) -> Backend {
        self.backend.backend()
    }

    /// Connection URL understood by `sqlx::any`.
    pub fn url(&self) -> Result<String, TrackletError> {
        self.url_with(OpenMode::default())
    }

    pub fn url_with(&self, mode: OpenMode) -> Result<String, TrackletError> {
        match &self.backend {
            BackendConfig::Sqlite { path } => sqlite_url(path, mode),
            BackendConfig::Mysql(server) => server_url("mysql", server),
            BackendConfig::Postgresql(server) => server_url("postgres", server),
        }
    }
}

/// File names are percent-encoded so `?`, `#` and `%` reach SQLite as typed.
fn sqlite_url(path: &Path, mode: OpenMode) -> Result<String, TrackletError> {
    let absolute = std::path::absolute(path)?;
    let file = Url::from_file_path(&absolute).map_err(|()| {
        TrackletError::InvalidConfig(format!("unusable SQLite path {}", path.display()))
    })?;
    Ok(format!("sqlite://{}?mode={}", file.path(), mode.sqlite_mode()))
}

fn server_url(scheme: &str, server: &ServerConfig) -> Result<String, TrackletError> {
    let mut url = Url::parse(&format!("{scheme}://{}/", server.host))?;
    url.set_username(&server.username)
        .map_err(|_| TrackletError::InvalidConfig(format!("invalid username for {scheme}")))?;
    if !server.password.is_empty() {
        url.set_password(Some(&server.password))
            .map_err(|_| TrackletError::InvalidConfig(format!("invalid password for {scheme}")))?;
    }
    url.set_path(&format!("/{}", server.database));
    Ok(url.to_string())
}
