//! The installation artifact: a TOML file holding the chosen connection
//! parameters. Its presence marks the system as installed.

use std::fs;
use std::path::Path;

use crate::config::APP_ROOT_TOKEN;
use crate::db::{BackendConfig, ConnectionConfig};
use crate::error::TrackletError;

const HEADER: &str = "# Database configuration written by the Tracklet installer.\n";

/// Serialize the connection parameters. Paths under `base` are written
/// relative to the `$APP_ROOT` token.
pub fn render(config: &ConnectionConfig, base: &Path) -> Result<String, TrackletError> {
    let mut portable = config.clone();
    if let BackendConfig::Sqlite { path } = &mut portable.backend
        && let Ok(rest) = path.strip_prefix(base)
    {
        *path = Path::new(APP_ROOT_TOKEN).join(rest);
    }
    let body = toml::to_string(&portable)?;
    Ok(format!("{HEADER}{body}"))
}

/// Write the artifact. Parent directories are not created.
pub fn persist(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, content)
}

/// Read an artifact back, expanding `$APP_ROOT` to `base`.
pub fn load(path: &Path, base: &Path) -> Result<ConnectionConfig, TrackletError> {
    let content = fs::read_to_string(path)?;
    parse(&content, base)
}

pub fn parse(content: &str, base: &Path) -> Result<ConnectionConfig, TrackletError> {
    let mut config: ConnectionConfig = toml::from_str(content)?;
    if let BackendConfig::Sqlite { path } = &mut config.backend
        && let Ok(rest) = path.strip_prefix(APP_ROOT_TOKEN)
    {
        *path = base.join(rest);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Driver, ServerConfig};
    use std::path::PathBuf;

    fn sqlite(path: &str) -> ConnectionConfig {
        ConnectionConfig {
            driver: Driver::Sqlx,
            backend: BackendConfig::Sqlite {
                path: PathBuf::from(path),
            },
            prefix: "tl_".to_string(),
        }
    }

    #[test]
    fn paths_under_base_become_portable() {
        let content = render(&sqlite("/srv/tracklet/test.db"), Path::new("/srv/tracklet")).unwrap();
        assert!(content.contains(r#"driver = "sqlx""#));
        assert!(content.contains(r#"type = "sqlite""#));
        assert!(content.contains(r#"path = "$APP_ROOT/test.db""#));
        assert!(content.contains(r#"prefix = "tl_""#));

        let back = parse(&content, Path::new("/opt/elsewhere")).unwrap();
        assert_eq!(back, sqlite("/opt/elsewhere/test.db"));
    }

    #[test]
    fn paths_outside_base_are_kept() {
        let content = render(&sqlite("/var/lib/test.db"), Path::new("/srv/tracklet")).unwrap();
        assert!(content.contains(r#"path = "/var/lib/test.db""#));
    }

    #[test]
    fn server_backends_round_trip() {
        let cfg = ConnectionConfig {
            driver: Driver::Sqlx,
            backend: BackendConfig::Postgresql(ServerConfig {
                host: "db".to_string(),
                username: "tracker".to_string(),
                password: "secret".to_string(),
                database: "tracker".to_string(),
            }),
            prefix: String::new(),
        };
        let content = render(&cfg, Path::new("/srv")).unwrap();
        assert!(content.contains(r#"type = "postgresql""#));
        assert_eq!(parse(&content, Path::new("/srv")).unwrap(), cfg);
    }

    #[test]
    fn persist_does_not_create_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("database.toml");
        assert!(persist(&target, "x").is_err());
        assert!(!target.exists());
    }
}
