use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the connection every component shares.
pub const MAIN_CONNECTION: &str = "main";

/// Schema version recorded as the `db_version` setting at install time.
pub const DB_VERSION: i64 = 30_100;

/// Token that stands in for the base path inside the installation artifact.
pub const APP_ROOT_TOKEN: &str = "$APP_ROOT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub basic: BasicConfig,
    #[serde(default)]
    pub install: InstallConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    /// Base64 encoded secret of at least 64 bytes used for private cookies.
    /// A random key is generated per process when unset.
    pub cookie_secret: Option<String>,
    pub insecure_cookie: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Application root; relative paths submitted to the installer resolve against it.
    pub base_path: PathBuf,
    /// Location of the installation artifact, relative to `base_path` unless absolute.
    pub artifact_path: PathBuf,
    /// Optional replacement for the bundled install script.
    pub sql_path: Option<PathBuf>,
    /// Refuse step 2 when the target database already holds an install with the same prefix.
    pub check_existing_install: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            cookie_secret: None,
            insecure_cookie: false,
        }
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            artifact_path: PathBuf::from("config/database.toml"),
            sql_path: None,
            check_existing_install: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

impl Config {
    /// Defaults, then `config.toml`, then `TRACKLET_*` environment variables
    /// (`TRACKLET_INSTALL__BASE_PATH=/srv/tracklet`).
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment("config.toml").extract()
    }

    pub fn figment(toml_path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(toml_path.as_ref()))
            .merge(Env::prefixed("TRACKLET_").split("__"))
    }
}

impl InstallConfig {
    pub fn artifact_file(&self) -> PathBuf {
        self.resolve(&self.artifact_path)
    }

    /// Absolute paths pass through; anything else is joined onto `base_path`.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    pub fn is_installed(&self) -> bool {
        self.artifact_file().exists()
    }
}
