use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::config::InstallConfig;
use crate::db::{Backend, BackendConfig, ConnectionConfig, Driver, ServerConfig};
use crate::install::seed::ANONYMOUS_USERNAME;
use crate::types::forms::{AdminForm, DatabaseForm};

const SERVER_FIELDS: [&str; 3] = ["host", "username", "database"];
const FILE_FIELDS: [&str; 1] = ["path"];
const ADMIN_FIELDS: [&str; 4] = ["username", "name", "password", "email"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Missing,
    Invalid,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Missing => f.write_str("missing"),
            FieldError::Invalid => f.write_str("invalid"),
        }
    }
}

/// Field name → problem, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, error: FieldError) {
        self.0.insert(field.into(), error);
    }

    pub fn get(&self, field: &str) -> Option<FieldError> {
        self.0.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Administrator account accepted at the final step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccountInput {
    pub username: String,
    pub name: String,
    pub password: String,
    pub email: String,
}

/// Required database fields for the selected backend; `type` always is.
pub fn database_required_fields(backend: Option<Backend>) -> Vec<&'static str> {
    let mut fields = vec!["type"];
    match backend {
        Some(b) if b.is_file_based() => fields.extend(FILE_FIELDS),
        Some(_) => fields.extend(SERVER_FIELDS),
        None => {}
    }
    fields
}

/// Check the database form and build the connection parameters from it.
/// Relative SQLite paths are resolved against the install base path.
pub fn database_config(
    form: &DatabaseForm,
    install: &InstallConfig,
) -> Result<ConnectionConfig, FieldErrors> {
    let kind = form.kind.trim();
    let backend = Backend::parse(kind);

    let mut errors = missing_fields(&database_required_fields(backend), |f| form.field(f));
    if backend.is_none() && !kind.is_empty() {
        errors.insert("type", FieldError::Invalid);
    }
    let Some(backend) = backend.filter(|_| errors.is_empty()) else {
        return Err(errors);
    };

    let backend = match backend {
        Backend::Sqlite => BackendConfig::Sqlite {
            path: sqlite_path(&form.path, install),
        },
        Backend::Mysql => BackendConfig::Mysql(server_config(form)),
        Backend::Postgresql => BackendConfig::Postgresql(server_config(form)),
    };

    Ok(ConnectionConfig {
        driver: Driver::Sqlx,
        backend,
        prefix: form.prefix.clone(),
    })
}

/// Presence check of the admin fields. The username may not collide with the
/// seeded anonymous account, compared case-insensitively.
pub fn admin_account(form: &AdminForm) -> Result<AdminAccountInput, FieldErrors> {
    let mut errors = missing_fields(&ADMIN_FIELDS, |f| form.field(f));
    if form.username.trim().eq_ignore_ascii_case(ANONYMOUS_USERNAME) {
        errors.insert("username", FieldError::Invalid);
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(AdminAccountInput {
        username: form.username.clone(),
        name: form.name.clone(),
        password: form.password.clone(),
        email: form.email.clone(),
    })
}

fn missing_fields<'a>(fields: &[&str], value: impl Fn(&str) -> &'a str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in fields {
        if value(field).trim().is_empty() {
            errors.insert(*field, FieldError::Missing);
        }
    }
    errors
}

fn server_config(form: &DatabaseForm) -> ServerConfig {
    ServerConfig {
        host: form.host.trim().to_string(),
        username: form.username.clone(),
        password: form.password.clone(),
        database: form.database.trim().to_string(),
    }
}

fn sqlite_path(raw: &str, install: &InstallConfig) -> PathBuf {
    install.resolve(raw.trim())
}
