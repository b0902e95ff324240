//! Form bodies posted by the server-rendered pages.

use serde::{Deserialize, Serialize};

/// Database details (installer step 1 → 2).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseForm {
    #[serde(rename = "type")]
    pub kind: String,
    pub host: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub path: String,
    pub prefix: String,
}

impl DatabaseForm {
    pub fn field(&self, name: &str) -> &str {
        match name {
            "type" => &self.kind,
            "host" => &self.host,
            "username" => &self.username,
            "password" => &self.password,
            "database" => &self.database,
            "path" => &self.path,
            "prefix" => &self.prefix,
            _ => "",
        }
    }
}

/// Administrator account (installer step 2 → 3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminForm {
    pub username: String,
    pub name: String,
    pub password: String,
    pub email: String,
}

impl AdminForm {
    pub fn field(&self, name: &str) -> &str {
        match name {
            "username" => &self.username,
            "name" => &self.name,
            "password" => &self.password,
            "email" => &self.email,
            _ => "",
        }
    }
}

/// Repository settings form. Absent fields keep the record's current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RepositoryForm {
    pub slug: Option<String>,
    #[serde(rename = "type")]
    pub scm: Option<String>,
    pub location: Option<String>,
    pub is_default: Option<String>,
    pub serve: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// HTML checkboxes post `1`/`on` when ticked and nothing otherwise.
pub fn checkbox(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("1" | "on" | "true" | "yes"))
}

/// One `<option>` of a select box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}
