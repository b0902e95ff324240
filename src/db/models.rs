use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub salt: String,
    pub name: String,
    pub email: String,
    pub group_id: i64,
    pub locale: Option<String>,
    pub options: Option<String>,
    #[serde(skip_serializing)]
    pub login_hash: String,
    /// Unix seconds.
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserGroup {
    pub id: i64,
    pub name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Source repository attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    /// `0` until the record has been saved.
    pub id: i64,
    pub project_id: i64,
    pub slug: String,
    #[serde(rename = "type")]
    pub scm: String,
    pub location: String,
    pub is_default: bool,
    pub serve: bool,
    pub extra: Option<String>,
}

impl Repository {
    pub fn new_for(project_id: i64, scm: impl Into<String>) -> Self {
        Self {
            id: 0,
            project_id,
            slug: String::new(),
            scm: scm.into(),
            location: String::new(),
            is_default: false,
            serve: false,
            extra: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }
}

/// A matching row of the permissions table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionRow {
    pub project_id: i64,
    pub type_id: i64,
    pub value: bool,
}
