use sqlx::Row;
use sqlx::any::AnyRow;

use crate::db::models::{PermissionRow, Project, Repository, User, UserGroup};
use crate::db::registry::NamedConnection;
use crate::error::TrackletError;

const USER_COLUMNS: &str =
    "id, username, password, salt, name, email, group_id, locale, options, login_hash, created_at";
const REPOSITORY_COLUMNS: &str = "id, project_id, slug, type, location, is_default, serve, extra";

/// Row level access to the installed tracker tables.
#[derive(Clone)]
pub struct Storage {
    conn: NamedConnection,
}

impl Storage {
    pub fn new(conn: NamedConnection) -> Self {
        Self { conn }
    }

    pub async fn setting(&self, key: &str) -> Result<Option<String>, TrackletError> {
        let sql = self
            .conn
            .sql("SELECT value FROM {prefix}settings WHERE setting = ?");
        let row = sqlx::query(&sql)
            .bind(key.to_string())
            .fetch_optional(self.conn.pool())
            .await?;
        match row {
            Some(row) => Ok(row.try_get::<Option<String>, _>("value")?),
            None => Ok(None),
        }
    }

    pub async fn user_by_id(&self, id: i64) -> Result<Option<User>, TrackletError> {
        self.fetch_user("id = ?", UserKey::Id(id)).await
    }

    pub async fn user_by_username(&self, username: &str) -> Result<Option<User>, TrackletError> {
        self.fetch_user("username = ?", UserKey::Text(username.to_string()))
            .await
    }

    pub async fn user_by_login_hash(&self, hash: &str) -> Result<Option<User>, TrackletError> {
        self.fetch_user("login_hash = ?", UserKey::Text(hash.to_string()))
            .await
    }

    pub async fn usergroup(&self, id: i64) -> Result<Option<UserGroup>, TrackletError> {
        let sql = self
            .conn
            .sql("SELECT id, name, is_admin FROM {prefix}usergroups WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.conn.pool())
            .await?;
        row.map(|row| {
            Ok(UserGroup {
                id: int_column(&row, "id")?,
                name: row.try_get("name")?,
                is_admin: int_column(&row, "is_admin")? != 0,
            })
        })
        .transpose()
    }

    pub async fn project_by_slug(&self, slug: &str) -> Result<Option<Project>, TrackletError> {
        let sql = self
            .conn
            .sql("SELECT id, name, slug FROM {prefix}projects WHERE slug = ?");
        let row = sqlx::query(&sql)
            .bind(slug.to_string())
            .fetch_optional(self.conn.pool())
            .await?;
        row.map(|row| {
            Ok(Project {
                id: int_column(&row, "id")?,
                name: row.try_get("name")?,
                slug: row.try_get("slug")?,
            })
        })
        .transpose()
    }

    /// Usergroup permission rows for `action` that apply to the project and
    /// group, wildcards (`0`) included.
    pub async fn permission_rows(
        &self,
        project_id: i64,
        group_id: i64,
        action: &str,
    ) -> Result<Vec<PermissionRow>, TrackletError> {
        let sql = self.conn.sql(
            r#"SELECT project_id, type_id, value FROM {prefix}permissions
               WHERE type = 'usergroup' AND action = ?
                 AND project_id IN (0, ?) AND type_id IN (0, ?)"#,
        );
        let rows = sqlx::query(&sql)
            .bind(action.to_string())
            .bind(project_id)
            .bind(group_id)
            .fetch_all(self.conn.pool())
            .await?;
        rows.iter()
            .map(|row| {
                Ok(PermissionRow {
                    project_id: int_column(row, "project_id")?,
                    type_id: int_column(row, "type_id")?,
                    value: int_column(row, "value")? != 0,
                })
            })
            .collect()
    }

    pub async fn repositories_for(&self, project_id: i64) -> Result<Vec<Repository>, TrackletError> {
        let sql = self.conn.sql(&format!(
            "SELECT {REPOSITORY_COLUMNS} FROM {{prefix}}repositories WHERE project_id = ? ORDER BY id"
        ));
        let rows = sqlx::query(&sql)
            .bind(project_id)
            .fetch_all(self.conn.pool())
            .await?;
        rows.iter().map(row_to_repository).collect()
    }

    pub async fn repository(&self, id: i64) -> Result<Option<Repository>, TrackletError> {
        let sql = self.conn.sql(&format!(
            "SELECT {REPOSITORY_COLUMNS} FROM {{prefix}}repositories WHERE id = ?"
        ));
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.conn.pool())
            .await?;
        row.as_ref().map(row_to_repository).transpose()
    }

    /// Whether another repository of the project already uses `slug`.
    pub async fn slug_taken(
        &self,
        project_id: i64,
        slug: &str,
        except_id: i64,
    ) -> Result<bool, TrackletError> {
        let sql = self.conn.sql(
            "SELECT COUNT(*) AS n FROM {prefix}repositories WHERE project_id = ? AND slug = ? AND id <> ?",
        );
        let row = sqlx::query(&sql)
            .bind(project_id)
            .bind(slug.to_string())
            .bind(except_id)
            .fetch_one(self.conn.pool())
            .await?;
        Ok(int_column(&row, "n")? > 0)
    }

    /// Insert or update the repository. Returns its id. Setting `is_default`
    /// clears the flag on the project's other repositories.
    pub async fn save_repository(&self, repo: &Repository) -> Result<i64, TrackletError> {
        let mut tx = self.conn.pool().begin().await?;

        let id = if repo.is_new() {
            let sql = self.conn.sql(
                r#"INSERT INTO {prefix}repositories
                   (project_id, slug, type, location, is_default, serve, extra)
                   VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            );
            sqlx::query(&sql)
                .bind(repo.project_id)
                .bind(repo.slug.clone())
                .bind(repo.scm.clone())
                .bind(repo.location.clone())
                .bind(i32::from(repo.is_default))
                .bind(i32::from(repo.serve))
                .bind(repo.extra.clone())
                .execute(&mut *tx)
                .await?;

            let sql = self
                .conn
                .sql("SELECT id FROM {prefix}repositories WHERE project_id = ? AND slug = ?");
            let row = sqlx::query(&sql)
                .bind(repo.project_id)
                .bind(repo.slug.clone())
                .fetch_one(&mut *tx)
                .await?;
            int_column(&row, "id")?
        } else {
            let sql = self.conn.sql(
                r#"UPDATE {prefix}repositories SET
                     project_id = ?, slug = ?, type = ?, location = ?,
                     is_default = ?, serve = ?, extra = ?
                   WHERE id = ?"#,
            );
            sqlx::query(&sql)
                .bind(repo.project_id)
                .bind(repo.slug.clone())
                .bind(repo.scm.clone())
                .bind(repo.location.clone())
                .bind(i32::from(repo.is_default))
                .bind(i32::from(repo.serve))
                .bind(repo.extra.clone())
                .bind(repo.id)
                .execute(&mut *tx)
                .await?;
            repo.id
        };

        if repo.is_default {
            let sql = self.conn.sql(
                "UPDATE {prefix}repositories SET is_default = 0 WHERE project_id = ? AND id <> ?",
            );
            sqlx::query(&sql)
                .bind(repo.project_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    pub async fn delete_repository(&self, id: i64) -> Result<(), TrackletError> {
        let sql = self.conn.sql("DELETE FROM {prefix}repositories WHERE id = ?");
        sqlx::query(&sql)
            .bind(id)
            .execute(self.conn.pool())
            .await?;
        Ok(())
    }

    async fn fetch_user(&self, filter: &str, key: UserKey) -> Result<Option<User>, TrackletError> {
        let sql = self
            .conn
            .sql(&format!("SELECT {USER_COLUMNS} FROM {{prefix}}users WHERE {filter}"));
        let query = sqlx::query(&sql);
        let query = match key {
            UserKey::Id(id) => query.bind(id),
            UserKey::Text(text) => query.bind(text),
        };
        let row = query.fetch_optional(self.conn.pool()).await?;
        row.as_ref().map(row_to_user).transpose()
    }
}

enum UserKey {
    Id(i64),
    Text(String),
}

fn row_to_user(row: &AnyRow) -> Result<User, TrackletError> {
    Ok(User {
        id: int_column(row, "id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        salt: row.try_get("salt")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        group_id: int_column(row, "group_id")?,
        locale: row.try_get("locale")?,
        options: row.try_get("options")?,
        login_hash: row.try_get("login_hash")?,
        created_at: int_column(row, "created_at")?,
    })
}

fn row_to_repository(row: &AnyRow) -> Result<Repository, TrackletError> {
    Ok(Repository {
        id: int_column(row, "id")?,
        project_id: int_column(row, "project_id")?,
        slug: row.try_get("slug")?,
        scm: row.try_get("type")?,
        location: row.try_get("location")?,
        is_default: int_column(row, "is_default")? != 0,
        serve: int_column(row, "serve")? != 0,
        extra: row.try_get("extra")?,
    })
}

/// Integer columns come back as different widths depending on the backend.
pub(crate) fn int_column(row: &AnyRow, name: &str) -> Result<i64, TrackletError> {
    if let Ok(v) = row.try_get::<i64, _>(name) {
        return Ok(v);
    }
    if let Ok(v) = row.try_get::<i32, _>(name) {
        return Ok(i64::from(v));
    }
    Ok(i64::from(row.try_get::<i16, _>(name)?))
}
