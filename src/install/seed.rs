use chrono::Utc;
use sqlx::AnyConnection;
use tracing::info;

use crate::config::DB_VERSION;
use crate::db::Backend;
use crate::db::storage::int_column;
use crate::error::TrackletError;
use crate::install::validate::AdminAccountInput;
use crate::service::helpers::random_hash;
use crate::service::password;

pub const ADMIN_GROUP_ID: i64 = 1;
pub const ANONYMOUS_GROUP_ID: i64 = 3;
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

const INSERT_USER: &str = r#"INSERT INTO {prefix}users
    (username, password, salt, name, email, group_id, locale, options, login_hash, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#;
const SELECT_USER_ID: &str = "SELECT id FROM {prefix}users WHERE username = ?";
const INSERT_SETTING: &str = "INSERT INTO {prefix}settings (setting, value) VALUES (?, ?)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub admin_id: i64,
    pub anonymous_id: i64,
}

/// Writes the baseline rows, in order: admin user, anonymous user, then the
/// `anonymous_user_id`, `notification_from_email` and `db_version` settings.
/// `host` is the request's host name.
pub async fn write(
    conn: &mut AnyConnection,
    backend: Backend,
    prefix: &str,
    admin: &AdminAccountInput,
    host: &str,
) -> Result<SeedSummary, TrackletError> {
    let seeder = Seeder { backend, prefix };

    let admin_id = seeder
        .insert_user(
            conn,
            NewUser {
                username: &admin.username,
                password: &admin.password,
                name: &admin.name,
                email: admin.email.clone(),
                group_id: ADMIN_GROUP_ID,
                locale: None,
                options: None,
                login_hash: random_hash(),
            },
        )
        .await?;

    let anonymous_password = random_hash();
    let anonymous_id = seeder
        .insert_user(
            conn,
            NewUser {
                username: ANONYMOUS_USERNAME,
                password: &anonymous_password,
                name: ANONYMOUS_USERNAME,
                email: format!("anonymous.{}@{host}", &random_hash()[..8]),
                group_id: ANONYMOUS_GROUP_ID,
                locale: Some("enUS"),
                options: Some(r#"{"watch_created_tickets":null}"#),
                login_hash: random_hash(),
            },
        )
        .await?;

    seeder
        .insert_setting(conn, "anonymous_user_id", &anonymous_id.to_string())
        .await?;
    seeder
        .insert_setting(conn, "notification_from_email", &format!("noreply@{host}"))
        .await?;
    seeder
        .insert_setting(conn, "db_version", &DB_VERSION.to_string())
        .await?;

    info!(admin_id, anonymous_id, "seed records written");
    Ok(SeedSummary {
        admin_id,
        anonymous_id,
    })
}

struct NewUser<'a> {
    username: &'a str,
    password: &'a str,
    name: &'a str,
    email: String,
    group_id: i64,
    locale: Option<&'a str>,
    options: Option<&'a str>,
    login_hash: String,
}

struct Seeder<'a> {
    backend: Backend,
    prefix: &'a str,
}

impl Seeder<'_> {
    async fn insert_user(
        &self,
        conn: &mut AnyConnection,
        user: NewUser<'_>,
    ) -> Result<i64, TrackletError> {
        let salt = random_hash();
        let hashed = password::hash(user.password, &salt);

        let sql = self.backend.render_query(self.prefix, INSERT_USER);
        sqlx::query(&sql)
            .bind(user.username.to_string())
            .bind(hashed)
            .bind(salt)
            .bind(user.name.to_string())
            .bind(user.email)
            .bind(user.group_id)
            .bind(user.locale.map(str::to_string))
            .bind(user.options.map(str::to_string))
            .bind(user.login_hash)
            .bind(Utc::now().timestamp())
            .execute(&mut *conn)
            .await
            .map_err(|e| TrackletError::schema(sql.clone(), e))?;

        let sql = self.backend.render_query(self.prefix, SELECT_USER_ID);
        let row = sqlx::query(&sql)
            .bind(user.username.to_string())
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| TrackletError::schema(sql.clone(), e))?;
        int_column(&row, "id")
    }

    async fn insert_setting(
        &self,
        conn: &mut AnyConnection,
        setting: &str,
        value: &str,
    ) -> Result<(), TrackletError> {
        let sql = self.backend.render_query(self.prefix, INSERT_SETTING);
        sqlx::query(&sql)
            .bind(setting.to_string())
            .bind(value.to_string())
            .execute(&mut *conn)
            .await
            .map_err(|e| TrackletError::schema(sql.clone(), e))?;
        Ok(())
    }
}
