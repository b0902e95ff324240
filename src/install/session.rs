use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::warn;

use crate::db::ConnectionConfig;

pub const INSTALL_COOKIE: &str = "tracklet_install";

/// State carried from step 2 to step 3 in an encrypted cookie. Created once
/// the database details validate, consumed by a successful finalize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationSession {
    pub db: ConnectionConfig,
}

impl InstallationSession {
    pub fn new(db: ConnectionConfig) -> Self {
        Self { db }
    }

    pub fn store(&self, jar: PrivateCookieJar, secure: bool) -> Result<PrivateCookieJar, serde_json::Error> {
        let value = serde_json::to_string(self)?;
        Ok(jar.add(build_cookie(value, secure)))
    }

    /// Read the session back; a missing or undecodable cookie yields `None`.
    pub fn load(jar: &PrivateCookieJar) -> Option<Self> {
        let cookie = jar.get(INSTALL_COOKIE)?;
        serde_json::from_str(cookie.value())
            .inspect_err(|e| warn!(error = %e, "discarding unreadable install session"))
            .ok()
    }

    pub fn clear(jar: PrivateCookieJar) -> PrivateCookieJar {
        jar.remove(
            Cookie::build(Cookie::new(INSTALL_COOKIE, ""))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build(),
        )
    }
}

fn build_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(INSTALL_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(1))
        .build()
}
