use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use time::Duration;
use tracing::debug;

use crate::db::models::User;
use crate::error::TrackletError;
use crate::install::seed::{ANONYMOUS_GROUP_ID, ANONYMOUS_USERNAME};
use crate::router::TrackletState;

pub const SESSION_COOKIE: &str = "tracklet_session";

/// The user behind the request: the logged in user when the session cookie
/// matches a login hash, the anonymous user otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<TrackletState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &TrackletState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await
            .map(CurrentUser)
            .map_err(IntoResponse::into_response)
    }
}

async fn resolve(parts: &Parts, state: &TrackletState) -> Result<User, TrackletError> {
    let storage = state.storage()?;
    let jar = PrivateCookieJar::from_headers(&parts.headers, state.key.clone());

    if let Some(hash) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned())
        && let Some(user) = storage.user_by_login_hash(&hash).await?
    {
        debug!(user_id = user.id, "request authenticated by session cookie");
        return Ok(user);
    }

    let anonymous_id = state
        .settings
        .get(&storage, "anonymous_user_id")
        .await?
        .and_then(|v| v.parse::<i64>().ok());
    if let Some(id) = anonymous_id
        && let Some(user) = storage.user_by_id(id).await?
    {
        return Ok(user);
    }
    Ok(guest())
}

/// Stand-in used when the anonymous user row is missing.
fn guest() -> User {
    User {
        id: 0,
        username: ANONYMOUS_USERNAME.to_string(),
        password: String::new(),
        salt: String::new(),
        name: ANONYMOUS_USERNAME.to_string(),
        email: String::new(),
        group_id: ANONYMOUS_GROUP_ID,
        locale: None,
        options: None,
        login_hash: String::new(),
        created_at: 0,
    }
}

pub fn session_cookie(login_hash: String, secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, login_hash))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(30))
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
