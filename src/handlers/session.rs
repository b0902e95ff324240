use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::{info, warn};

use crate::error::TrackletError;
use crate::install::seed::ANONYMOUS_GROUP_ID;
use crate::middleware::auth::{CurrentUser, clear_session_cookie, session_cookie};
use crate::router::TrackletState;
use crate::service::{locale, password};
use crate::types::forms::LoginForm;
use crate::views;

/// GET /
pub async fn home(
    State(state): State<TrackletState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, TrackletError> {
    let storage = state.storage()?;
    let locale = locale::active(&state.settings, &storage).await;
    let anonymous = user.group_id == ANONYMOUS_GROUP_ID;
    Ok(views::session::home(locale, &user, anonymous))
}

/// GET /login
pub async fn login_form(State(state): State<TrackletState>) -> Result<Html<String>, TrackletError> {
    let storage = state.storage()?;
    let locale = locale::active(&state.settings, &storage).await;
    Ok(views::session::login(locale, "", false))
}

/// POST /login -> sets the session cookie to the user's login hash.
pub async fn login(
    State(state): State<TrackletState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, TrackletError> {
    let storage = state.storage()?;
    let user = storage
        .user_by_username(form.username.trim())
        .await?
        .filter(|u| password::verify(&form.password, &u.salt, &u.password));

    let Some(user) = user else {
        warn!(username = %form.username, "login rejected");
        let locale = locale::active(&state.settings, &storage).await;
        return Ok(views::session::login(locale, &form.username, true).into_response());
    };

    info!(user_id = user.id, "user logged in");
    let jar = jar.add(session_cookie(user.login_hash, state.secure_cookie()));
    Ok((jar, Redirect::to("/")).into_response())
}

/// POST /logout
pub async fn logout(jar: PrivateCookieJar) -> impl IntoResponse {
    (jar.remove(clear_session_cookie()), Redirect::to("/login"))
}
