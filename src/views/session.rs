use axum::response::Html;

use super::{escape, layout, password_input, text_input};
use crate::db::models::User;
use crate::service::locale::Locale;

pub fn login(locale: &Locale, username: &str, failed: bool) -> Html<String> {
    let mut body = String::new();
    if failed {
        body.push_str(&format!(
            "<p class=\"error\">{}</p>\n",
            escape(&locale.translate("errors.invalid_login", &[]))
        ));
    }
    body.push_str("<form method=\"post\" action=\"/login\">\n");
    body.push_str(&text_input(
        "username",
        &locale.translate("username", &[]),
        username,
        failed,
    ));
    body.push_str(&password_input(
        "password",
        &locale.translate("password", &[]),
        failed,
    ));
    body.push_str(&format!(
        "<button type=\"submit\">{}</button>\n</form>",
        escape(&locale.translate("login", &[]))
    ));
    layout(&locale.translate("login", &[]), &body)
}

pub fn home(locale: &Locale, user: &User, anonymous: bool) -> Html<String> {
    let body = if anonymous {
        format!(
            "<p><a href=\"/login\">{}</a></p>",
            escape(&locale.translate("login", &[]))
        )
    } else {
        format!(
            "<p>{}</p>\n<p class=\"since\">{}</p>\n<form method=\"post\" action=\"/logout\"><button type=\"submit\">{}</button></form>",
            escape(&locale.translate("logged_in_as", &[&user.name])),
            escape(&locale.translate("member_since", &[&locale.date(user.created_at, None)])),
            escape(&locale.translate("logout", &[]))
        )
    };
    layout("Tracklet", &body)
}
