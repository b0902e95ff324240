#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use axum_extra::extract::cookie::Key;
use tower::ServiceExt;

use tracklet::config::{Config, MAIN_CONNECTION};
use tracklet::db::{ConnectionConfig, ConnectionRegistry};
use tracklet::install::{self, validate::AdminAccountInput};
use tracklet::router::{InstallState, TrackletState, install_router, tracklet_router};
use tracklet::service::scm::ScmRegistry;
use tracklet::types::forms::DatabaseForm;

pub const ADMIN_PASSWORD: &str = "correct horse";

pub fn config_in(base: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.basic.insecure_cookie = true;
    cfg.install.base_path = base.to_path_buf();
    cfg
}

pub fn installer(cfg: Config) -> Router {
    install_router(InstallState::new(Arc::new(cfg), Key::generate()))
}

pub fn admin() -> AdminAccountInput {
    AdminAccountInput {
        username: "admin".to_string(),
        name: "Site Admin".to_string(),
        password: ADMIN_PASSWORD.to_string(),
        email: "admin@example.com".to_string(),
    }
}

pub fn sqlite_connection(cfg: &Config, file: &str) -> ConnectionConfig {
    let form = DatabaseForm {
        kind: "sqlite".to_string(),
        path: file.to_string(),
        prefix: "tracklet_".to_string(),
        ..DatabaseForm::default()
    };
    install::validate::database_config(&form, &cfg.install).expect("valid sqlite form")
}

/// Installs a fresh SQLite database under `base` and returns the app router
/// together with the connection used by it.
pub async fn installed_app(base: &Path) -> (Router, ConnectionConfig) {
    std::fs::create_dir_all(base.join("config")).expect("create config dir");
    let cfg = config_in(base);
    let db = sqlite_connection(&cfg, "app.db");
    install::finalize(&cfg.install, 1, &db, &admin(), "tracker.example")
        .await
        .expect("install");

    let mut registry = ConnectionRegistry::new(1);
    registry.open(&db, MAIN_CONNECTION).await.expect("open main");
    let state = TrackletState::new(Arc::new(cfg), registry, ScmRegistry::default(), Key::generate())
        .expect("state");
    (tracklet_router(state), db)
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(req.body(Body::empty()).expect("failed to build request"))
        .await
        .expect("request failed")
}

pub async fn post_form(
    app: &Router,
    uri: &str,
    form: &str,
    cookie: Option<&str>,
) -> Response<Body> {
    match cookie {
        Some(cookie) => post_form_with(app, uri, form, &[(header::COOKIE, cookie)]).await,
        None => post_form_with(app, uri, form, &[]).await,
    }
}

pub async fn post_form_with(
    app: &Router,
    uri: &str,
    form: &str,
    headers: &[(header::HeaderName, &str)],
) -> Response<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    for (name, value) in headers {
        req = req.header(name.clone(), *value);
    }
    app.clone()
        .oneshot(req.body(Body::from(form.to_string())).expect("failed to build request"))
        .await
        .expect("request failed")
}

pub async fn body_string(resp: Response<Body>) -> String {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(body.to_vec()).expect("response body was not utf-8")
}

/// `name=value` pair of the named Set-Cookie header, ready to send back.
pub fn cookie_pair(resp: &Response<Body>, name: &str) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{name}=")))
        .map(str::to_string)
}
