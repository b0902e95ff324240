use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::warn;

use crate::config::{BasicConfig, Config, MAIN_CONNECTION};
use crate::db::{ConnectionRegistry, Storage};
use crate::error::TrackletError;
use crate::handlers::{install, repositories, session};
use crate::service::scm::ScmRegistry;
use crate::service::settings::SettingsCache;

/// State of the installer, served while no installation artifact exists.
#[derive(Clone)]
pub struct InstallState {
    pub config: Arc<Config>,
    pub key: Key,
}

impl InstallState {
    pub fn new(config: Arc<Config>, key: Key) -> Self {
        Self { config, key }
    }

    pub fn secure_cookie(&self) -> bool {
        !self.config.basic.insecure_cookie
    }
}

impl FromRef<InstallState> for Key {
    fn from_ref(state: &InstallState) -> Self {
        state.key.clone()
    }
}

/// State of the installed application. The registry is built at startup and
/// must already hold the main connection.
#[derive(Clone)]
pub struct TrackletState {
    pub config: Arc<Config>,
    pub registry: Arc<ConnectionRegistry>,
    pub settings: Arc<SettingsCache>,
    pub scm: Arc<ScmRegistry>,
    pub key: Key,
}

impl TrackletState {
    pub fn new(
        config: Arc<Config>,
        registry: ConnectionRegistry,
        scm: ScmRegistry,
        key: Key,
    ) -> Result<Self, TrackletError> {
        registry.require(MAIN_CONNECTION)?;
        Ok(Self {
            config,
            registry: Arc::new(registry),
            settings: Arc::new(SettingsCache::new()),
            scm: Arc::new(scm),
            key,
        })
    }

    pub fn storage(&self) -> Result<Storage, TrackletError> {
        Ok(self.registry.require(MAIN_CONNECTION)?.storage())
    }

    pub fn secure_cookie(&self) -> bool {
        !self.config.basic.insecure_cookie
    }
}

impl FromRef<TrackletState> for Key {
    fn from_ref(state: &TrackletState) -> Self {
        state.key.clone()
    }
}

/// Private cookie key from `basic.cookie_secret`, or a per-process random one.
pub fn cookie_key(basic: &BasicConfig) -> Key {
    let Some(secret) = basic.cookie_secret.as_deref() else {
        return Key::generate();
    };
    match STANDARD.decode(secret.trim()) {
        Ok(bytes) => match Key::try_from(bytes.as_slice()) {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "cookie_secret too short, using a random key");
                Key::generate()
            }
        },
        Err(e) => {
            warn!(error = %e, "cookie_secret is not valid base64, using a random key");
            Key::generate()
        }
    }
}

pub fn install_router(state: InstallState) -> Router {
    Router::new()
        .route("/", get(install::license))
        .route("/step/1", post(install::database_step))
        .route("/step/2", post(install::admin_step))
        .route("/step/3", post(install::finalize_step))
        .with_state(state)
}

pub fn tracklet_router(state: TrackletState) -> Router {
    Router::new()
        .route("/", get(session::home))
        .route("/login", get(session::login_form).post(session::login))
        .route("/logout", post(session::logout))
        .route("/{project}/settings/repositories", get(repositories::index))
        .route(
            "/{project}/settings/repositories/new",
            get(repositories::new_form).post(repositories::create),
        )
        .route(
            "/{project}/settings/repositories/{id}/edit",
            get(repositories::edit_form).post(repositories::update),
        )
        .route(
            "/{project}/settings/repositories/{id}/delete",
            get(repositories::delete).post(repositories::delete),
        )
        .with_state(state)
}
