use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use axum_extra::{TypedHeader, extract::cookie::PrivateCookieJar};
use headers::Host;
use tracing::{info, warn};

use crate::error::TrackletError;
use crate::install::{self, session::InstallationSession, validate};
use crate::install::validate::FieldErrors;
use crate::middleware::install_guard::RequireFreshInstall;
use crate::router::InstallState;
use crate::types::forms::{AdminForm, DatabaseForm};
use crate::views;

/// GET / -> license agreement.
pub async fn license(_guard: RequireFreshInstall) -> Html<String> {
    views::install::license()
}

/// POST /step/1 -> empty database details form.
pub async fn database_step(_guard: RequireFreshInstall) -> Html<String> {
    views::install::database_config(&DatabaseForm::default(), &FieldErrors::new())
}

/// POST /step/2 -> validates the database details and remembers them for
/// the final step.
pub async fn admin_step(
    _guard: RequireFreshInstall,
    State(state): State<InstallState>,
    jar: PrivateCookieJar,
    Form(form): Form<DatabaseForm>,
) -> Result<Response, TrackletError> {
    let db = match validate::database_config(&form, &state.config.install) {
        Ok(db) => db,
        Err(errors) => {
            info!(fields = errors.len(), "database details incomplete");
            return Ok(views::install::database_config(&form, &errors).into_response());
        }
    };

    if state.config.install.check_existing_install && install::installed_with_prefix(&db).await {
        warn!(prefix = %db.prefix, "target database already holds an install");
        return Err(TrackletError::InstalledWithPrefix(db.prefix));
    }

    let jar = InstallationSession::new(db).store(jar, state.secure_cookie())?;
    let page = views::install::admin_account(&AdminForm::default(), &FieldErrors::new());
    Ok((jar, page).into_response())
}

/// POST /step/3 -> creates the schema, seeds the accounts and writes the
/// installation artifact.
pub async fn finalize_step(
    _guard: RequireFreshInstall,
    State(state): State<InstallState>,
    jar: PrivateCookieJar,
    host: Option<TypedHeader<Host>>,
    Form(form): Form<AdminForm>,
) -> Result<Response, TrackletError> {
    let session = InstallationSession::load(&jar).ok_or(TrackletError::MissingInstallSession)?;

    let admin = match validate::admin_account(&form) {
        Ok(admin) => admin,
        Err(errors) => {
            info!(fields = errors.len(), "admin account incomplete");
            return Ok(views::install::admin_account(&form, &errors).into_response());
        }
    };

    let host = host
        .map(|TypedHeader(h)| h.hostname().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string());

    let completion = install::finalize(
        &state.config.install,
        state.config.database.max_connections,
        &session.db,
        &admin,
        &host,
    )
    .await?;
    info!(
        admin_id = completion.seed.admin_id,
        written = completion.written,
        "installation finished"
    );

    let jar = InstallationSession::clear(jar);
    Ok((jar, views::install::done(&completion)).into_response())
}
