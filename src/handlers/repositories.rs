use axum::{
    Form, Json,
    extract::{Path, State},
    http::{HeaderMap, header::ACCEPT},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::json;
use tracing::info;

use crate::db::Storage;
use crate::db::models::{Project, Repository};
use crate::error::TrackletError;
use crate::middleware::auth::CurrentUser;
use crate::router::TrackletState;
use crate::service::locale::{self, Locale};
use crate::service::permissions::{self, SCM_MANAGE_REPOSITORIES};
use crate::service::repositories::{self as repos, RepositoryErrors, SaveOutcome};
use crate::types::forms::RepositoryForm;
use crate::views;

/// Everything a repository settings page needs once access is granted.
struct Settings {
    storage: Storage,
    project: Project,
    locale: &'static Locale,
}

impl Settings {
    async fn load(
        state: &TrackletState,
        user: &CurrentUser,
        slug: &str,
    ) -> Result<Self, TrackletError> {
        let storage = state.storage()?;
        let project = storage
            .project_by_slug(slug)
            .await?
            .ok_or(TrackletError::NotFound)?;
        if !permissions::user_can(&storage, &user.0, project.id, SCM_MANAGE_REPOSITORIES).await? {
            return Err(TrackletError::NoPermission);
        }
        let locale = locale::active(&state.settings, &storage).await;
        Ok(Self {
            storage,
            project,
            locale,
        })
    }

    /// A repository of this project; ones belonging elsewhere are refused.
    async fn repository(&self, id: i64) -> Result<Repository, TrackletError> {
        let repo = self
            .storage
            .repository(id)
            .await?
            .ok_or(TrackletError::NotFound)?;
        if repo.project_id != self.project.id {
            return Err(TrackletError::NoPermission);
        }
        Ok(repo)
    }

    fn form(&self, state: &TrackletState, repo: &Repository, errors: &RepositoryErrors) -> Html<String> {
        views::repositories::form(
            self.locale,
            &self.project,
            repo,
            &state.scm.scm_select_options(),
            errors,
        )
    }
}

/// GET /{project}/settings/repositories
pub async fn index(
    State(state): State<TrackletState>,
    user: CurrentUser,
    Path(project): Path<String>,
) -> Result<Html<String>, TrackletError> {
    let ctx = Settings::load(&state, &user, &project).await?;
    let repos = ctx.storage.repositories_for(ctx.project.id).await?;
    Ok(views::repositories::index(ctx.locale, &ctx.project, &repos))
}

/// GET /{project}/settings/repositories/new
pub async fn new_form(
    State(state): State<TrackletState>,
    user: CurrentUser,
    Path(project): Path<String>,
) -> Result<Html<String>, TrackletError> {
    let ctx = Settings::load(&state, &user, &project).await?;
    let repo = Repository::new_for(ctx.project.id, default_scm(&state));
    Ok(ctx.form(&state, &repo, &RepositoryErrors::new()))
}

/// POST /{project}/settings/repositories/new
pub async fn create(
    State(state): State<TrackletState>,
    user: CurrentUser,
    Path(project): Path<String>,
    Form(form): Form<RepositoryForm>,
) -> Result<Response, TrackletError> {
    let ctx = Settings::load(&state, &user, &project).await?;
    let mut repo = Repository::new_for(ctx.project.id, default_scm(&state));
    repos::apply_form(&mut repo, &form, ctx.project.id);
    save(&state, &ctx, repo).await
}

/// GET /{project}/settings/repositories/{id}/edit
pub async fn edit_form(
    State(state): State<TrackletState>,
    user: CurrentUser,
    Path((project, id)): Path<(String, i64)>,
) -> Result<Html<String>, TrackletError> {
    let ctx = Settings::load(&state, &user, &project).await?;
    let repo = ctx.repository(id).await?;
    Ok(ctx.form(&state, &repo, &RepositoryErrors::new()))
}

/// POST /{project}/settings/repositories/{id}/edit
pub async fn update(
    State(state): State<TrackletState>,
    user: CurrentUser,
    Path((project, id)): Path<(String, i64)>,
    Form(form): Form<RepositoryForm>,
) -> Result<Response, TrackletError> {
    let ctx = Settings::load(&state, &user, &project).await?;
    let mut repo = ctx.repository(id).await?;
    repos::apply_form(&mut repo, &form, ctx.project.id);
    save(&state, &ctx, repo).await
}

/// GET|POST /{project}/settings/repositories/{id}/delete -> JSON status for
/// clients asking for it, a redirect to the listing otherwise.
pub async fn delete(
    State(state): State<TrackletState>,
    user: CurrentUser,
    Path((project, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Result<Response, TrackletError> {
    let ctx = Settings::load(&state, &user, &project).await?;
    let repo = ctx.repository(id).await?;
    ctx.storage.delete_repository(repo.id).await?;
    info!(project = %ctx.project.slug, repository = %repo.slug, "repository deleted");

    if wants_json(&headers) {
        return Ok(Json(json!({ "status": 1 })).into_response());
    }
    Ok(Redirect::to(&views::repositories::settings_href(&ctx.project)).into_response())
}

async fn save(
    state: &TrackletState,
    ctx: &Settings,
    mut repo: Repository,
) -> Result<Response, TrackletError> {
    match repos::save(&ctx.storage, &state.scm, ctx.locale, &mut repo).await? {
        SaveOutcome::Saved(id) => {
            info!(project = %ctx.project.slug, repository = id, "repository saved");
            Ok(Redirect::to(&views::repositories::settings_href(&ctx.project)).into_response())
        }
        SaveOutcome::Invalid(errors) => Ok(ctx.form(state, &repo, &errors).into_response()),
    }
}

/// First registered adapter, `git` with the built-in set.
fn default_scm(state: &TrackletState) -> &'static str {
    state.scm.scm_types().into_keys().next().unwrap_or_default()
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}
