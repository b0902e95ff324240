use std::collections::BTreeMap;

use crate::db::Storage;
use crate::db::models::Repository;
use crate::error::TrackletError;
use crate::service::locale::Locale;
use crate::service::scm::ScmRegistry;
use crate::types::forms::{RepositoryForm, checkbox};

pub type RepositoryErrors = BTreeMap<&'static str, String>;

#[derive(Debug)]
pub enum SaveOutcome {
    Saved(i64),
    Invalid(RepositoryErrors),
}

/// Copy submitted fields onto the record. Fields that were not posted keep
/// their current value, except `is_default` which is a checkbox.
pub fn apply_form(repo: &mut Repository, form: &RepositoryForm, project_id: i64) {
    if let Some(slug) = &form.slug {
        repo.slug = slug.trim().to_string();
    }
    if let Some(scm) = &form.scm {
        repo.scm = scm.trim().to_string();
    }
    if let Some(location) = &form.location {
        repo.location = location.clone();
    }
    repo.is_default = checkbox(form.is_default.as_deref());
    if let Some(serve) = &form.serve {
        repo.serve = checkbox(Some(serve));
    }
    repo.project_id = project_id;
}

/// Run the adapter's before-save hook, validate, and save when clean.
pub async fn save(
    storage: &Storage,
    scm: &ScmRegistry,
    locale: &Locale,
    repo: &mut Repository,
) -> Result<SaveOutcome, TrackletError> {
    if let Some(adapter) = scm.get(&repo.scm) {
        adapter.before_save(repo);
    }

    let mut errors = validate_fields(repo, scm, locale);
    if !errors.contains_key("slug")
        && storage
            .slug_taken(repo.project_id, &repo.slug, repo.id)
            .await?
    {
        errors.insert("slug", locale.translate("errors.slug_taken", &[]));
    }
    if !errors.is_empty() {
        return Ok(SaveOutcome::Invalid(errors));
    }

    let id = storage.save_repository(repo).await?;
    repo.id = id;
    Ok(SaveOutcome::Saved(id))
}

fn validate_fields(repo: &Repository, scm: &ScmRegistry, locale: &Locale) -> RepositoryErrors {
    let mut errors = RepositoryErrors::new();
    if repo.slug.is_empty() {
        errors.insert("slug", locale.translate("errors.slug_blank", &[]));
    } else if !repo
        .slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        errors.insert("slug", locale.translate("errors.slug_invalid", &[]));
    }
    if repo.location.trim().is_empty() {
        errors.insert("location", locale.translate("errors.location_blank", &[]));
    }
    if scm.get(&repo.scm).is_none() {
        errors.insert("type", locale.translate("errors.type_invalid", &[&repo.scm]));
    }
    errors
}
