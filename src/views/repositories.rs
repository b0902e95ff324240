use axum::response::Html;
use std::collections::BTreeMap;

use super::{checkbox, escape, layout, select, text_input};
use crate::db::models::{Project, Repository};
use crate::service::locale::Locale;
use crate::types::forms::SelectOption;

pub fn index(locale: &Locale, project: &Project, repos: &[Repository]) -> Html<String> {
    let base = settings_href(project);
    let mut body = format!(
        "<p><a href=\"{base}/new\">{}</a></p>\n",
        escape(&locale.translate("new_repository", &[]))
    );
    if repos.is_empty() {
        body.push_str(&format!(
            "<p>{}</p>",
            escape(&locale.translate("no_repositories", &[&project.name]))
        ));
        return layout(&locale.translate("repositories", &[]), &body);
    }

    body.push_str(&format!(
        "<table>\n<tr><th>{}</th><th>{}</th><th>{}</th><th>{}</th><th></th></tr>\n",
        escape(&locale.translate("slug", &[])),
        escape(&locale.translate("type", &[])),
        escape(&locale.translate("location", &[])),
        escape(&locale.translate("default", &[])),
    ));
    for repo in repos {
        let default = if repo.is_default { "yes" } else { "no" };
        body.push_str(&format!(
            "<tr data-repository=\"{id}\"><td>{slug}</td><td>{scm}</td><td>{location}</td><td>{default}</td><td><a href=\"{base}/{id}/edit\">{edit}</a> <a href=\"{base}/{id}/delete\">{delete}</a></td></tr>\n",
            id = repo.id,
            slug = escape(&repo.slug),
            scm = escape(&repo.scm),
            location = escape(&repo.location),
            default = escape(&locale.translate(default, &[])),
            edit = escape(&locale.translate("edit", &[])),
            delete = escape(&locale.translate("delete", &[])),
        ));
    }
    body.push_str("</table>");
    layout(&locale.translate("repositories", &[]), &body)
}

pub fn form(
    locale: &Locale,
    project: &Project,
    repo: &Repository,
    scm_options: &[SelectOption],
    errors: &BTreeMap<&'static str, String>,
) -> Html<String> {
    let (title, action, submit) = if repo.is_new() {
        (
            locale.translate("new_repository", &[]),
            format!("{}/new", settings_href(project)),
            locale.translate("create", &[]),
        )
    } else {
        (
            locale.translate("edit", &[]),
            format!("{}/{}/edit", settings_href(project), repo.id),
            locale.translate("save", &[]),
        )
    };

    let mut body = String::new();
    if !errors.is_empty() {
        body.push_str("<ul class=\"errors\">");
        for (field, message) in errors {
            body.push_str(&format!(
                "<li data-field=\"{field}\">{}</li>",
                escape(message)
            ));
        }
        body.push_str("</ul>\n");
    }
    body.push_str(&format!("<form method=\"post\" action=\"{action}\">\n"));
    body.push_str(&text_input(
        "slug",
        &locale.translate("slug", &[]),
        &repo.slug,
        errors.contains_key("slug"),
    ));
    body.push_str(&select(
        "type",
        &locale.translate("type", &[]),
        scm_options,
        &repo.scm,
        errors.contains_key("type"),
    ));
    body.push_str(&text_input(
        "location",
        &locale.translate("location", &[]),
        &repo.location,
        errors.contains_key("location"),
    ));
    body.push_str(&checkbox(
        "is_default",
        &locale.translate("default", &[]),
        repo.is_default,
    ));
    body.push_str(&checkbox("serve", &locale.translate("serve", &[]), repo.serve));
    body.push_str(&format!(
        "<button type=\"submit\">{}</button>\n</form>",
        escape(&submit)
    ));

    layout(&title, &body)
}

pub fn settings_href(project: &Project) -> String {
    format!("/{}/settings/repositories", project.slug)
}
