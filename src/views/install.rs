use axum::response::Html;

use super::{escape, layout, password_input, select, text_input};
use crate::db::Backend;
use crate::install::Completion;
use crate::install::validate::FieldErrors;
use crate::types::forms::{AdminForm, DatabaseForm, SelectOption};

const LICENSE: &str = "Tracklet is free software: you can redistribute it and/or modify it \
under the terms of the GNU General Public License as published by the Free Software \
Foundation; version 3 only.";

pub fn license() -> Html<String> {
    layout(
        "License Agreement",
        &format!(
            "<p>{}</p>\n<form method=\"post\" action=\"/step/1\"><button type=\"submit\">Accept</button></form>",
            escape(LICENSE)
        ),
    )
}

pub fn database_config(form: &DatabaseForm, errors: &FieldErrors) -> Html<String> {
    let backends: Vec<SelectOption> = Backend::ALL
        .iter()
        .map(|b| SelectOption {
            label: b.label().to_string(),
            value: b.as_str().to_string(),
        })
        .collect();

    let mut body = error_list(errors);
    body.push_str("<form method=\"post\" action=\"/step/2\">\n");
    body.push_str(&select("type", "Database type", &backends, &form.kind, errors.contains("type")));
    body.push_str("<fieldset><legend>MySQL / PostgreSQL</legend>\n");
    body.push_str(&text_input("host", "Server", &form.host, errors.contains("host")));
    body.push_str(&text_input("username", "Username", &form.username, errors.contains("username")));
    body.push_str(&password_input("password", "Password", false));
    body.push_str(&text_input("database", "Database", &form.database, errors.contains("database")));
    body.push_str("</fieldset>\n<fieldset><legend>SQLite</legend>\n");
    body.push_str(&text_input("path", "Database file", &form.path, errors.contains("path")));
    body.push_str("</fieldset>\n");
    body.push_str(&text_input("prefix", "Table prefix", &form.prefix, false));
    body.push_str("<button type=\"submit\">Next</button>\n</form>");

    layout("Step 1 - Database Details", &body)
}

pub fn admin_account(form: &AdminForm, errors: &FieldErrors) -> Html<String> {
    let mut body = error_list(errors);
    body.push_str("<form method=\"post\" action=\"/step/3\">\n");
    body.push_str(&text_input("username", "Username", &form.username, errors.contains("username")));
    body.push_str(&text_input("name", "Name", &form.name, errors.contains("name")));
    body.push_str(&password_input("password", "Password", errors.contains("password")));
    body.push_str(&text_input("email", "Email", &form.email, errors.contains("email")));
    body.push_str("<button type=\"submit\">Install</button>\n</form>");

    layout("Step 2 - Admin Account", &body)
}

pub fn done(completion: &Completion) -> Html<String> {
    if completion.written {
        return layout(
            "Complete",
            "<p>Installation complete. Restart Tracklet to start using it.</p>",
        );
    }
    layout(
        "Config File",
        &format!(
            "<p>The database config file could not be written. Create it with the following contents, then restart Tracklet.</p>\n<pre id=\"config_code\">{}</pre>",
            escape(&completion.artifact)
        ),
    )
}

fn error_list(errors: &FieldErrors) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .fields()
        .map(|field| {
            let problem = errors.get(field).map(|e| e.to_string()).unwrap_or_default();
            format!(
                "<li data-field=\"{field}\">{field} is {problem}</li>",
                field = escape(field)
            )
        })
        .collect();
    format!("<ul class=\"errors\">{items}</ul>\n")
}
