//! Built-in translations and the helpers views use to reach them.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::db::Storage;
use crate::service::settings::SettingsCache;
use crate::types::forms::SelectOption;

pub const DEFAULT_LOCALE: &str = "enUS";

#[derive(Debug)]
pub struct LocaleInfo {
    pub name: &'static str,
    pub language_short: &'static str,
    pub locale: &'static str,
}

/// Entry of the `permissions` string table: a single action or a named
/// group of actions.
#[derive(Debug)]
pub enum PermissionString {
    Action(&'static str, &'static str),
    Group(&'static str, &'static [(&'static str, &'static str)]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionAction {
    Action(String),
    Group { name: String, actions: Vec<String> },
}

#[derive(Debug)]
pub struct Locale {
    pub code: &'static str,
    pub info: LocaleInfo,
    strings: &'static [(&'static str, &'static str)],
    permissions: &'static [PermissionString],
    date_format: &'static str,
}

impl Locale {
    /// Translate `key`, replacing `{1}`, `{2}`, ... with `args`. Unknown
    /// keys come back unchanged.
    pub fn translate(&self, key: &str, args: &[&str]) -> String {
        let Some((_, template)) = self.strings.iter().find(|(k, _)| *k == key) else {
            return key.to_string();
        };
        let mut out = (*template).to_string();
        for (i, arg) in args.iter().enumerate() {
            out = out.replace(&format!("{{{}}}", i + 1), arg);
        }
        out
    }

    /// Format a unix timestamp (UTC) with a strftime pattern, or the
    /// locale's default date format. A malformed pattern falls back to the
    /// default.
    pub fn date(&self, timestamp: i64, format: Option<&str>) -> String {
        let Some(at) = DateTime::<Utc>::from_timestamp(timestamp, 0) else {
            return timestamp.to_string();
        };
        let mut out = String::new();
        if let Some(format) = format
            && write!(out, "{}", at.format(format)).is_ok()
        {
            return out;
        }
        out.clear();
        if write!(out, "{}", at.format(self.date_format)).is_err() {
            return at.to_rfc3339();
        }
        out
    }

    /// Permission keys, with grouped permissions kept together.
    pub fn permission_actions(&self) -> Vec<PermissionAction> {
        self.permissions
            .iter()
            .map(|entry| match entry {
                PermissionString::Action(key, _) => PermissionAction::Action(key.to_string()),
                PermissionString::Group(name, actions) => PermissionAction::Group {
                    name: name.to_string(),
                    actions: actions.iter().map(|(key, _)| key.to_string()).collect(),
                },
            })
            .collect()
    }
}

/// Locale chosen by the `locale` setting.
pub async fn active(cache: &SettingsCache, storage: &Storage) -> &'static Locale {
    let code = match cache.get(storage, "locale").await {
        Ok(code) => code,
        Err(e) => {
            warn!(error = %e, "could not read locale setting");
            None
        }
    };
    load(code.as_deref())
}

/// Locale for `code`, falling back to the default.
pub fn load(code: Option<&str>) -> &'static Locale {
    code.and_then(|c| LOCALES.iter().find(|l| l.code == c))
        .unwrap_or(&LOCALES[0])
}

pub fn locale_select_options() -> Vec<SelectOption> {
    LOCALES
        .iter()
        .map(|l| SelectOption {
            label: format!(
                "{} ({}{})",
                l.info.name, l.info.language_short, l.info.locale
            ),
            value: l.code.to_string(),
        })
        .collect()
}

static LOCALES: [Locale; 1] = [EN_US];

const EN_US: Locale = Locale {
    code: "enUS",
    info: LocaleInfo {
        name: "English",
        language_short: "en",
        locale: "US",
    },
    strings: &[
        ("repositories", "Repositories"),
        ("new_repository", "New Repository"),
        ("edit", "Edit"),
        ("delete", "Delete"),
        ("slug", "Slug"),
        ("type", "Type"),
        ("location", "Location"),
        ("default", "Default"),
        ("serve", "Serve"),
        ("save", "Save"),
        ("create", "Create"),
        ("yes", "Yes"),
        ("no", "No"),
        ("no_repositories", "There are no repositories for {1}."),
        ("login", "Login"),
        ("logout", "Logout"),
        ("logged_in_as", "Logged in as {1}"),
        ("member_since", "Member since {1}"),
        ("username", "Username"),
        ("password", "Password"),
        ("errors.invalid_login", "Invalid username or password."),
        ("errors.slug_blank", "Slug cannot be blank"),
        ("errors.slug_invalid", "Slug may only contain a-z, 0-9, dashes and underscores"),
        ("errors.slug_taken", "Slug is already in use"),
        ("errors.location_blank", "Location cannot be blank"),
        ("errors.type_invalid", "Unknown repository type {1}"),
    ],
    permissions: &[
        PermissionString::Action("view", "View"),
        PermissionString::Action("project_settings", "Project Settings"),
        PermissionString::Group(
            "tickets",
            &[
                ("create_tickets", "Create"),
                ("update_tickets", "Update"),
                ("comment_on_tickets", "Comment"),
                ("delete_tickets", "Delete"),
            ],
        ),
        PermissionString::Group(
            "scm",
            &[("scm_manage_repositories", "Manage Repositories")],
        ),
    ],
    date_format: "%B %-d, %Y",
};
