//! Minimal server-rendered pages.

pub mod install;
pub mod repositories;
pub mod session;

use axum::response::Html;

use crate::types::forms::SelectOption;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title} - Tracklet</title>\n</head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    ))
}

/// Fatal stop page.
pub fn halt(title: &str, message: &str) -> Html<String> {
    layout(title, &format!("<p class=\"error\">{}</p>", escape(message)))
}

/// Fatal stop page showing a block of code, e.g. a failed SQL statement.
pub fn halt_with_code(title: &str, code: &str) -> Html<String> {
    layout(title, &format!("<pre>{}</pre>", escape(code)))
}

pub(crate) fn text_input(name: &str, label: &str, value: &str, error: bool) -> String {
    input("text", name, label, value, error)
}

pub(crate) fn password_input(name: &str, label: &str, error: bool) -> String {
    input("password", name, label, "", error)
}

fn input(kind: &str, name: &str, label: &str, value: &str, error: bool) -> String {
    let class = if error { " class=\"error\"" } else { "" };
    format!(
        "<p{class}><label for=\"{name}\">{label}</label> <input type=\"{kind}\" id=\"{name}\" name=\"{name}\" value=\"{value}\"></p>\n",
        name = escape(name),
        label = escape(label),
        value = escape(value),
    )
}

pub(crate) fn select(name: &str, label: &str, options: &[SelectOption], selected: &str, error: bool) -> String {
    let class = if error { " class=\"error\"" } else { "" };
    let options: String = options
        .iter()
        .map(|o| {
            let sel = if o.value == selected { " selected" } else { "" };
            format!(
                "<option value=\"{}\"{sel}>{}</option>",
                escape(&o.value),
                escape(&o.label)
            )
        })
        .collect();
    format!(
        "<p{class}><label for=\"{name}\">{label}</label> <select id=\"{name}\" name=\"{name}\">{options}</select></p>\n",
        name = escape(name),
        label = escape(label),
    )
}

pub(crate) fn checkbox(name: &str, label: &str, checked: bool) -> String {
    let checked = if checked { " checked" } else { "" };
    format!(
        "<p><label><input type=\"checkbox\" name=\"{name}\" value=\"1\"{checked}> {label}</label></p>\n",
        name = escape(name),
        label = escape(label),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn halt_escapes_code_blocks() {
        let Html(page) = halt_with_code("The following SQL query failed", "SELECT 1 < 2");
        assert!(page.contains("<pre>SELECT 1 &lt; 2</pre>"));
    }
}
