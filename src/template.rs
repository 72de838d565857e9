//! String template rendering.
//!
//! Templates are plain text files containing `{{key}}` placeholders. Each
//! placeholder is replaced in a single pass with the value from the supplied
//! [`TemplateData`], or the empty string when the key is absent. There is no
//! recursion, no conditionals, no loops.
//!
//! Substituted values are HTML-escaped; [`TemplateEngine::render_raw`] is the
//! explicit opt-out for callers inserting pre-sanitized markup.

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::fs;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").expect("placeholder pattern is valid"))
}

/// Flat mapping from placeholder name to substituted value.
///
/// Values are coerced to strings at insertion time; there are no nested
/// paths.
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    values: HashMap<String, String>,
}

impl TemplateData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous one under the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.values.insert(key.into(), value.to_string());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Renders view files from a fixed views directory.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    views_root: PathBuf,
}

impl TemplateEngine {
    pub fn new(views_root: impl Into<PathBuf>) -> Self {
        Self {
            views_root: views_root.into(),
        }
    }

    /// Render `<views_root>/<view>.html` with HTML-escaped substitution.
    pub async fn render(&self, view: &str, data: &TemplateData) -> Result<String> {
        self.load_and_render(view, data, true).await
    }

    /// Render without escaping. Callers must pre-sanitize untrusted values.
    pub async fn render_raw(&self, view: &str, data: &TemplateData) -> Result<String> {
        self.load_and_render(view, data, false).await
    }

    async fn load_and_render(&self, view: &str, data: &TemplateData, escape: bool) -> Result<String> {
        let path = self.views_root.join(format!("{view}.html"));
        let source = fs::read_to_string(&path).await.map_err(|source| Error::Template {
            view: view.to_string(),
            source,
        })?;
        Ok(render_str(&source, data, escape))
    }
}

/// Substitute every `{{key}}` occurrence in `source`.
///
/// The key is trimmed of surrounding whitespace before lookup; absent keys
/// substitute as the empty string.
pub fn render_str(source: &str, data: &TemplateData, escape: bool) -> String {
    placeholder_pattern()
        .replace_all(source, |caps: &Captures<'_>| {
            let key = caps[1].trim();
            match data.get(key) {
                Some(value) if escape => escape_html(value),
                Some(value) => value.to_string(),
                None => String::new(),
            }
        })
        .into_owned()
}

/// Escape the characters HTML treats as markup.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> TemplateData {
        let mut data = TemplateData::new();
        for (key, value) in pairs {
            data.set(*key, value);
        }
        data
    }

    #[test]
    fn test_basic_substitution() {
        let out = render_str("Hello {{name}}!", &data(&[("name", "World")]), true);
        assert_eq!(out, "Hello World!");
    }

    #[test]
    fn test_missing_key_substitutes_empty() {
        let out = render_str("Hello {{name}}!", &TemplateData::new(), true);
        assert_eq!(out, "Hello !");
    }

    #[test]
    fn test_whitespace_around_key_is_trimmed() {
        let out = render_str("Hello {{  name  }}!", &data(&[("name", "World")]), true);
        assert_eq!(out, "Hello World!");
    }

    #[test]
    fn test_no_placeholders_is_identity() {
        let source = "<p>static content, no tokens</p>";
        let out = render_str(source, &data(&[("unused", "value")]), true);
        assert_eq!(out, source);
    }

    #[test]
    fn test_escapes_html_by_default() {
        let out = render_str(
            "{{payload}}",
            &data(&[("payload", "<script>alert(\"x\")</script>")]),
            true,
        );
        assert_eq!(out, "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;");
    }

    #[test]
    fn test_raw_substitution_is_verbatim() {
        let out = render_str("{{markup}}", &data(&[("markup", "<b>bold</b>")]), false);
        assert_eq!(out, "<b>bold</b>");
    }

    #[test]
    fn test_repeated_placeholder() {
        let out = render_str("{{x}} and {{x}}", &data(&[("x", "one")]), true);
        assert_eq!(out, "one and one");
    }

    #[test]
    fn test_single_pass_no_recursive_expansion() {
        // A substituted value containing a placeholder token is not expanded
        // again.
        let out = render_str("{{a}}", &data(&[("a", "{{b}}"), ("b", "nested")]), false);
        assert_eq!(out, "{{b}}");
    }

    #[tokio::test]
    async fn test_render_reads_view_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>{{title}}</h1>").unwrap();

        let engine = TemplateEngine::new(dir.path());
        let mut data = TemplateData::new();
        data.set("title", "Home");

        let html = engine.render("index", &data).await.unwrap();
        assert_eq!(html, "<h1>Home</h1>");
    }

    #[tokio::test]
    async fn test_missing_view_propagates_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TemplateEngine::new(dir.path());

        let err = engine.render("absent", &TemplateData::new()).await.unwrap_err();
        assert!(matches!(err, Error::Template { ref view, .. } if view == "absent"));
    }
}
