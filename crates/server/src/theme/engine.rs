//! Tera template engine for the admin console.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::DateTime;
use tera::{Tera, Value};
use tracing::debug;

/// Loaded admin templates.
pub struct ThemeEngine {
    tera: Tera,
}

impl ThemeEngine {
    /// Load every `*.html` template under `template_dir`.
    pub fn new(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let mut tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;
        Self::register_filters(&mut tera);

        let count = tera.get_template_names().count();
        debug!(count, dir = %template_dir.display(), "loaded templates");

        Ok(Self { tera })
    }

    fn register_filters(tera: &mut Tera) {
        // RFC 3339 timestamps as "12 Jan 2025".
        tera.register_filter(
            "format_date",
            |value: &Value, _args: &HashMap<String, Value>| {
                let formatted = value
                    .as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.format("%-d %b %Y").to_string())
                    .unwrap_or_default();
                Ok(Value::String(formatted))
            },
        );
    }

    pub fn render(&self, template: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(template, context)
            .with_context(|| format!("failed to render template {template}"))
    }

    pub fn has_template(&self, template: &str) -> bool {
        self.tera.get_template_names().any(|name| name == template)
    }
}
