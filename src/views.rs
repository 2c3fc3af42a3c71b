use std::path::Path;

use anyhow::{bail, Context as _};
use axum::response::Html;
use tera::{Context, Tera};
use tracing::info;

/// Templates the application cannot serve pages without.
const REQUIRED: &[&str] = &[
    "layouts/bootstrap.html",
    "layouts/footer.html",
    "static/home.html",
    "static/contact.html",
    "static/not_found.html",
    "users/new.html",
    "users/login.html",
];

/// Compiled page templates.
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Loads every `*.html` under `dir`. Fails when a required page is missing,
    /// so a broken deployment stops at boot instead of on first request.
    pub fn load(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let glob = format!("{}/**/*.html", dir.display());
        let tera = Tera::new(&glob).with_context(|| format!("parse templates in {}", dir.display()))?;

        let loaded: Vec<&str> = tera.get_template_names().collect();
        for name in REQUIRED {
            if !loaded.contains(name) {
                bail!("template {name} not found in {}", dir.display());
            }
        }
        info!(count = loaded.len(), dir = %dir.display(), "templates loaded");
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, ctx: &Context) -> Result<Html<String>, tera::Error> {
        self.tera.render(name, ctx).map(Html)
    }
}
