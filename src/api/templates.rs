//! Admin page templates
//!
//! The templates are compiled into the binary and rendered with Tera.
//! Autoescaping is on for every `.html` template.

use anyhow::{Context, Result};
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Render(String),
}

pub struct AdminTemplates {
    tera: Tera,
}

impl AdminTemplates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("templates/base.html")),
            ("listing.html", include_str!("templates/listing.html")),
            ("settings.html", include_str!("templates/settings.html")),
        ])
        .context("Failed to load admin templates")?;

        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, TemplateError> {
        self.tera.render(template, context).map_err(|e| {
            let mut error_msg = format!("Failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(s) = source {
                error_msg.push_str(&format!("\n  Caused by: {}", s));
                source = s.source();
            }
            TemplateError::Render(error_msg)
        })
    }
}
