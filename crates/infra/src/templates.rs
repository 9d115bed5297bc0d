//! HTML template rendering
//!
//! Templates are loaded once at startup from the configured template
//! directory; any template missing on disk falls back to the copy compiled
//! into the binary.

use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use trawl_core::{Result, TrawlError};

/// Name of the search results template
pub const RESULTS_TEMPLATE: &str = "results";

const TEMPLATE_EXTENSION: &str = "hbs";

const BUILTIN_RESULTS_TEMPLATE: &str = include_str!("../../../templates/results.hbs");

handlebars_helper!(add: |a: u64, b: u64| a.saturating_add(b));

/// Immutable-after-startup template set
#[derive(Debug)]
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Create a renderer holding only the built-in templates
    pub fn builtin() -> Result<Self> {
        let mut renderer = Self::empty();
        renderer.add_template(RESULTS_TEMPLATE, BUILTIN_RESULTS_TEMPLATE)?;
        Ok(renderer)
    }

    /// Load templates from a directory, falling back to built-ins
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut renderer = Self::empty();

        let path = dir.join(format!("{}.{}", RESULTS_TEMPLATE, TEMPLATE_EXTENSION));
        if path.is_file() {
            renderer
                .handlebars
                .register_template_file(RESULTS_TEMPLATE, &path)?;
            tracing::info!("Loaded template '{}' from {:?}", RESULTS_TEMPLATE, path);
        } else {
            tracing::warn!(
                "Template {:?} not found, using built-in '{}' template",
                path,
                RESULTS_TEMPLATE
            );
            renderer.add_template(RESULTS_TEMPLATE, BUILTIN_RESULTS_TEMPLATE)?;
        }

        Ok(renderer)
    }

    fn empty() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_helper("add", Box::new(add));
        Self { handlebars }
    }

    /// Register an additional template from a string
    pub fn add_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars.register_template_string(name, template)?;
        Ok(())
    }

    /// Whether a template is registered
    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Render a template directly into a writer
    pub fn render_to_write<T: Serialize, W: Write>(
        &self,
        name: &str,
        context: &T,
        writer: W,
    ) -> Result<()> {
        if !self.has_template(name) {
            return Err(TrawlError::not_found(format!("template '{}'", name)));
        }
        self.handlebars.render_to_write(name, context, writer)?;
        Ok(())
    }
}
