//! Template-backed components.
//!
//! A [`TemplateComponent`] is a MiniJinja template compiled once, when the
//! resolver first loads it. Each gets its own environment with HTML
//! auto-escaping, so plain strings in locals are escaped while fragments
//! produced by nested `component(...)` calls are not.
//!
//! # Template Context
//!
//! | Variable | Value |
//! |----------|-------|
//! | every key of the locals | the local's value (fragments stay unescaped) |
//! | `options` | the render options |
//! | `content` | the caller's nested content, rendered once (only when supplied) |
//! | `has_content` | whether nested content was supplied |
//!
//! `options`, `content` and `has_content` shadow locals of the same name.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use minijinja::{AutoEscape, Environment, Value};
use swatch_markup::Markup;

use super::properties::PropertySchema;
use super::{Component, Content};
use crate::error::Result;
use crate::locals::{Locals, RenderOptions};

/// A component rendered from a MiniJinja template.
pub struct TemplateComponent {
    identifier: String,
    env: Environment<'static>,
    schema: Option<PropertySchema>,
}

impl TemplateComponent {
    /// Reads and compiles a template file, plus its schema sidecar if given.
    ///
    /// # Errors
    ///
    /// I/O errors, template syntax errors, and malformed schema files.
    pub fn load(
        identifier: &str,
        path: &Path,
        schema_path: Option<&Path>,
        setup: Option<&(dyn Fn(&mut Environment<'static>) + Send + Sync)>,
    ) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let schema = schema_path.map(load_schema).transpose()?;
        Self::from_source(identifier, source, schema, setup)
    }

    /// Compiles a template from a string.
    pub fn from_source(
        identifier: impl Into<String>,
        source: impl Into<String>,
        schema: Option<PropertySchema>,
        setup: Option<&(dyn Fn(&mut Environment<'static>) + Send + Sync)>,
    ) -> Result<Self> {
        let identifier = identifier.into();
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        if let Some(setup) = setup {
            setup(&mut env);
        }
        env.add_template_owned(identifier.clone(), source.into())?;

        Ok(Self {
            identifier,
            env,
            schema,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl Component for TemplateComponent {
    fn render(
        &self,
        locals: &Locals,
        options: &RenderOptions,
        content: Option<&Content<'_>>,
    ) -> Result<Markup> {
        let mut ctx: HashMap<&str, Value> = locals
            .iter()
            .map(|(key, value)| match value.as_str() {
                Some(markup) if locals.is_markup(key) => (key, Value::from_safe_string(markup.to_string())),
                _ => (key, Value::from_serialize(value)),
            })
            .collect();
        ctx.insert("options", Value::from_serialize(options));
        ctx.insert("has_content", Value::from(content.is_some()));
        if let Some(content) = content {
            ctx.insert("content", Value::from_safe_string(content.render()?.into_string()));
        }

        let template = self.env.get_template(&self.identifier)?;
        Ok(Markup::raw(template.render(ctx)?))
    }

    fn property_schema(&self) -> Option<PropertySchema> {
        self.schema.clone()
    }
}

impl fmt::Debug for TemplateComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateComponent")
            .field("identifier", &self.identifier)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

fn load_schema(path: &Path) -> Result<PropertySchema> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    if is_json {
        PropertySchema::from_json(&content)
    } else {
        PropertySchema::from_yaml(&content)
    }
}
