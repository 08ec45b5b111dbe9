//! Code-preview blocks.
//!
//! Each preview is a `<pre class="<prefix>-code">` holding a `<code>`
//! element, with the text escaped once.

use swatch_markup::{Markup, Tag};

use super::pretty::{pretty_locals, pretty_value};
use crate::component::PropertySchema;
use crate::config::SwatchConfig;
use crate::error::Result;
use crate::locals::Locals;

/// Builds the code-preview blocks shown in documentation mode.
#[derive(Debug, Clone, Copy)]
pub struct DocumentationComposer<'a> {
    config: &'a SwatchConfig,
}

impl<'a> DocumentationComposer<'a> {
    pub fn new(config: &'a SwatchConfig) -> Self {
        Self { config }
    }

    /// The invocation as it would be written: `component "<name>"`, then the
    /// pretty-printed locals when there are any.
    pub fn source_preview(&self, name: &str, locals: &Locals) -> Result<Markup> {
        let mut source = format!("component {}", serde_json::to_string(name)?);
        if let Some(args) = pretty_locals(locals)? {
            source.push_str(", ");
            source.push_str(&args);
        }
        Ok(self.code_block(&source, &self.config.source_language))
    }

    /// Previously rendered output, shown as literal text.
    pub fn markup_preview(&self, rendered: &Markup) -> Markup {
        self.code_block(rendered.as_str(), &self.config.markup_language)
    }

    /// A declared property schema as an unquoted-key block.
    pub fn properties_preview(&self, schema: &PropertySchema) -> Result<Markup> {
        let text = pretty_value(&schema.to_value())?;
        Ok(self.code_block(&text, ""))
    }

    fn code_block(&self, text: &str, language: &str) -> Markup {
        let code = Tag::new("code").class(language).text(text);
        Tag::new("pre").class(self.config.class("code")).wrap(code)
    }
}
