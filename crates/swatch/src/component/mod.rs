//! Components and their resolution.
//!
//! A component is anything implementing [`Component`]: a Rust type registered
//! with a factory, or a template file found on the search path
//! ([`TemplateComponent`]). The [`ComponentResolver`] maps names to loaded
//! implementations and hands out [`ResolvedComponent`] handles.
//!
//! ## Nested Content
//!
//! Callers may pass a block of nested content. The block writes into a
//! [`Buffer`]; the renderer wraps it as [`Content`] so the implementation can
//! call [`Content::render`] wherever it wants the block's output, as often as
//! it wants (including never).
//!
//! ```rust
//! use swatch::{Component, Content, Locals, Markup, RenderOptions};
//! use swatch_markup::Tag;
//!
//! struct Card;
//!
//! impl Component for Card {
//!     fn render(
//!         &self,
//!         locals: &Locals,
//!         _options: &RenderOptions,
//!         content: Option<&Content<'_>>,
//!     ) -> swatch::Result<Markup> {
//!         let title = locals.get("title").and_then(|v| v.as_str()).unwrap_or_default();
//!         let body = match content {
//!             Some(content) => content.render()?,
//!             None => Markup::new(),
//!         };
//!         Ok(Tag::new("div").class("card").wrap(Tag::new("h2").text(title) + body))
//!     }
//! }
//! ```

pub mod properties;
pub mod resolver;
mod template;

use std::fmt;
use std::sync::Arc;

use swatch_markup::{Buffer, Markup};

use crate::error::Result;
use crate::locals::{Locals, RenderOptions};

pub use properties::{PropertyIntrospector, PropertySchema, PropertySpec};
pub use resolver::{component_identifier, ComponentResolver, COMPONENT_EXTENSIONS};
pub use template::TemplateComponent;

/// A block of caller-supplied content, written into a [`Buffer`].
pub type BlockFn<'a> = dyn Fn(&mut Buffer) -> Result<()> + 'a;

/// A renderable component implementation.
pub trait Component: Send + Sync {
    /// Renders the component.
    ///
    /// Errors are propagated to the caller unchanged.
    fn render(
        &self,
        locals: &Locals,
        options: &RenderOptions,
        content: Option<&Content<'_>>,
    ) -> Result<Markup>;

    /// The declared input properties, if the component declares any.
    fn property_schema(&self) -> Option<PropertySchema> {
        None
    }
}

/// Caller-supplied nested content, captured on demand.
pub struct Content<'a> {
    block: &'a BlockFn<'a>,
}

impl<'a> Content<'a> {
    pub fn new(block: &'a BlockFn<'a>) -> Self {
        Self { block }
    }

    /// Runs the block and returns its output as a fragment.
    ///
    /// Each call runs the block again. An error raised partway through
    /// discards the partial output.
    pub fn render(&self) -> Result<Markup> {
        swatch_markup::capture(|buf| (self.block)(buf))
    }
}

impl fmt::Debug for Content<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content").finish_non_exhaustive()
    }
}

/// Where a resolved component came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSource {
    /// Built by a factory registered under the name.
    Registered,
    /// Loaded from a template file on the search path.
    Template(std::path::PathBuf),
}

/// Handle to a loaded component, shared through the resolver's cache.
///
/// Clones point at the same implementation; use [`ptr_eq`](Self::ptr_eq)
/// to check identity.
#[derive(Clone)]
pub struct ResolvedComponent {
    inner: Arc<Resolved>,
}

struct Resolved {
    name: String,
    source: ComponentSource,
    implementation: Box<dyn Component>,
}

impl ResolvedComponent {
    pub(crate) fn new(
        name: impl Into<String>,
        source: ComponentSource,
        implementation: Box<dyn Component>,
    ) -> Self {
        Self {
            inner: Arc::new(Resolved {
                name: name.into(),
                source,
                implementation,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn source(&self) -> &ComponentSource {
        &self.inner.source
    }

    pub fn implementation(&self) -> &dyn Component {
        self.inner.implementation.as_ref()
    }

    /// True when both handles refer to the same loaded implementation.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for ResolvedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedComponent")
            .field("name", &self.inner.name)
            .field("source", &self.inner.source)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use std::cell::Cell;

    #[test]
    fn test_content_runs_block_each_call() {
        let calls = Cell::new(0);
        let block = |buf: &mut Buffer| -> Result<()> {
            calls.set(calls.get() + 1);
            buf.push_text("<hi>");
            Ok(())
        };
        let content = Content::new(&block);

        assert_eq!(content.render().unwrap().as_str(), "&lt;hi&gt;");
        assert_eq!(content.render().unwrap().as_str(), "&lt;hi&gt;");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_content_error_propagates() {
        let block = |buf: &mut Buffer| -> Result<()> {
            buf.push_text("partial");
            Err(RenderError::component("block failed"))
        };
        let content = Content::new(&block);
        let err = content.render().unwrap_err();
        assert_eq!(err.to_string(), "block failed");
    }

    #[test]
    fn test_resolved_identity() {
        struct Empty;
        impl Component for Empty {
            fn render(&self, _: &Locals, _: &RenderOptions, _: Option<&Content<'_>>) -> Result<Markup> {
                Ok(Markup::new())
            }
        }

        let a = ResolvedComponent::new("empty", ComponentSource::Registered, Box::new(Empty));
        let b = a.clone();
        let c = ResolvedComponent::new("empty", ComponentSource::Registered, Box::new(Empty));
        assert!(ResolvedComponent::ptr_eq(&a, &b));
        assert!(!ResolvedComponent::ptr_eq(&a, &c));
        assert!(a.implementation().property_schema().is_none());
    }
}
