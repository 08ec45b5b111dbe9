//! # Swatch - Reusable Markup Components
//!
//! `swatch` renders named, reusable HTML components from Rust code or from
//! MiniJinja templates, and can show each one next to its invocation source
//! for living style guides.
//!
//! ## Core Concepts
//!
//! - [`Component`]: anything that turns [`Locals`], [`RenderOptions`] and
//!   optional nested [`Content`] into [`Markup`]
//! - [`ComponentResolver`]: maps names like `"forms/button"` to an
//!   implementation, loading each one at most once
//! - [`ComponentLibrary`]: the configured, shareable entry point
//! - [`doc`]: source previews, property-schema blocks and tabs
//! - [`render::functions`]: `component(...)` and friends inside templates
//!
//! ## Quick Start
//!
//! ```rust
//! use swatch::{ComponentLibrary, Component, Content, Locals, Markup, RenderOptions};
//! use swatch_markup::Tag;
//!
//! struct Greeting;
//!
//! impl Component for Greeting {
//!     fn render(&self, locals: &Locals, _: &RenderOptions, _: Option<&Content<'_>>) -> swatch::Result<Markup> {
//!         let name = locals.get("name").and_then(|v| v.as_str()).unwrap_or_default();
//!         Ok(Tag::new("p").text(&format!("Hello, {}", name)))
//!     }
//! }
//!
//! let library = ComponentLibrary::builder()
//!     .register("greeting", || Greeting)
//!     .build()
//!     .unwrap();
//!
//! let locals = Locals::new().with("name", "Ada").unwrap();
//! let html = library
//!     .render_with_doc_tabs("g1", "greeting", &locals, &RenderOptions::new(), &[], None)
//!     .unwrap();
//! assert!(html.as_str().starts_with("<p>Hello, Ada</p><div class=\"component-tabs\">"));
//! ```
//!
//! ## Template Components
//!
//! Files on a search path become components named after their location:
//! `forms/button` is looked up as `forms/button/forms_button.html.jinja`
//! (or `.jinja`, `.html.j2`, `.j2`, `.html`). A sibling
//! `forms_button.properties.yaml` declares its properties. See
//! [`TemplateComponent`] for the template context.
//!
//! ## Escaping
//!
//! [`Markup`] is a fragment that is already safe to emit. Plain strings are
//! escaped exactly once, where they become markup; fragments are never
//! escaped again, so nesting components never double-escapes.

pub mod component;
mod config;
pub mod doc;
mod error;
mod locals;
pub mod prelude;
pub mod render;

pub use component::{
    component_identifier, BlockFn, Component, ComponentResolver, ComponentSource, Content,
    PropertyIntrospector, PropertySchema, PropertySpec, ResolvedComponent, TemplateComponent,
    COMPONENT_EXTENSIONS,
};
pub use config::SwatchConfig;
pub use doc::{DocumentationComposer, Tab, TabSet, TabsComposer};
pub use error::{RenderError, Result};
pub use locals::{Locals, RenderOptions};
pub use render::{ComponentLibrary, ComponentLibraryBuilder, ComponentRenderer};

pub use swatch_markup::Markup;
