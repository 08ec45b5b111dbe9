//! Convenient imports for defining and rendering components.
//!
//! ```rust
//! use swatch::prelude::*;
//!
//! struct Badge;
//!
//! impl Component for Badge {
//!     fn render(&self, locals: &Locals, _: &RenderOptions, _: Option<&Content<'_>>) -> Result<Markup> {
//!         let label = locals.get("label").and_then(|v| v.as_str()).unwrap_or_default();
//!         Ok(Tag::new("span").class("badge").text(label))
//!     }
//! }
//! ```

pub use crate::component::{Component, Content, PropertySchema, PropertySpec};
pub use crate::error::{RenderError, Result};
pub use crate::locals::{Locals, RenderOptions};
pub use crate::render::ComponentLibrary;
pub use swatch_markup::{Buffer, Markup, Tag};
