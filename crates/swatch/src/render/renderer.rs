use swatch_markup::Markup;

use crate::component::{BlockFn, ComponentResolver, Content};
use crate::error::Result;
use crate::locals::{Locals, RenderOptions};

/// Renders components by name.
///
/// Output is returned exactly as the implementation produced it, and errors
/// (from resolution, the implementation, or the content block) propagate
/// unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ComponentRenderer<'a> {
    resolver: &'a ComponentResolver,
}

impl<'a> ComponentRenderer<'a> {
    pub fn new(resolver: &'a ComponentResolver) -> Self {
        Self { resolver }
    }

    /// Resolves `name` and renders it.
    ///
    /// When `content` is given, the implementation receives it wrapped as
    /// [`Content`], which captures the block's writes as a fragment each time
    /// it is rendered.
    pub fn render(
        &self,
        name: &str,
        locals: &Locals,
        options: &RenderOptions,
        content: Option<&BlockFn<'_>>,
    ) -> Result<Markup> {
        let component = self.resolver.resolve(name)?;
        let content = content.map(|block| Content::new(block));
        component
            .implementation()
            .render(locals, options, content.as_ref())
    }
}
