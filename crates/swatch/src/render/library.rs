//! The host-facing component library.

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use minijinja::{AutoEscape, Environment};
use swatch_markup::Markup;

use super::functions::{self, LibraryHandle};
use super::renderer::ComponentRenderer;
use crate::component::{
    BlockFn, Component, ComponentResolver, PropertyIntrospector, PropertySchema, ResolvedComponent,
};
use crate::config::SwatchConfig;
use crate::doc::{DocumentationComposer, TabSet, TabsComposer};
use crate::error::Result;
use crate::locals::{Locals, RenderOptions};

/// A configured set of components, ready to render.
///
/// Build one at startup with [`ComponentLibrary::builder`], then share it:
/// it is cheap to clone and safe to use from many threads.
///
/// # Example
///
/// ```rust
/// use swatch::{Component, ComponentLibrary, Content, Locals, Markup, RenderOptions};
/// use swatch_markup::Tag;
///
/// struct Greeting;
///
/// impl Component for Greeting {
///     fn render(&self, locals: &Locals, _: &RenderOptions, _: Option<&Content<'_>>) -> swatch::Result<Markup> {
///         let name = locals.get("name").and_then(|v| v.as_str()).unwrap_or_default();
///         Ok(Tag::new("p").text(&format!("Hello, {}", name)))
///     }
/// }
///
/// let library = ComponentLibrary::builder()
///     .register("greeting", || Greeting)
///     .build()
///     .unwrap();
///
/// let locals = Locals::new().with("name", "Ada").unwrap();
/// let html = library.render("greeting", &locals, &RenderOptions::new(), None).unwrap();
/// assert_eq!(html.as_str(), "<p>Hello, Ada</p>");
///
/// // Inside templates
/// let env = library.environment();
/// let out = env.render_str(r#"{{ component("greeting", name="Ada") }}"#, ()).unwrap();
/// assert_eq!(out, "<p>Hello, Ada</p>");
/// ```
#[derive(Clone)]
pub struct ComponentLibrary {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    resolver: ComponentResolver,
    config: SwatchConfig,
}

impl ComponentLibrary {
    pub fn builder() -> ComponentLibraryBuilder {
        ComponentLibraryBuilder::new()
    }

    pub(crate) fn from_weak(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn config(&self) -> &SwatchConfig {
        &self.inner.config
    }

    pub fn resolver(&self) -> &ComponentResolver {
        &self.inner.resolver
    }

    pub fn resolve(&self, name: &str) -> Result<ResolvedComponent> {
        self.inner.resolver.resolve(name)
    }

    /// Renders a component.
    ///
    /// # Errors
    ///
    /// [`RenderError::ComponentNotFound`](crate::RenderError::ComponentNotFound)
    /// for unknown names; implementation and content-block errors unchanged.
    pub fn render(
        &self,
        name: &str,
        locals: &Locals,
        options: &RenderOptions,
        content: Option<&BlockFn<'_>>,
    ) -> Result<Markup> {
        ComponentRenderer::new(&self.inner.resolver).render(name, locals, options, content)
    }

    /// The component's declared schema, or `None` if it declares none.
    pub fn properties_of(&self, name: &str) -> Result<Option<PropertySchema>> {
        PropertyIntrospector::new(&self.inner.resolver).properties_of(name)
    }

    /// A documentation block for the declared schema, or `None` if the
    /// component declares none.
    pub fn properties_preview(&self, name: &str) -> Result<Option<Markup>> {
        match self.properties_of(name)? {
            Some(schema) => Ok(Some(self.doc().properties_preview(&schema)?)),
            None => Ok(None),
        }
    }

    /// Renders a component followed by its invocation source.
    pub fn render_with_doc(
        &self,
        name: &str,
        locals: &Locals,
        options: &RenderOptions,
        content: Option<&BlockFn<'_>>,
    ) -> Result<Markup> {
        let output = self.render(name, locals, options, content)?;
        let source = self.doc().source_preview(name, locals)?;
        Ok(output + source)
    }

    /// Renders a component followed by a tab block with its invocation
    /// source and its rendered markup.
    ///
    /// `html_options` become attributes of the tab block's wrapper.
    pub fn render_with_doc_tabs(
        &self,
        id: &str,
        name: &str,
        locals: &Locals,
        options: &RenderOptions,
        html_options: &[(String, String)],
        content: Option<&BlockFn<'_>>,
    ) -> Result<Markup> {
        let output = self.render(name, locals, options, content)?;
        let doc = self.doc();
        let config = &self.inner.config;

        let tabs = TabSet::from_pairs([
            (config.source_label.as_str(), doc.source_preview(name, locals)?),
            (config.markup_label.as_str(), doc.markup_preview(&output)),
        ])?;
        let tabs = TabsComposer::new(config).compose_with_attrs(id, &tabs, html_options);
        Ok(output + tabs)
    }

    /// All known component names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.inner.resolver.names()
    }

    /// Drops the cached implementation of `name` (e.g. after its template
    /// changed on disk).
    pub fn invalidate(&self, name: &str) -> bool {
        self.inner.resolver.invalidate(name)
    }

    pub fn clear(&self) {
        self.inner.resolver.clear()
    }

    /// Registers the template functions and the `component` filter on a host
    /// environment.
    pub fn register_functions(&self, env: &mut Environment<'static>) {
        functions::register(env, LibraryHandle::Strong(self.clone()));
    }

    /// A new HTML auto-escaping environment with the template functions
    /// registered.
    pub fn environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        self.register_functions(&mut env);
        env
    }

    fn doc(&self) -> DocumentationComposer<'_> {
        DocumentationComposer::new(&self.inner.config)
    }
}

impl std::fmt::Debug for ComponentLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentLibrary")
            .field("resolver", &self.inner.resolver)
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Builder for [`ComponentLibrary`].
pub struct ComponentLibraryBuilder {
    config: SwatchConfig,
    search_paths: Vec<PathBuf>,
    resolver: ComponentResolver,
}

impl Default for ComponentLibraryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentLibraryBuilder {
    pub fn new() -> Self {
        Self {
            config: SwatchConfig::default(),
            search_paths: Vec::new(),
            resolver: ComponentResolver::new(),
        }
    }

    /// Replaces the configuration. Search paths added with
    /// [`search_path`](Self::search_path) are kept and searched after the
    /// config's own.
    pub fn config(mut self, config: SwatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a template search path directory.
    pub fn search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    /// Registers a component factory. See [`ComponentResolver::register`].
    pub fn register<C, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        C: Component + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.resolver.register(name, factory);
        self
    }

    /// # Errors
    ///
    /// Returns [`RenderError::ConfigError`](crate::RenderError::ConfigError)
    /// if the configuration is invalid.
    pub fn build(self) -> Result<ComponentLibrary> {
        self.config.validate()?;

        let Self {
            config,
            search_paths,
            mut resolver,
        } = self;
        for dir in config.search_paths.iter().cloned().chain(search_paths) {
            resolver.add_search_path(dir);
        }

        // Template components reach back to the library through a weak
        // reference; the library owns their environments.
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            resolver.set_environment_setup(Arc::new(move |env: &mut Environment<'static>| {
                functions::register(env, LibraryHandle::Weak(weak.clone()));
            }));
            Inner { resolver, config }
        });

        Ok(ComponentLibrary { inner })
    }
}
