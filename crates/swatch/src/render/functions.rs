//! Template functions exposing the library inside MiniJinja templates.
//!
//! | Name | Alias | Output |
//! |------|-------|--------|
//! | `component(name, locals?, options?, **kwargs)` | `c` | the rendered component |
//! | `component_with_doc(name, locals?, options?, **kwargs)` | `cdoc` | output plus source preview |
//! | `component_with_doc_tabs(id, name, locals?, options?, html_options?, **kwargs)` | `cdoc_tabs` | output plus tab block |
//! | `component_properties_doc(name)` | | the schema block, or nothing |
//! | `components()` | | every known component name |
//!
//! Keyword arguments are merged into the locals after the positional map.
//! `html_options` may also be given as a keyword argument. Values that are
//! already safe strings (such as another component's output) stay unescaped
//! in the receiving component.
//!
//! The three rendering functions are also registered as filters, under the
//! same names, so a block's output becomes the component's content:
//!
//! ```jinja
//! {% filter component("card", title="Settings") %}<p>Body</p>{% endfilter %}
//! {% filter cdoc_tabs("t1", "card", title="Settings") %}<p>Body</p>{% endfilter %}
//! ```
//!
//! Every rendering function returns a safe string, so auto-escaping leaves
//! component output alone. Nested calls deeper than
//! [`SwatchConfig::max_nesting_depth`](crate::SwatchConfig::max_nesting_depth)
//! fail with a template error.

use std::cell::Cell;
use std::sync::Weak;

use minijinja::value::{from_args, Kwargs, Rest, Value, ValueKind};
use minijinja::{Environment, Error, ErrorKind};
use swatch_markup::{Buffer, Markup};

use super::library::{ComponentLibrary, Inner};
use crate::error::{RenderError, Result};
use crate::locals::{Locals, RenderOptions};

/// How registered functions reach the library.
///
/// Host environments hold a strong handle; environments owned by the
/// library's own template components hold a weak one.
#[derive(Clone)]
pub(crate) enum LibraryHandle {
    Strong(ComponentLibrary),
    Weak(Weak<Inner>),
}

impl LibraryHandle {
    fn get(&self) -> std::result::Result<ComponentLibrary, Error> {
        match self {
            LibraryHandle::Strong(library) => Ok(library.clone()),
            LibraryHandle::Weak(weak) => ComponentLibrary::from_weak(weak).ok_or_else(|| {
                Error::new(ErrorKind::InvalidOperation, "component library was dropped")
            }),
        }
    }
}

thread_local! {
    static NESTING: Cell<usize> = const { Cell::new(0) };
}

/// Counts component calls in progress on this thread.
///
/// Each template component renders in a fresh engine state, so the engine's
/// own recursion limit never sees a component including itself.
struct NestingGuard;

impl NestingGuard {
    fn enter(name: &str, limit: usize) -> std::result::Result<Self, Error> {
        NESTING.with(|depth| {
            if depth.get() >= limit {
                return Err(RenderError::TemplateError(format!(
                    "component nesting deeper than {} levels while rendering {:?}",
                    limit, name
                ))
                .into());
            }
            depth.set(depth.get() + 1);
            Ok(NestingGuard)
        })
    }
}

impl Drop for NestingGuard {
    fn drop(&mut self) {
        NESTING.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Which library entry point a function or filter calls.
#[derive(Debug, Clone, Copy)]
enum Mode {
    Plain,
    Doc,
}

pub(crate) fn register(env: &mut Environment<'static>, handle: LibraryHandle) {
    for (alias, mode) in [
        ("component", Mode::Plain),
        ("c", Mode::Plain),
        ("component_with_doc", Mode::Doc),
        ("cdoc", Mode::Doc),
    ] {
        let fn_handle = handle.clone();
        env.add_function(
            alias,
            move |name: String, locals: Option<Value>, options: Option<Value>, kwargs: Kwargs| {
                let library = fn_handle.get()?;
                let (locals, options) = arguments(locals, options, &kwargs, &[])?;
                Ok::<_, Error>(safe(render(&library, mode, &name, &locals, &options, None)?))
            },
        );

        let handle = handle.clone();
        env.add_filter(
            alias,
            move |body: Value, name: String, locals: Option<Value>, options: Option<Value>, kwargs: Kwargs| {
                let library = handle.get()?;
                let (locals, options) = arguments(locals, options, &kwargs, &[])?;
                let body = block_body(&body);
                let block = |buf: &mut Buffer| -> Result<()> {
                    buf.push(&body);
                    Ok(())
                };
                Ok::<_, Error>(safe(render(&library, mode, &name, &locals, &options, Some(&block))?))
            },
        );
    }

    for alias in ["component_with_doc_tabs", "cdoc_tabs"] {
        let fn_handle = handle.clone();
        env.add_function(
            alias,
            move |id: String, name: String, rest: Rest<Value>, kwargs: Kwargs| {
                let library = fn_handle.get()?;
                let call = TabsCall::parse(&rest, &kwargs)?;
                Ok::<_, Error>(safe(call.render(&library, &id, &name, None)?))
            },
        );

        let handle = handle.clone();
        env.add_filter(
            alias,
            move |body: Value, id: String, name: String, rest: Rest<Value>, kwargs: Kwargs| {
                let library = handle.get()?;
                let call = TabsCall::parse(&rest, &kwargs)?;
                let body = block_body(&body);
                let block = |buf: &mut Buffer| -> Result<()> {
                    buf.push(&body);
                    Ok(())
                };
                Ok::<_, Error>(safe(call.render(&library, &id, &name, Some(&block))?))
            },
        );
    }

    {
        let handle = handle.clone();
        env.add_function("component_properties_doc", move |name: String| {
            let library = handle.get()?;
            let out = library.properties_preview(&name)?.unwrap_or_default();
            Ok::<_, Error>(safe(out))
        });
    }

    env.add_function("components", move || {
        let library = handle.get()?;
        Ok::<_, Error>(Value::from(library.names()))
    });
}

fn render(
    library: &ComponentLibrary,
    mode: Mode,
    name: &str,
    locals: &Locals,
    options: &RenderOptions,
    content: Option<&crate::component::BlockFn<'_>>,
) -> std::result::Result<Markup, Error> {
    let _guard = NestingGuard::enter(name, library.config().max_nesting_depth)?;
    let out = match mode {
        Mode::Plain => library.render(name, locals, options, content)?,
        Mode::Doc => library.render_with_doc(name, locals, options, content)?,
    };
    Ok(out)
}

/// Arguments of `component_with_doc_tabs` after `id` and `name`.
struct TabsCall {
    locals: Locals,
    options: RenderOptions,
    html_options: Vec<(String, String)>,
}

impl TabsCall {
    fn parse(rest: &[Value], kwargs: &Kwargs) -> std::result::Result<Self, Error> {
        let (locals, options, positional_html): (Option<Value>, Option<Value>, Option<Value>) =
            from_args(rest)?;

        let mut html_options = match positional_html {
            Some(value) => attribute_pairs(&value)?,
            None => Vec::new(),
        };
        if kwargs.has("html_options") {
            let value: Value = kwargs.get("html_options")?;
            html_options.extend(attribute_pairs(&value)?);
        }

        let (locals, options) = arguments(locals, options, kwargs, &["html_options"])?;
        Ok(Self {
            locals,
            options,
            html_options,
        })
    }

    fn render(
        &self,
        library: &ComponentLibrary,
        id: &str,
        name: &str,
        content: Option<&crate::component::BlockFn<'_>>,
    ) -> std::result::Result<Markup, Error> {
        let _guard = NestingGuard::enter(name, library.config().max_nesting_depth)?;
        Ok(library.render_with_doc_tabs(
            id,
            name,
            &self.locals,
            &self.options,
            &self.html_options,
            content,
        )?)
    }
}

fn safe(markup: Markup) -> Value {
    Value::from_safe_string(markup.into_string())
}

/// The filter body was produced by the template engine itself.
fn block_body(body: &Value) -> Markup {
    Markup::raw(body.as_str().map(str::to_owned).unwrap_or_else(|| body.to_string()))
}

/// Builds locals from the positional map plus keyword arguments (minus
/// `skip`), and options from the positional options map.
fn arguments(
    locals: Option<Value>,
    options: Option<Value>,
    kwargs: &Kwargs,
    skip: &[&str],
) -> std::result::Result<(Locals, RenderOptions), Error> {
    let mut merged = match locals {
        Some(value) => locals_from_value(&value)?,
        None => Locals::new(),
    };
    for key in kwargs.args() {
        if skip.contains(&key) {
            continue;
        }
        let value: Value = kwargs.get(key)?;
        insert_local(&mut merged, key.to_string(), &value)?;
    }

    let options = match options {
        Some(value) => RenderOptions::from_serialize(&value)?,
        None => RenderOptions::new(),
    };
    Ok((merged, options))
}

fn locals_from_value(value: &Value) -> std::result::Result<Locals, Error> {
    if value.kind() != ValueKind::Map {
        return Ok(Locals::from_serialize(value)?);
    }
    let mut locals = Locals::new();
    for key in value.try_iter()? {
        let item = value.get_item(&key)?;
        let key = match key.as_str() {
            Some(key) => key.to_string(),
            None => key.to_string(),
        };
        insert_local(&mut locals, key, &item)?;
    }
    Ok(locals)
}

/// Safe strings keep their fragment status.
fn insert_local(locals: &mut Locals, key: String, value: &Value) -> Result<()> {
    match value.as_str() {
        Some(markup) if value.is_safe() => {
            locals.insert_markup(key, Markup::raw(markup));
            Ok(())
        }
        _ => locals.insert(key, value),
    }
}

/// Reads an `html_options` map as attribute pairs.
fn attribute_pairs(value: &Value) -> std::result::Result<Vec<(String, String)>, Error> {
    if value.is_none() || value.is_undefined() {
        return Ok(Vec::new());
    }
    if value.kind() != ValueKind::Map {
        return Err(Error::new(
            ErrorKind::InvalidOperation,
            "html_options must be a map",
        ));
    }

    let mut attrs = Vec::new();
    for key in value.try_iter()? {
        let item = value.get_item(&key)?;
        attrs.push((key.to_string(), item.to_string()));
    }
    Ok(attrs)
}
