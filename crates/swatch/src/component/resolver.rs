//! Component name resolution.
//!
//! [`ComponentResolver`] maps a component name such as `"forms/input"` to a
//! loaded implementation. Names are resolved using these rules:
//!
//! 1. Factories registered with [`ComponentResolver::register`] have highest priority
//! 2. Search path directories are tried in registration order (first directory wins)
//! 3. Otherwise the lookup fails with [`RenderError::ComponentNotFound`]
//!
//! # Template Layout
//!
//! A name's segments are both the directory and, joined with `_`, the file
//! stem. With search path `./components`:
//!
//! | Name | File |
//! |------|------|
//! | `"button"` | `./components/button/button.html.jinja` |
//! | `"forms/input"` | `./components/forms/input/forms_input.html.jinja` |
//!
//! Recognized extensions, in priority order, are listed in
//! [`COMPONENT_EXTENSIONS`]. A declared property schema sits next to the
//! template as `<stem>.properties.yaml` (or `.yml`, `.json`).
//!
//! # Caching
//!
//! Each name is loaded once and the handle is cached until
//! [`invalidate`](ComponentResolver::invalidate) or
//! [`clear`](ComponentResolver::clear). Lookups of loaded names only take a
//! read lock. Concurrent first lookups of the same name wait on a per-name
//! [`OnceCell`], so a name is loaded at most once. Failed loads are not cached.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use minijinja::Environment;
use once_cell::sync::OnceCell;
use tracing::{debug, trace, warn};

use super::template::TemplateComponent;
use super::{Component, ComponentSource, ResolvedComponent};
use crate::error::{RenderError, Result};

/// Recognized component template extensions in priority order.
pub const COMPONENT_EXTENSIONS: &[&str] = &[".html.jinja", ".jinja", ".html.j2", ".j2", ".html"];

/// Recognized property schema sidecar extensions in priority order.
pub const SCHEMA_EXTENSIONS: &[&str] = &[".properties.yaml", ".properties.yml", ".properties.json"];

type Factory = Box<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// Hook run on every template component's environment before its template is
/// added.
pub type EnvironmentSetup = Arc<dyn Fn(&mut Environment<'static>) + Send + Sync>;

type Slot = Arc<OnceCell<ResolvedComponent>>;

/// Resolves component names to cached implementations.
///
/// Configure it (factories, search paths) before sharing it; resolution
/// itself only needs `&self` and is safe to call from many threads.
pub struct ComponentResolver {
    factories: HashMap<String, Factory>,
    search_paths: Vec<PathBuf>,
    environment_setup: Option<EnvironmentSetup>,
    cache: RwLock<HashMap<String, Slot>>,
}

impl Default for ComponentResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentResolver {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            search_paths: Vec::new(),
            environment_setup: None,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a factory for `name`.
    ///
    /// The factory runs on first resolution of the name, not here. A later
    /// registration under the same name replaces the earlier one.
    pub fn register<C, F>(&mut self, name: impl Into<String>, factory: F)
    where
        C: Component + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let name = name.into();
        self.factories
            .insert(name, Box::new(move || Box::new(factory()) as Box<dyn Component>));
    }

    /// Appends a directory to the template search path.
    ///
    /// A directory that does not exist yet is kept (it may be created later)
    /// but logged.
    pub fn add_search_path(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !dir.is_dir() {
            warn!(path = %dir.display(), "component search path is not a directory");
        }
        self.search_paths.push(dir);
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Sets the hook applied to template component environments.
    pub fn set_environment_setup(&mut self, setup: EnvironmentSetup) {
        self.environment_setup = Some(setup);
    }

    /// Resolves `name`, loading it on first use.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidComponentName`] for malformed names
    /// - [`RenderError::ComponentNotFound`] when nothing matches
    /// - template, I/O or schema errors from loading a template component
    pub fn resolve(&self, name: &str) -> Result<ResolvedComponent> {
        let identifier = component_identifier(name)?;
        let slot = self.slot(name);

        if let Some(resolved) = slot.get() {
            trace!(component = name, "component cache hit");
            return Ok(resolved.clone());
        }

        let result = slot
            .get_or_try_init(|| self.load(name, &identifier))
            .cloned();
        if result.is_err() {
            self.forget_failed(name, &slot);
        }
        result
    }

    /// True if `name` is loaded and cached.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Drops the cached handle for `name`; the next resolution loads it
    /// again. Returns whether anything was cached.
    pub fn invalidate(&self, name: &str) -> bool {
        let removed = self
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some_and(|slot| slot.get().is_some());
        if removed {
            debug!(component = name, "invalidated component");
        }
        removed
    }

    /// Drops every cached handle.
    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("cleared component cache");
    }

    /// All known component names: registered ones plus template components
    /// found on the search path. Sorted, without duplicates.
    ///
    /// Unreadable directories are skipped.
    pub fn names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.factories.keys().cloned().collect();
        for root in &self.search_paths {
            match walk_component_dir(root) {
                Ok(found) => names.extend(found),
                Err(err) => warn!(path = %root.display(), error = %err, "failed to walk component directory"),
            }
        }
        names.into_iter().collect()
    }

    fn slot(&self, name: &str) -> Slot {
        if let Some(slot) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Arc::clone(slot);
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(name.to_string()).or_default())
    }

    fn forget_failed(&self, name: &str, slot: &Slot) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let is_same_empty = cache
            .get(name)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.get().is_none());
        if is_same_empty {
            cache.remove(name);
        }
    }

    fn load(&self, name: &str, identifier: &str) -> Result<ResolvedComponent> {
        if let Some(factory) = self.factories.get(name) {
            debug!(component = name, "loading registered component");
            return Ok(ResolvedComponent::new(
                name,
                ComponentSource::Registered,
                factory(),
            ));
        }

        let Some((dir, template_path)) = self.find_template(name, identifier) else {
            debug!(component = name, "component not found");
            return Err(RenderError::ComponentNotFound {
                name: name.to_string(),
            });
        };

        debug!(component = name, path = %template_path.display(), "loading template component");
        let schema_path = SCHEMA_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}{}", identifier, ext)))
            .find(|p| p.is_file());
        let component = TemplateComponent::load(
            identifier,
            &template_path,
            schema_path.as_deref(),
            self.environment_setup.as_deref(),
        )?;

        Ok(ResolvedComponent::new(
            name,
            ComponentSource::Template(template_path),
            Box::new(component),
        ))
    }

    /// Returns the component directory and template file for `name`.
    fn find_template(&self, name: &str, identifier: &str) -> Option<(PathBuf, PathBuf)> {
        for root in &self.search_paths {
            let dir = name.split('/').fold(root.clone(), |dir, seg| dir.join(seg));
            for ext in COMPONENT_EXTENSIONS {
                let path = dir.join(format!("{}{}", identifier, ext));
                if path.is_file() {
                    return Some((dir, path));
                }
            }
        }
        None
    }
}

impl fmt::Debug for ComponentResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<_> = self.factories.keys().collect();
        registered.sort();
        f.debug_struct("ComponentResolver")
            .field("registered", &registered)
            .field("search_paths", &self.search_paths)
            .finish_non_exhaustive()
    }
}

/// Derives the implementation identifier from a component name:
/// `"forms/input"` → `"forms_input"`.
///
/// # Errors
///
/// Returns [`RenderError::InvalidComponentName`] if the name is empty or has
/// empty, `.` or `..` segments.
pub fn component_identifier(name: &str) -> Result<String> {
    let valid = !name.is_empty()
        && name
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != ".." && !seg.contains('\\'));
    if !valid {
        return Err(RenderError::InvalidComponentName(name.to_string()));
    }
    Ok(name.split('/').collect::<Vec<_>>().join("_"))
}

/// Walks a search path directory and returns the names of the template
/// components it contains.
///
/// A file counts when its stem matches its directory path joined with `_`,
/// e.g. `forms/input/forms_input.jinja` → `"forms/input"`.
pub fn walk_component_dir(root: impl AsRef<Path>) -> std::io::Result<Vec<String>> {
    let root = root.as_ref();
    let mut names = Vec::new();
    if root.is_dir() {
        walk_recursive(root, root, &mut names)?;
    }
    names.sort();
    names.dedup();
    Ok(names)
}

fn walk_recursive(root: &Path, dir: &Path, names: &mut Vec<String>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_recursive(root, &path, names)?;
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        let Some(stem) = COMPONENT_EXTENSIONS
            .iter()
            .find_map(|ext| file_name.strip_suffix(ext))
        else {
            continue;
        };
        let Ok(relative) = dir.strip_prefix(root) else {
            continue;
        };
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if !segments.is_empty() && segments.join("_") == stem {
            names.push(segments.join("/"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locals::{Locals, RenderOptions};
    use crate::Content;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use swatch_markup::Markup;

    struct Static(&'static str);

    impl Component for Static {
        fn render(&self, _: &Locals, _: &RenderOptions, _: Option<&Content<'_>>) -> Result<Markup> {
            Ok(Markup::raw(self.0))
        }
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    // =========================================================================
    // Identifier tests
    // =========================================================================

    #[test]
    fn test_component_identifier() {
        assert_eq!(component_identifier("button").unwrap(), "button");
        assert_eq!(component_identifier("forms/input").unwrap(), "forms_input");
        assert_eq!(component_identifier("a/b/c").unwrap(), "a_b_c");
    }

    #[test]
    fn test_component_identifier_rejects_bad_names() {
        for bad in ["", "/", "a//b", "a/", "/a", "../secret", "a/./b", "a\\b"] {
            assert!(
                matches!(component_identifier(bad), Err(RenderError::InvalidComponentName(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    // =========================================================================
    // Registered component tests
    // =========================================================================

    #[test]
    fn test_resolve_registered_is_cached() {
        let mut resolver = ComponentResolver::new();
        resolver.register("greeting", || Static("<p>hi</p>"));

        let a = resolver.resolve("greeting").unwrap();
        let b = resolver.resolve("greeting").unwrap();
        assert!(ResolvedComponent::ptr_eq(&a, &b));
        assert_eq!(a.source(), &ComponentSource::Registered);
        assert!(resolver.is_loaded("greeting"));
    }

    #[test]
    fn test_factory_runs_lazily_and_once() {
        static BUILT: AtomicUsize = AtomicUsize::new(0);
        let mut resolver = ComponentResolver::new();
        resolver.register("lazy", || {
            BUILT.fetch_add(1, Ordering::SeqCst);
            Static("")
        });

        assert_eq!(BUILT.load(Ordering::SeqCst), 0);
        resolver.resolve("lazy").unwrap();
        resolver.resolve("lazy").unwrap();
        assert_eq!(BUILT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_unknown_is_not_found() {
        let resolver = ComponentResolver::new();
        let err = resolver.resolve("nope").unwrap_err();
        assert!(matches!(err, RenderError::ComponentNotFound { ref name } if name == "nope"));
        assert!(!resolver.is_loaded("nope"));
    }

    #[test]
    fn test_invalidate_gives_new_handle() {
        let mut resolver = ComponentResolver::new();
        resolver.register("greeting", || Static(""));

        let a = resolver.resolve("greeting").unwrap();
        assert!(resolver.invalidate("greeting"));
        assert!(!resolver.invalidate("greeting"));
        let b = resolver.resolve("greeting").unwrap();
        assert!(!ResolvedComponent::ptr_eq(&a, &b));
    }

    #[test]
    fn test_clear() {
        let mut resolver = ComponentResolver::new();
        resolver.register("a", || Static(""));
        resolver.resolve("a").unwrap();
        resolver.clear();
        assert!(!resolver.is_loaded("a"));
    }

    // =========================================================================
    // Search path tests
    // =========================================================================

    #[test]
    fn test_resolve_template_from_search_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "forms/input/forms_input.html.jinja", "<input>");

        let mut resolver = ComponentResolver::new();
        resolver.add_search_path(dir.path());
        let resolved = resolver.resolve("forms/input").unwrap();
        assert_eq!(
            resolved.source(),
            &ComponentSource::Template(dir.path().join("forms/input/forms_input.html.jinja"))
        );
    }

    #[test]
    fn test_extension_priority() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "button/button.html", "<b>html</b>");
        write(dir.path(), "button/button.jinja", "<b>jinja</b>");

        let mut resolver = ComponentResolver::new();
        resolver.add_search_path(dir.path());
        let resolved = resolver.resolve("button").unwrap();
        assert_eq!(
            resolved.source(),
            &ComponentSource::Template(dir.path().join("button/button.jinja"))
        );
    }

    #[test]
    fn test_first_search_path_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write(first.path(), "card/card.jinja", "first");
        write(second.path(), "card/card.jinja", "second");

        let mut resolver = ComponentResolver::new();
        resolver.add_search_path(first.path());
        resolver.add_search_path(second.path());
        let resolved = resolver.resolve("card").unwrap();
        assert_eq!(
            resolved.source(),
            &ComponentSource::Template(first.path().join("card/card.jinja"))
        );
    }

    #[test]
    fn test_registered_shadows_template() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "card/card.jinja", "template");

        let mut resolver = ComponentResolver::new();
        resolver.add_search_path(dir.path());
        resolver.register("card", || Static("registered"));
        let resolved = resolver.resolve("card").unwrap();
        assert_eq!(resolved.source(), &ComponentSource::Registered);
    }

    #[test]
    fn test_wrong_stem_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "forms/input/input.jinja", "<input>");

        let mut resolver = ComponentResolver::new();
        resolver.add_search_path(dir.path());
        assert!(matches!(
            resolver.resolve("forms/input"),
            Err(RenderError::ComponentNotFound { .. })
        ));
    }

    #[test]
    fn test_failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = ComponentResolver::new();
        resolver.add_search_path(dir.path());

        assert!(resolver.resolve("late").is_err());
        write(dir.path(), "late/late.jinja", "now here");
        assert!(resolver.resolve("late").is_ok());
    }

    #[test]
    fn test_names() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "button/button.jinja", "");
        write(dir.path(), "forms/input/forms_input.html.jinja", "");
        write(dir.path(), "forms/input/forms_input.properties.yaml", "[]");
        write(dir.path(), "forms/input/partial.jinja", "");
        write(dir.path(), "README.md", "");

        let mut resolver = ComponentResolver::new();
        resolver.add_search_path(dir.path());
        resolver.register("alert", || Static(""));
        resolver.register("button", || Static(""));

        assert_eq!(resolver.names(), vec!["alert", "button", "forms/input"]);
    }
}
