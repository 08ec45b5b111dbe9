//! Library configuration.
//!
//! [`SwatchConfig`] holds the search path for template components and the
//! names used in the generated documentation markup. Every field has a
//! default, so a config file only lists what it changes:
//!
//! ```yaml
//! search_paths:
//!   - app/components
//! class_prefix: styleguide
//! source_label: jinja
//! ```
//!
//! With `class_prefix: styleguide` the code blocks carry `styleguide-code` and
//! the tab wrapper `styleguide-tabs`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Configuration for a [`ComponentLibrary`](crate::ComponentLibrary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwatchConfig {
    /// Directories searched, in order, for template components.
    pub search_paths: Vec<PathBuf>,

    /// Prefix for generated class names (`<prefix>-code`, `<prefix>-tabs`, ...).
    pub class_prefix: String,

    /// Label of the tab showing the invocation source.
    pub source_label: String,

    /// Label of the tab showing the rendered markup.
    pub markup_label: String,

    /// Class on the `<code>` element of the source preview.
    pub source_language: String,

    /// Class on the `<code>` element of the markup preview.
    pub markup_language: String,

    /// How deeply template components may nest `component(...)` calls
    /// before rendering fails.
    pub max_nesting_depth: usize,
}

impl Default for SwatchConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            class_prefix: "component".to_string(),
            source_label: "source".to_string(),
            markup_label: "markup".to_string(),
            source_language: "jinja".to_string(),
            markup_language: "html".to_string(),
            max_nesting_depth: 32,
        }
    }
}

impl SwatchConfig {
    /// Parses a YAML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::SerializationError`] for malformed YAML or
    /// unknown keys, and [`RenderError::ConfigError`] for invalid values.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: SwatchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a YAML configuration file.
    ///
    /// Relative search paths are resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;

        if let Some(base) = path.parent() {
            for dir in &mut config.search_paths {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        Ok(config)
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.class_prefix;
        if prefix.is_empty()
            || !prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(RenderError::ConfigError(format!(
                "class_prefix must be a non-empty CSS identifier, got {:?}",
                prefix
            )));
        }
        for (field, label) in [
            ("source_label", &self.source_label),
            ("markup_label", &self.markup_label),
        ] {
            if label.trim().is_empty() {
                return Err(RenderError::ConfigError(format!("{} must not be empty", field)));
            }
        }
        if self.max_nesting_depth == 0 {
            return Err(RenderError::ConfigError(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `<prefix>-<suffix>`, the naming rule for every generated class.
    pub(crate) fn class(&self, suffix: &str) -> String {
        format!("{}-{}", self.class_prefix, suffix)
    }
}
