//! Error types for component rendering.
//!
//! This module provides [`RenderError`], the error type for every operation in
//! the crate. It abstracts over the template engine's and serializers' errors so
//! callers only match on one enum.

use thiserror::Error;

/// Error type for component resolution and rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No registered factory or template file matches the component name.
    #[error("component not found: {name}")]
    ComponentNotFound { name: String },

    /// The component name is empty or contains empty, `.` or `..` segments.
    #[error("invalid component name: {0:?}")]
    InvalidComponentName(String),

    /// Locals, options or a property schema could not be (de)serialized.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Template syntax error or failure inside a template component.
    #[error("template error: {0}")]
    TemplateError(String),

    /// A tab set was built from zero tabs.
    #[error("a tab set needs at least one tab")]
    EmptyTabSet,

    /// I/O error (e.g., reading a component template from disk).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("config error: {0}")]
    ConfigError(String),

    /// Failure raised by a component implementation, passed through as is.
    #[error(transparent)]
    Component(Box<dyn std::error::Error + Send + Sync>),
}

impl RenderError {
    /// Wraps an implementation-level error.
    pub fn component<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        RenderError::Component(err.into())
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for RenderError {
    fn from(err: serde_yaml::Error) -> Self {
        RenderError::SerializationError(err.to_string())
    }
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        // Resolution failures inside a nested `component(...)` call surface as such
        if let Some(name) = missing_component(&err) {
            return RenderError::ComponentNotFound { name };
        }

        match err.kind() {
            ErrorKind::BadSerialization => RenderError::SerializationError(err.to_string()),
            _ => RenderError::TemplateError(format!("{:#}", err)),
        }
    }
}

fn missing_component(err: &minijinja::Error) -> Option<String> {
    let mut source = std::error::Error::source(err);
    while let Some(current) = source {
        if let Some(RenderError::ComponentNotFound { name }) = current.downcast_ref::<RenderError>() {
            return Some(name.clone());
        }
        source = current.source();
    }
    None
}

/// Converts back into a minijinja error when raised inside a template function.
impl From<RenderError> for minijinja::Error {
    fn from(err: RenderError) -> Self {
        use minijinja::ErrorKind;

        let kind = match &err {
            RenderError::SerializationError(_) => ErrorKind::BadSerialization,
            _ => ErrorKind::InvalidOperation,
        };
        minijinja::Error::new(kind, err.to_string()).with_source(err)
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
