//! Rendering components by name, on their own or with documentation.
//!
//! - [`ComponentRenderer`]: resolve-and-render over a [`ComponentResolver`](crate::ComponentResolver)
//! - [`ComponentLibrary`]: the shared, configured entry point hosts use
//! - [`functions`]: the MiniJinja functions and filter bound to a library

pub mod functions;
mod library;
mod renderer;

pub use library::{ComponentLibrary, ComponentLibraryBuilder};
pub use renderer::ComponentRenderer;
