//! Documentation mode.
//!
//! Documentation output shows a component next to how it was invoked:
//!
//! - [`DocumentationComposer`]: code-preview blocks for the invocation source,
//!   the rendered markup, and the declared property schema
//! - [`TabsComposer`]: switchable tabs over a [`TabSet`]
//! - [`pretty`]: the key/value formatting used in the source preview
//!
//! ## Generated Markup
//!
//! With the default `component` class prefix:
//!
//! ```html
//! <pre class="component-code"><code class="jinja">component "greeting", name: "Ada"</code></pre>
//!
//! <div class="component-tabs">
//!   <ul class="component-tabs__nav">
//!     <li class="active"><a href="#tab-g1-0">source</a></li>
//!     <li><a href="#tab-g1-1">markup</a></li>
//!   </ul>
//!   <div class="component-tabs__content">
//!     <div id="tab-g1-0" class="component-tabs__pane active">...</div>
//!     <div id="tab-g1-1" class="component-tabs__pane">...</div>
//!   </div>
//! </div>
//! ```
//!
//! (Shown indented; the real output has no whitespace between elements.)

pub mod pretty;
mod preview;
mod tabs;

pub use preview::DocumentationComposer;
pub use tabs::{tab_anchor, Tab, TabSet, TabsComposer};
