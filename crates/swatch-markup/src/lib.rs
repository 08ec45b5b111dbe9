//! Escaped HTML fragments for component rendering.
//!
//! This crate provides the small set of markup primitives the component
//! renderer is built on: a [`Markup`] fragment type that is known to be safe
//! to embed, HTML escaping, a [`Tag`] builder, and block capture via
//! [`Buffer`] and [`capture`].
//!
//! # The Fragment Invariant
//!
//! A [`Markup`] value holds output that has already been escaped (or was
//! produced by trusted code). Embedding one fragment into another never
//! escapes it again. Plain strings only enter a fragment through
//! [`Markup::text`] / [`escape`], which escape them.
//!
//! # Example
//!
//! ```rust
//! use swatch_markup::{capture, escape, Markup, Tag};
//!
//! let name = "<Ada>";
//! let greeting = Tag::new("p").wrap(concat_greeting(name));
//! assert_eq!(greeting.as_str(), "<p>Hello, &lt;Ada&gt;</p>");
//!
//! // Nested fragments are embedded verbatim
//! let card = Tag::new("div").class("card").wrap(greeting);
//! assert_eq!(card.as_str(), r#"<div class="card"><p>Hello, &lt;Ada&gt;</p></div>"#);
//!
//! // Block capture collects writes into a fragment
//! let captured = capture(|buf| {
//!     buf.push_text("a < b");
//!     buf.push(&Markup::raw("<br>"));
//!     Ok::<(), std::convert::Infallible>(())
//! })
//! .unwrap();
//! assert_eq!(captured.as_str(), "a &lt; b<br>");
//!
//! fn concat_greeting(name: &str) -> Markup {
//!     swatch_markup::concat([Markup::raw("Hello, "), escape(name)])
//! }
//! ```
//!
//! # Escaping Rules
//!
//! Text content escapes `&`, `<` and `>`. Attribute values additionally
//! escape `"` and `'`. Quotes in text content are left alone so code samples
//! read naturally.

use std::fmt;

/// A fragment of markup that is safe to embed.
///
/// Fragments compose by concatenation; the contents are never re-escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Markup(String);

impl Markup {
    /// Creates an empty fragment.
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Wraps trusted, already-escaped markup without touching it.
    pub fn raw(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// Builds a fragment from plain text, escaping it.
    pub fn text(text: &str) -> Self {
        Self(escape_text(text))
    }

    /// Returns the markup as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the fragment, returning the markup string.
    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Appends another fragment verbatim.
    pub fn push(&mut self, other: &Markup) {
        self.0.push_str(&other.0);
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Markup> for String {
    fn from(markup: Markup) -> Self {
        markup.0
    }
}

impl AsRef<str> for Markup {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromIterator<Markup> for Markup {
    fn from_iter<I: IntoIterator<Item = Markup>>(iter: I) -> Self {
        let mut out = Markup::new();
        out.extend(iter);
        out
    }
}

impl Extend<Markup> for Markup {
    fn extend<I: IntoIterator<Item = Markup>>(&mut self, iter: I) {
        for fragment in iter {
            self.0.push_str(&fragment.0);
        }
    }
}

impl std::ops::Add for Markup {
    type Output = Markup;

    fn add(mut self, rhs: Markup) -> Markup {
        self.0.push_str(&rhs.0);
        self
    }
}

/// Escapes plain text into a fragment.
pub fn escape(text: &str) -> Markup {
    Markup::text(text)
}

/// Joins fragments in order, without escaping.
pub fn concat<I: IntoIterator<Item = Markup>>(fragments: I) -> Markup {
    fragments.into_iter().collect()
}

/// Escapes text content (`&`, `<`, `>`).
pub fn escape_text(text: &str) -> String {
    escape_with(text, false)
}

/// Escapes an attribute value (`&`, `<`, `>`, `"`, `'`).
pub fn escape_attr(text: &str) -> String {
    escape_with(text, true)
}

fn escape_with(text: &str, quotes: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            '\'' if quotes => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Output sink used while capturing a block.
///
/// Writes go to an internal string; [`capture`] turns the result into a
/// [`Markup`] fragment instead of emitting it anywhere.
#[derive(Debug, Default)]
pub struct Buffer {
    out: String,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a fragment verbatim.
    pub fn push(&mut self, markup: &Markup) {
        self.out.push_str(markup.as_str());
    }

    /// Writes plain text, escaping it.
    pub fn push_text(&mut self, text: &str) {
        self.out.push_str(&escape_text(text));
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Finishes the buffer as a fragment.
    pub fn into_markup(self) -> Markup {
        Markup(self.out)
    }
}

/// Runs `block` against a fresh [`Buffer`] and returns what it wrote.
///
/// An error from the block aborts the capture; partial output is dropped.
pub fn capture<E, F>(block: F) -> Result<Markup, E>
where
    F: FnOnce(&mut Buffer) -> Result<(), E>,
{
    let mut buffer = Buffer::new();
    block(&mut buffer)?;
    Ok(buffer.into_markup())
}

/// Builder for a single HTML element.
///
/// Attributes render in insertion order. Repeated [`class`](Tag::class)
/// calls accumulate into one `class` attribute; empty class names are
/// ignored.
#[derive(Debug, Clone)]
pub struct Tag {
    name: String,
    attrs: Vec<(String, String)>,
}

impl Tag {
    /// Starts an element with the given tag name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(is_valid_name(&name), "invalid tag name: {name:?}");
        Self {
            name,
            attrs: Vec::new(),
        }
    }

    /// Sets an attribute. Setting `class` appends to the existing classes;
    /// any other existing attribute is replaced.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        debug_assert!(is_valid_name(&name), "invalid attribute name: {name:?}");

        if name == "class" {
            return self.class(value);
        }
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(existing) => existing.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Appends a class name.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        let class = class.trim();
        if class.is_empty() {
            return self;
        }
        match self.attrs.iter_mut().find(|(k, _)| k == "class") {
            Some((_, existing)) => {
                existing.push(' ');
                existing.push_str(class);
            }
            None => self.attrs.push(("class".to_string(), class.to_string())),
        }
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Closes the element around a fragment.
    pub fn wrap(&self, content: Markup) -> Markup {
        let mut out = self.open();
        out.push_str(content.as_str());
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
        Markup(out)
    }

    /// Closes the element around escaped text.
    pub fn text(&self, text: &str) -> Markup {
        self.wrap(Markup::text(text))
    }

    /// Renders an element with no content.
    pub fn empty(&self) -> Markup {
        self.wrap(Markup::new())
    }

    /// Captures `block` as the element's content.
    pub fn build_with<E, F>(&self, block: F) -> Result<Markup, E>
    where
        F: FnOnce(&mut Buffer) -> Result<(), E>,
    {
        Ok(self.wrap(capture(block)?))
    }

    fn open(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 2);
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        out.push('>');
        out
    }
}

/// Shorthand for building an element from an attribute list.
pub fn tag(name: &str, attrs: &[(&str, &str)], content: Markup) -> Markup {
    attrs
        .iter()
        .fold(Tag::new(name), |tag, (k, v)| tag.attr(*k, *v))
        .wrap(content)
}

/// True for names usable as tag or attribute names: an ASCII letter
/// followed by letters, digits, `-`, `_` or `:`.
pub fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn unescape(s: &str) -> String {
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&")
    }

    proptest! {
        #[test]
        fn escaped_text_has_no_angle_brackets(s in ".*") {
            let escaped = escape_text(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
        }

        #[test]
        fn escaped_attr_has_no_quotes(s in ".*") {
            let escaped = escape_attr(&s);
            prop_assert!(!escaped.contains('"'));
            prop_assert!(!escaped.contains('\''));
        }

        #[test]
        fn escaping_is_reversible(s in ".*") {
            prop_assert_eq!(unescape(&escape_attr(&s)), s.clone());
            prop_assert_eq!(unescape(&escape_text(&s)), s);
        }

        #[test]
        fn wrap_embeds_content_verbatim(s in "[a-z<>&]{0,20}") {
            let inner = Markup::raw(s.clone());
            let wrapped = Tag::new("div").wrap(inner);
            prop_assert_eq!(wrapped.into_string(), format!("<div>{}</div>", s));
        }
    }
}
