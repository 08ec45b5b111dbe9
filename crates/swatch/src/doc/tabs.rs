//! Switchable tab blocks.
//!
//! A [`TabSet`] holds at least one [`Tab`], exactly one of them active.
//! [`TabsComposer`] turns it into a nav list of anchors plus one pane per
//! tab, under classes derived from the configured prefix.

use swatch_markup::{is_valid_name, Markup, Tag};
use tracing::warn;

use crate::config::SwatchConfig;
use crate::error::{RenderError, Result};

/// A labeled content fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub label: String,
    pub content: Markup,
}

impl Tab {
    pub fn new(label: impl Into<String>, content: Markup) -> Self {
        Self {
            label: label.into(),
            content,
        }
    }
}

/// An ordered, non-empty set of tabs with exactly one active tab.
///
/// The first tab is active unless [`set_active`](Self::set_active) picks
/// another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSet {
    tabs: Vec<Tab>,
    active: usize,
}

impl TabSet {
    /// # Errors
    ///
    /// Returns [`RenderError::EmptyTabSet`] if `tabs` is empty.
    pub fn new(tabs: impl IntoIterator<Item = Tab>) -> Result<Self> {
        let tabs: Vec<Tab> = tabs.into_iter().collect();
        if tabs.is_empty() {
            return Err(RenderError::EmptyTabSet);
        }
        Ok(Self { tabs, active: 0 })
    }

    /// Builds a set from `(label, content)` pairs in order.
    pub fn from_pairs<L: Into<String>>(pairs: impl IntoIterator<Item = (L, Markup)>) -> Result<Self> {
        Self::new(pairs.into_iter().map(|(label, content)| Tab::new(label, content)))
    }

    /// Makes the tab at `index` the active one. Returns `false` (and changes
    /// nothing) when `index` is out of range.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        self.active = index;
        true
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// A tab set is never empty; [`TabSet::new`] rejects zero tabs.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }
}

/// Anchor target of the tab at `index` within tab block `id`.
pub fn tab_anchor(id: &str, index: usize) -> String {
    format!("tab-{}-{}", id, index)
}

/// Renders a [`TabSet`] as a navigation list plus content panes.
///
/// `id` must be unique on the page; anchors of two blocks sharing an id
/// collide.
#[derive(Debug, Clone, Copy)]
pub struct TabsComposer<'a> {
    config: &'a SwatchConfig,
}

impl<'a> TabsComposer<'a> {
    pub fn new(config: &'a SwatchConfig) -> Self {
        Self { config }
    }

    pub fn compose(&self, id: &str, tabs: &TabSet) -> Markup {
        self.compose_with_attrs(id, tabs, &[])
    }

    /// Like [`compose`](Self::compose), adding `attrs` to the wrapper element.
    ///
    /// A `class` entry is appended to the wrapper's own class; attributes
    /// with invalid names are skipped.
    pub fn compose_with_attrs(&self, id: &str, tabs: &TabSet, attrs: &[(String, String)]) -> Markup {
        let mut nav = Markup::new();
        let mut panes = Markup::new();

        // Nav entries and panes come from one pass so their indices always agree
        for (index, tab) in tabs.iter().enumerate() {
            let anchor = tab_anchor(id, index);
            let active = if index == tabs.active() { "active" } else { "" };

            let link = Tag::new("a")
                .attr("href", format!("#{}", anchor))
                .text(&tab.label);
            nav.push(&Tag::new("li").class(active).wrap(link));

            let pane = Tag::new("div")
                .id(anchor)
                .class(self.config.class("tabs__pane"))
                .class(active);
            panes.push(&pane.wrap(tab.content.clone()));
        }

        let nav = Tag::new("ul").class(self.config.class("tabs__nav")).wrap(nav);
        let panes = Tag::new("div")
            .class(self.config.class("tabs__content"))
            .wrap(panes);

        let wrapper = attrs
            .iter()
            .filter(|(name, _)| {
                let valid = is_valid_name(name);
                if !valid {
                    warn!(attribute = %name, "skipping invalid tabs attribute");
                }
                valid
            })
            .fold(Tag::new("div").class(self.config.class("tabs")), |tag, (name, value)| {
                tag.attr(name.as_str(), value.as_str())
            });
        wrapper.wrap(nav + panes)
    }
}
