//! Render targets.
//!
//! Page code never touches a document directly; it writes through [`RenderTarget`].
//! Selectors are opaque strings resolved by the target.

use std::collections::BTreeMap;

use folio_render::html::escape_html;
use thiserror::Error;

/// Render target errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    /// No element matches the selector.
    #[error("no element matches selector '{0}'")]
    NotFound(String),
}

/// Result type for render target operations.
pub type Result<T> = std::result::Result<T, TargetError>;

/// Somewhere HTML can be written, addressed by selector.
pub trait RenderTarget {
    /// Lowercase tag name of the element matching `selector`, if any.
    fn tag_name(&self, selector: &str) -> Option<String>;

    /// Replace the element's children with `html`.
    fn replace_inner_html(&mut self, selector: &str, html: &str) -> Result<()>;

    /// Replace the element's children with a single text node.
    fn set_text(&mut self, selector: &str, text: &str) -> Result<()>;

    /// Set an attribute on the element.
    fn set_attribute(&mut self, selector: &str, name: &str, value: &str) -> Result<()>;
}

/// An element of a [`MemoryDocument`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryElement {
    pub tag: String,
    pub inner_html: String,
    pub attributes: BTreeMap<String, String>,
}

/// In-memory document keyed by selector.
///
/// Used by the CLI to render fragments without a browser, and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    elements: BTreeMap<String, MemoryElement>,
    writes: usize,
}

impl MemoryDocument {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element reachable by `selector`.
    #[must_use]
    pub fn with_element(mut self, selector: &str, tag: &str) -> Self {
        self.insert(selector, tag);
        self
    }

    /// Add (or reset) an element reachable by `selector`.
    pub fn insert(&mut self, selector: &str, tag: &str) {
        self.elements.insert(
            selector.to_string(),
            MemoryElement {
                tag: tag.to_ascii_lowercase(),
                ..MemoryElement::default()
            },
        );
    }

    /// The element for a selector.
    pub fn element(&self, selector: &str) -> Option<&MemoryElement> {
        self.elements.get(selector)
    }

    /// Every element with its selector, in selector order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &MemoryElement)> {
        self.elements.iter().map(|(selector, e)| (selector.as_str(), e))
    }

    /// Inner HTML of the element for a selector.
    pub fn inner_html(&self, selector: &str) -> Option<&str> {
        self.element(selector).map(|e| e.inner_html.as_str())
    }

    /// An attribute of the element for a selector.
    pub fn attribute(&self, selector: &str, name: &str) -> Option<&str> {
        self.element(selector)
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn element_mut(&mut self, selector: &str) -> Result<&mut MemoryElement> {
        self.elements
            .get_mut(selector)
            .ok_or_else(|| TargetError::NotFound(selector.to_string()))
    }
}

impl RenderTarget for MemoryDocument {
    fn tag_name(&self, selector: &str) -> Option<String> {
        self.element(selector).map(|e| e.tag.clone())
    }

    fn replace_inner_html(&mut self, selector: &str, html: &str) -> Result<()> {
        self.element_mut(selector)?.inner_html = html.to_string();
        self.writes += 1;
        Ok(())
    }

    fn set_text(&mut self, selector: &str, text: &str) -> Result<()> {
        self.element_mut(selector)?.inner_html = escape_html(text);
        self.writes += 1;
        Ok(())
    }

    fn set_attribute(&mut self, selector: &str, name: &str, value: &str) -> Result<()> {
        self.element_mut(selector)?
            .attributes
            .insert(name.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
