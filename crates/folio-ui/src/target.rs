//! Render targets for the browser.

use folio_page::{RenderTarget, TargetError, dom};
use folio_render::html::escape_html;
use leptos::prelude::*;

/// A single container whose markup lives in a signal.
///
/// Components bind the signal to `inner_html`, so the page controller renders
/// into the view without touching the DOM.
#[derive(Debug, Clone)]
pub struct SignalTarget {
    selector: String,
    html: RwSignal<String>,
}

impl SignalTarget {
    pub fn new(selector: impl Into<String>, html: RwSignal<String>) -> Self {
        Self {
            selector: selector.into(),
            html,
        }
    }

    fn check(&self, selector: &str) -> dom::Result<()> {
        if selector == self.selector {
            Ok(())
        } else {
            Err(TargetError::NotFound(selector.to_string()))
        }
    }
}

impl RenderTarget for SignalTarget {
    fn tag_name(&self, selector: &str) -> Option<String> {
        self.check(selector).ok().map(|()| "div".to_string())
    }

    fn replace_inner_html(&mut self, selector: &str, html: &str) -> dom::Result<()> {
        self.check(selector)?;
        self.html.set(html.to_string());
        Ok(())
    }

    fn set_text(&mut self, selector: &str, text: &str) -> dom::Result<()> {
        self.check(selector)?;
        self.html.set(escape_html(text));
        Ok(())
    }

    fn set_attribute(&mut self, selector: &str, _name: &str, _value: &str) -> dom::Result<()> {
        self.check(selector)
    }
}

/// The live document, addressed with `querySelector`.
pub struct DomTarget {
    document: web_sys::Document,
}

impl DomTarget {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// Target for the current page's document.
    pub fn current() -> Self {
        Self::new(document())
    }

    fn element(&self, selector: &str) -> dom::Result<web_sys::Element> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .ok_or_else(|| TargetError::NotFound(selector.to_string()))
    }
}

impl RenderTarget for DomTarget {
    fn tag_name(&self, selector: &str) -> Option<String> {
        self.element(selector)
            .ok()
            .map(|e| e.tag_name().to_ascii_lowercase())
    }

    fn replace_inner_html(&mut self, selector: &str, html: &str) -> dom::Result<()> {
        self.element(selector)?.set_inner_html(html);
        Ok(())
    }

    fn set_text(&mut self, selector: &str, text: &str) -> dom::Result<()> {
        self.element(selector)?.set_text_content(Some(text));
        Ok(())
    }

    fn set_attribute(&mut self, selector: &str, name: &str, value: &str) -> dom::Result<()> {
        let element = self.element(selector)?;
        element
            .set_attribute(name, value)
            .map_err(|_| TargetError::NotFound(selector.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_target_writes_its_own_selector_only() {
        let html = RwSignal::new(String::new());
        let mut target = SignalTarget::new("#articles-grid", html);

        target
            .replace_inner_html("#articles-grid", "<article>x</article>")
            .unwrap();
        assert_eq!(html.get_untracked(), "<article>x</article>");

        target.set_text("#articles-grid", "a < b").unwrap();
        assert_eq!(html.get_untracked(), "a &lt; b");

        assert_eq!(target.tag_name("#articles-grid").as_deref(), Some("div"));
        assert!(target.tag_name("#other").is_none());
        assert_eq!(
            target.replace_inner_html("#other", ""),
            Err(TargetError::NotFound("#other".to_string()))
        );
        assert_eq!(html.get_untracked(), "a &lt; b");
    }
}
