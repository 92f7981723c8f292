//! The resource container a document and its stylesheets live in.

use crate::types::Parsed;
use core::cell::RefCell;
use css_style_attr::parse_style_attribute;
use css_syntax::{Declaration, Stylesheet, parse_stylesheet};
use html::Document;
use log::error;
use std::borrow::Cow;
use std::collections::HashMap;
use url::Url;

/// Access to named resources and the error log of a document collection.
pub trait Container {
    /// The parsed resource called `name`, if it is a stylesheet or a document.
    fn parsed(&self, name: &str) -> Option<Parsed<'_>>;

    /// Whether any resource is called `name`.
    fn has_name(&self, name: &str) -> bool;

    /// Resolve `href` relative to the resource `referrer`. Absolute URLs name
    /// nothing inside the container.
    fn href_to_name(&self, href: &str, referrer: &str) -> Option<String> {
        href_to_name(href, referrer)
    }

    /// Parse stylesheet text found inside `sheet_name`.
    fn parse_css(&self, text: &str, _sheet_name: &str) -> Stylesheet {
        parse_stylesheet(text)
    }

    /// Parse the text of a `style` attribute.
    fn parse_declarations(&self, text: &str) -> Vec<Declaration> {
        parse_style_attribute(text)
    }

    /// Report a recoverable problem.
    fn log_error(&self, message: &str);
}

/// Map an `href` found in `referrer` to a container name: resolve it against
/// the referrer, drop query and fragment, and percent-decode the path.
pub fn href_to_name(href: &str, referrer: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || Url::parse(href).is_ok() {
        return None;
    }
    let root = Url::parse("file:///").ok()?;
    let mut target = root.join(referrer).ok()?.join(href).ok()?;
    target.set_query(None);
    target.set_fragment(None);
    let path = target.path().trim_start_matches('/');
    if path.is_empty() {
        return None;
    }
    urlencoding::decode(path).ok().map(Cow::into_owned)
}

#[derive(Debug)]
enum Resource {
    Stylesheet(Stylesheet),
    Document(Document),
    /// Anything else, such as images or fonts.
    Other,
}

/// A container holding every resource in memory.
#[derive(Debug, Default)]
pub struct MemoryContainer {
    resources: HashMap<String, Resource>,
    errors: RefCell<Vec<String>>,
}

impl MemoryContainer {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and store a stylesheet.
    pub fn add_stylesheet(&mut self, name: &str, css: &str) {
        let sheet = self.parse_css(css, name);
        self.resources
            .insert(name.to_owned(), Resource::Stylesheet(sheet));
    }

    pub fn add_document(&mut self, name: &str, document: Document) {
        self.resources
            .insert(name.to_owned(), Resource::Document(document));
    }

    /// Store a resource that is neither a stylesheet nor a document.
    pub fn add_other(&mut self, name: &str) {
        self.resources.insert(name.to_owned(), Resource::Other);
    }

    /// Every message passed to [`Container::log_error`] so far.
    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }
}

impl Container for MemoryContainer {
    fn parsed(&self, name: &str) -> Option<Parsed<'_>> {
        match self.resources.get(name)? {
            Resource::Stylesheet(sheet) => Some(Parsed::Stylesheet(sheet)),
            Resource::Document(document) => Some(Parsed::Document(document)),
            Resource::Other => None,
        }
    }

    #[inline]
    fn has_name(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    fn log_error(&self, message: &str) {
        error!("{message}");
        self.errors.borrow_mut().push(message.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Relative hrefs resolve against the referrer's directory.
    #[test]
    fn resolves_relative_hrefs() {
        assert_eq!(
            href_to_name("../styles/main.css", "text/chapter1.html").as_deref(),
            Some("styles/main.css")
        );
        assert_eq!(href_to_name("b.css?v=2#x", "css/a.css").as_deref(), Some("css/b.css"));
        assert_eq!(href_to_name("/root.css", "a/b/c.html").as_deref(), Some("root.css"));
        assert_eq!(href_to_name("my%20sheet.css", "index.html").as_deref(), Some("my sheet.css"));
    }

    /// Absolute URLs and empty hrefs name nothing.
    #[test]
    fn rejects_absolute_and_empty_hrefs() {
        assert_eq!(href_to_name("http://example.com/a.css", "index.html"), None);
        assert_eq!(href_to_name("  ", "index.html"), None);
    }

    /// Only stylesheets and documents are handed out as parsed resources.
    #[test]
    fn hands_out_parsed_resources() {
        let mut container = MemoryContainer::new();
        container.add_stylesheet("a.css", "p { color: red }");
        container.add_document("index.html", Document::new());
        container.add_other("cover.jpg");

        assert!(matches!(container.parsed("a.css"), Some(Parsed::Stylesheet(sheet)) if sheet.rules.len() == 1));
        assert!(matches!(container.parsed("index.html"), Some(Parsed::Document(_))));
        assert!(container.parsed("cover.jpg").is_none());
        assert!(container.has_name("cover.jpg"));
        assert!(!container.has_name("missing.css"));

        container.log_error("first");
        assert_eq!(container.errors(), ["first"]);
    }
}
