//! Document-wide selector matching with a per-pass result cache.
use core::cell::RefCell;
use css_selectors::{
    ComplexSelector, ElementAdapter, SelectorError, matches_complex, parse_complex_selector,
};
use html::{Document, NodeId};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Exposes a [`Document`] to the selector engine.
#[derive(Clone, Copy, Debug)]
pub struct DocumentAdapter<'doc>(pub &'doc Document);

impl ElementAdapter for DocumentAdapter<'_> {
    type Handle = NodeId;

    #[inline]
    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.0.parent_element(element)
    }

    #[inline]
    fn previous_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.0.previous_sibling_element(element)
    }

    #[inline]
    fn next_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.0.next_sibling_element(element)
    }

    #[inline]
    fn tag_name(&self, element: NodeId) -> &str {
        self.0.tag_name(element).unwrap_or_default()
    }

    #[inline]
    fn element_id(&self, element: NodeId) -> Option<&str> {
        self.0.attr(element, "id")
    }

    fn has_class(&self, element: NodeId, class: &str) -> bool {
        self.0
            .attr(element, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|name| name == class))
    }

    #[inline]
    fn attr(&self, element: NodeId, name: &str) -> Option<&str> {
        self.0.attr(element, name)
    }

    #[inline]
    fn is_empty(&self, element: NodeId) -> bool {
        self.0.has_no_children(element)
    }
}

/// A parsed selector and the elements it matches, in document order.
#[derive(Debug)]
pub struct Selection {
    pub selector: ComplexSelector,
    pub elements: Vec<NodeId>,
}

/// Selector matching service for one document.
///
/// Results are memoised per selector text; the document must not change
/// while a `Select` is alive.
#[derive(Debug)]
pub struct Select<'doc> {
    document: &'doc Document,
    ignored: HashSet<String>,
    cache: RefCell<HashMap<String, Rc<Selection>>>,
}

impl<'doc> Select<'doc> {
    /// Matcher over `document`. Pseudo-classes and pseudo-elements named in
    /// `ignored` always match.
    pub fn new(document: &'doc Document, ignored: HashSet<String>) -> Self {
        Self {
            document,
            ignored,
            cache: RefCell::new(HashMap::new()),
        }
    }

    #[inline]
    pub const fn document(&self) -> &'doc Document {
        self.document
    }

    #[inline]
    pub const fn adapter(&self) -> DocumentAdapter<'doc> {
        DocumentAdapter(self.document)
    }

    /// Parse one selector clause.
    ///
    /// # Errors
    /// Returns a [`SelectorError`] when the text is malformed or uses
    /// syntax the matcher does not implement.
    #[inline]
    pub fn parse(&self, text: &str) -> Result<ComplexSelector, SelectorError> {
        parse_complex_selector(text, &self.ignored)
    }

    /// Every element matching `selector`, in document order.
    pub fn query(&self, selector: &ComplexSelector) -> Vec<NodeId> {
        let adapter = self.adapter();
        self.document
            .elements()
            .filter(|element| matches_complex(&adapter, *element, selector))
            .collect()
    }

    /// Parse and match `text`, reusing earlier results for the same text.
    ///
    /// # Errors
    /// Returns a [`SelectorError`] when the text cannot be parsed.
    pub fn select(&self, text: &str) -> Result<Rc<Selection>, SelectorError> {
        let key = text.trim();
        if let Some(hit) = self.cache.borrow().get(key) {
            return Ok(Rc::clone(hit));
        }
        let selector = self.parse(key)?;
        let elements = self.query(&selector);
        let selection = Rc::new(Selection { selector, elements });
        self.cache
            .borrow_mut()
            .insert(key.to_owned(), Rc::clone(&selection));
        Ok(selection)
    }
}
