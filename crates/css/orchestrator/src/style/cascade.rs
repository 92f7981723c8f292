//! CSS cascade resolution for one document.
//!
//! Collects every style rule that reaches the document (user-agent sheet,
//! `<style>` and `<link>` sheets in document order, then `style` attributes),
//! matches each selector clause against the tree and collapses the candidates
//! of every element into one value per property.

use std::rc::Rc;

use anyhow::{Result, bail};
use css_cascade::{
    CascadeCollector, DeclarationMap, PropertyValue, PseudoStyleMap, Specificity, StyleDeclaration,
    StyleMap, normalize_style_declaration, resolve_property, specificity,
};
use css_selectors::specificity_of_complex;
use css_syntax::{CssRule, RuleKind, Stylesheet};
use css_style_attr::is_blank_style_attribute;
use html::{Document, NodeId};
use log::debug;

use super::ua_stylesheet::user_agent_stylesheet;
use crate::container::Container;
use crate::rules::{RuleIndexCounter, RuleIter};
use crate::selectors::Select;
use crate::types::{CascadeOptions, Parsed};

/// The outcome of one resolution pass.
#[derive(Debug)]
pub struct ResolvedStyles<'doc> {
    /// Winning declarations per element.
    pub style_map: StyleMap<NodeId>,
    /// Winning declarations per (element, pseudo name).
    pub pseudo_style_map: PseudoStyleMap<NodeId>,
    /// The matcher used for the pass, reusable by the caller.
    pub select: Select<'doc>,
}

impl<'doc> ResolvedStyles<'doc> {
    #[inline]
    pub const fn document(&self) -> &'doc Document {
        self.select.document()
    }

    /// Declarations that won on `element` itself.
    #[inline]
    pub fn style(&self, element: NodeId) -> Option<&DeclarationMap> {
        self.style_map.get(&element)
    }

    /// Declarations that won for `pseudo` (such as `before` or `hover`) on `element`.
    pub fn pseudo_style(&self, element: NodeId, pseudo: &str) -> Option<&DeclarationMap> {
        self.pseudo_style_map
            .get(&(element, pseudo.to_ascii_lowercase()))
    }

    /// Effective value of `property_name` on `element`, with inheritance and
    /// initial values applied.
    pub fn resolve_property(&self, element: NodeId, property_name: &str) -> Option<&PropertyValue> {
        resolve_property(&self.select.adapter(), element, property_name, &self.style_map)
    }
}

/// State shared by every sheet of one pass.
struct SheetProcessor<'pass, 'doc, C: Container + ?Sized> {
    container: &'doc C,
    select: &'pass Select<'doc>,
    options: &'pass CascadeOptions,
    counter: RuleIndexCounter,
    collector: CascadeCollector<NodeId>,
}

impl<'doc, C: Container + ?Sized> SheetProcessor<'_, 'doc, C> {
    /// Feed every style rule reachable from `rules` into the collector.
    fn process_sheet(&mut self, rules: &[CssRule], sheet_name: &str) {
        let flattened = RuleIter::new(
            self.container,
            sheet_name,
            rules,
            &self.options.media,
            &self.counter,
            Some(RuleKind::Style),
        );
        for flat in flattened {
            let CssRule::Style(rule) = flat.rule else {
                continue;
            };
            let style = Rc::new(normalize_style_declaration(
                &rule.declarations,
                Some(&*flat.sheet_name),
            ));
            for text in rule.selectors() {
                let selection = match self.select.select(&text) {
                    Ok(selection) => selection,
                    Err(err) => {
                        self.container.log_error(&format!(
                            "Ignoring CSS rule with invalid selector: {text:?} ({err})"
                        ));
                        continue;
                    }
                };
                let priority = specificity(
                    flat.rule_index,
                    specificity_of_complex(&selection.selector),
                    false,
                );
                let pseudo = selection
                    .selector
                    .ignored_pseudo()
                    .map(str::to_ascii_lowercase);
                for element in &selection.elements {
                    self.collector.push(
                        *element,
                        StyleDeclaration::new(priority, Rc::clone(&style), pseudo.clone()),
                    );
                }
            }
        }
    }

    /// The stylesheet a `<link>` element brings in, with its name, if the
    /// link qualifies.
    fn linked_sheet(
        &self,
        document: &Document,
        link: NodeId,
        name: &str,
    ) -> Option<(&'doc Stylesheet, String)> {
        let mime = document
            .attr(link, "type")
            .filter(|mime| !mime.is_empty())
            .unwrap_or("text/css");
        if !self.options.is_stylesheet_type(mime) {
            debug!("Skipping <link> with type {mime:?}");
            return None;
        }
        let rel = document
            .attr(link, "rel")
            .filter(|rel| !rel.is_empty())
            .unwrap_or("stylesheet");
        if !rel.trim().eq_ignore_ascii_case("stylesheet") {
            return None;
        }
        let media = document.attr(link, "media").unwrap_or_default();
        if !self.options.media.media_ok(media) {
            debug!("Skipping <link> for media {media:?}");
            return None;
        }
        let href = document.attr(link, "href").filter(|href| !href.is_empty())?;
        let sheet_name = self.container.href_to_name(href, name)?;
        if !self.container.has_name(&sheet_name) {
            debug!("Skipping <link> to missing {sheet_name}");
            return None;
        }
        match self.container.parsed(&sheet_name)? {
            Parsed::Stylesheet(sheet) => Some((sheet, sheet_name)),
            Parsed::Document(_) => None,
        }
    }
}

/// Resolve every element's style in the document called `name`.
///
/// # Errors
/// Returns an error if `name` is not in the container or is not a document.
/// Problems inside stylesheets are reported through [`Container::log_error`]
/// and never fail the pass.
pub fn resolve_styles<'doc, C: Container + ?Sized>(
    container: &'doc C,
    name: &str,
    options: &CascadeOptions,
) -> Result<ResolvedStyles<'doc>> {
    let Some(parsed) = container.parsed(name) else {
        bail!("No parsed resource named {name:?} in the container");
    };
    let Parsed::Document(document) = parsed else {
        bail!("{name:?} is not a document");
    };
    let select = Select::new(document, options.inappropriate_pseudo_classes.clone());
    let mut processor = SheetProcessor {
        container,
        select: &select,
        options,
        counter: RuleIndexCounter::new(),
        collector: CascadeCollector::new(),
    };

    processor.process_sheet(&user_agent_stylesheet().rules, &options.user_agent_sheet_name);

    for element in document.elements() {
        match document.tag_name(element) {
            Some("style") => {
                let text = document.text_content(element);
                if text.trim().is_empty() {
                    continue;
                }
                let sheet = container.parse_css(&text, name);
                processor.process_sheet(&sheet.rules, name);
            }
            Some("link") => {
                if let Some((sheet, sheet_name)) = processor.linked_sheet(document, element, name) {
                    processor.process_sheet(&sheet.rules, &sheet_name);
                }
            }
            _ => {}
        }
    }

    for element in document.elements() {
        let Some(text) = document.attr(element, "style") else {
            continue;
        };
        if is_blank_style_attribute(text) {
            continue;
        }
        let declarations = container.parse_declarations(text);
        processor.collector.push(
            element,
            StyleDeclaration::new(
                Specificity::INLINE,
                Rc::new(normalize_style_declaration(&declarations, Some(name))),
                None,
            ),
        );
    }

    debug!(
        "Resolved {} media styles for {name}: {} styled elements",
        options.media.media_type(),
        processor.collector.element_count()
    );
    let (style_map, pseudo_style_map) = processor.collector.finish();
    Ok(ResolvedStyles {
        style_map,
        pseudo_style_map,
        select,
    })
}
