//! Flattening of nested stylesheets into one ordered rule stream.
//! Spec: <https://www.w3.org/TR/css-cascade-4/#at-import>

use crate::container::Container;
use crate::types::Parsed;
use core::cell::Cell;
use core::slice::Iter as SliceIter;
use css_cascade::RuleIndex;
use css_media_queries::MediaContext;
use css_syntax::{CssRule, ImportRule, RuleKind};
use log::trace;
use std::collections::HashSet;
use std::rc::Rc;

/// Hands out rule indices in encounter order. Shared by every sheet of one
/// resolution pass so indices are comparable across sheets.
#[derive(Debug, Default)]
pub struct RuleIndexCounter {
    next: Cell<RuleIndex>,
}

impl RuleIndexCounter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next index.
    #[inline]
    pub fn next_index(&self) -> RuleIndex {
        let index = self.next.get();
        self.next.set(index.saturating_add(1));
        index
    }
}

/// A rule emitted by [`RuleIter`].
#[derive(Clone, Debug)]
pub struct FlatRule<'sheet> {
    pub rule: &'sheet CssRule,
    /// Name of the sheet the rule was written in.
    pub sheet_name: Rc<str>,
    pub rule_index: RuleIndex,
}

/// One rule list being walked.
struct Frame<'sheet> {
    rules: SliceIter<'sheet, CssRule>,
    sheet_name: Rc<str>,
    /// Set for imported sheets; removed from the import chain when the frame is done.
    import: Option<Rc<str>>,
}

/// Depth-first walk over a sheet that expands `@import` and `@media` rules.
///
/// Import and media rules are never emitted themselves. Imports whose media
/// list fails, whose target is missing or not a stylesheet, or that would
/// re-enter a sheet already on the current import chain are skipped; the
/// last case is reported to the container.
pub struct RuleIter<'sheet, C: Container + ?Sized> {
    container: &'sheet C,
    media: &'sheet MediaContext,
    counter: &'sheet RuleIndexCounter,
    kind: Option<RuleKind>,
    importing: HashSet<Rc<str>>,
    stack: Vec<Frame<'sheet>>,
}

impl<'sheet, C: Container + ?Sized> RuleIter<'sheet, C> {
    /// Walk `rules`, which belong to the sheet `sheet_name`. With a `kind`
    /// only rules of that kind are emitted.
    pub fn new(
        container: &'sheet C,
        sheet_name: &str,
        rules: &'sheet [CssRule],
        media: &'sheet MediaContext,
        counter: &'sheet RuleIndexCounter,
        kind: Option<RuleKind>,
    ) -> Self {
        let sheet_name: Rc<str> = Rc::from(sheet_name);
        Self {
            container,
            media,
            counter,
            kind,
            importing: HashSet::from([Rc::clone(&sheet_name)]),
            stack: vec![Frame {
                rules: rules.iter(),
                sheet_name,
                import: None,
            }],
        }
    }

    /// Walk the container's stylesheet called `sheet_name`. `None` when there
    /// is no such stylesheet.
    pub fn for_name(
        container: &'sheet C,
        sheet_name: &str,
        media: &'sheet MediaContext,
        counter: &'sheet RuleIndexCounter,
        kind: Option<RuleKind>,
    ) -> Option<Self> {
        match container.parsed(sheet_name)? {
            Parsed::Stylesheet(sheet) => Some(Self::new(
                container,
                sheet_name,
                &sheet.rules,
                media,
                counter,
                kind,
            )),
            Parsed::Document(_) => None,
        }
    }

    /// Push the imported sheet's rules if the import applies.
    fn enter_import(&mut self, import: &ImportRule, sheet_name: &str) {
        if !self.media.media_ok(&import.media) {
            trace!("Skipping @import {:?} in {sheet_name}: media {:?} does not apply", import.href, import.media);
            return;
        }
        let Some(name) = self.container.href_to_name(&import.href, sheet_name) else {
            return;
        };
        if !self.container.has_name(&name) {
            return;
        }
        if self.importing.contains(name.as_str()) {
            self.container
                .log_error(&format!("Recursive import of {name} from {sheet_name}, ignoring"));
            return;
        }
        let Some(Parsed::Stylesheet(sheet)) = self.container.parsed(&name) else {
            return;
        };
        trace!("Importing {name} from {sheet_name}");
        let name: Rc<str> = Rc::from(name);
        self.importing.insert(Rc::clone(&name));
        self.stack.push(Frame {
            rules: sheet.rules.iter(),
            sheet_name: Rc::clone(&name),
            import: Some(name),
        });
    }
}

impl<'sheet, C: Container + ?Sized> Iterator for RuleIter<'sheet, C> {
    type Item = FlatRule<'sheet>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(rule) = frame.rules.next() else {
                if let Some(done) = self.stack.pop().and_then(|finished| finished.import) {
                    self.importing.remove(&done);
                }
                continue;
            };
            let sheet_name = Rc::clone(&frame.sheet_name);
            match rule {
                CssRule::Import(import) => self.enter_import(import, &sheet_name),
                CssRule::Media(media_rule) => {
                    if self.media.media_ok(&media_rule.media) {
                        self.stack.push(Frame {
                            rules: media_rule.rules.iter(),
                            sheet_name,
                            import: None,
                        });
                    } else {
                        trace!("Skipping @media {:?} in {sheet_name}", media_rule.media);
                    }
                }
                CssRule::Style(_) | CssRule::FontFace(_) | CssRule::Page(_) => {
                    if self.kind.is_none_or(|kind| kind == rule.kind()) {
                        let rule_index = self.counter.next_index();
                        trace!("Rule {rule_index} from {sheet_name}");
                        return Some(FlatRule {
                            rule,
                            sheet_name,
                            rule_index,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::MemoryContainer;
    use core::error::Error;
    use css_syntax::StyleRule;

    fn preludes<C: Container + ?Sized>(rules: RuleIter<'_, C>) -> Vec<(String, String, RuleIndex)> {
        rules
            .filter_map(|flat| match flat.rule {
                CssRule::Style(StyleRule { prelude, .. }) => {
                    Some((prelude.clone(), flat.sheet_name.to_string(), flat.rule_index))
                }
                CssRule::Import(_) | CssRule::Media(_) | CssRule::FontFace(_) | CssRule::Page(_) => None,
            })
            .collect()
    }

    fn walk(container: &MemoryContainer, name: &str, media: &MediaContext) -> Result<Vec<(String, String, RuleIndex)>, Box<dyn Error>> {
        let counter = RuleIndexCounter::new();
        let rules = RuleIter::for_name(container, name, media, &counter, Some(RuleKind::Style))
            .ok_or("not a stylesheet")?;
        Ok(preludes(rules))
    }

    /// Imports are expanded in place and indices follow encounter order.
    ///
    /// # Errors
    /// Returns an error if the root sheet is missing.
    #[test]
    fn expands_imports_depth_first() -> Result<(), Box<dyn Error>> {
        let mut container = MemoryContainer::new();
        container.add_stylesheet("css/main.css", "@import 'base.css'; a {} @media screen { b {} } c {}");
        container.add_stylesheet("css/base.css", "base {}");
        let flat = walk(&container, "css/main.css", &MediaContext::default())?;
        assert_eq!(
            flat,
            [
                ("base".to_owned(), "css/base.css".to_owned(), 0),
                ("a".to_owned(), "css/main.css".to_owned(), 1),
                ("b".to_owned(), "css/main.css".to_owned(), 2),
                ("c".to_owned(), "css/main.css".to_owned(), 3),
            ]
        );
        Ok(())
    }

    /// Media lists gate both `@media` blocks and imports.
    ///
    /// # Errors
    /// Returns an error if the root sheet is missing.
    #[test]
    fn gates_on_media() -> Result<(), Box<dyn Error>> {
        let mut container = MemoryContainer::new();
        container.add_stylesheet(
            "main.css",
            "@import url(print.css) print; @media print { p {} @import 'x.css'; } div {}",
        );
        container.add_stylesheet("print.css", "em {}");
        let screen = walk(&container, "main.css", &MediaContext::default())?;
        assert_eq!(screen, [("div".to_owned(), "main.css".to_owned(), 0)]);

        let print = walk(&container, "main.css", &MediaContext::new("print"))?;
        let names: Vec<&str> = print.iter().map(|(prelude, ..)| prelude.as_str()).collect();
        assert_eq!(names, ["em", "p", "div"]);
        Ok(())
    }

    /// A cycle is reported once and does not recurse; repeated sibling imports
    /// of the same sheet are each expanded.
    ///
    /// # Errors
    /// Returns an error if the root sheet is missing.
    #[test]
    fn breaks_import_cycles() -> Result<(), Box<dyn Error>> {
        let mut container = MemoryContainer::new();
        container.add_stylesheet("a.css", "@import 'b.css'; @import 'c.css'; @import 'c.css'; a {}");
        container.add_stylesheet("b.css", "@import 'a.css'; b {}");
        container.add_stylesheet("c.css", "c {}");
        let flat = walk(&container, "a.css", &MediaContext::default())?;
        let names: Vec<&str> = flat.iter().map(|(prelude, ..)| prelude.as_str()).collect();
        assert_eq!(names, ["b", "c", "c", "a"]);
        assert_eq!(container.errors(), ["Recursive import of a.css from b.css, ignoring"]);
        Ok(())
    }

    /// Missing and non-stylesheet imports are skipped silently.
    ///
    /// # Errors
    /// Returns an error if the root sheet is missing.
    #[test]
    fn skips_missing_imports() -> Result<(), Box<dyn Error>> {
        let mut container = MemoryContainer::new();
        container.add_stylesheet("a.css", "@import 'nope.css'; @import 'img.png'; @import 'http://x.org/a.css'; @font-face { font-family: x } a {}");
        container.add_other("img.png");
        let counter = RuleIndexCounter::new();
        let media = MediaContext::default();
        let kinds: Vec<RuleKind> = RuleIter::for_name(&container, "a.css", &media, &counter, None)
            .ok_or("not a stylesheet")?
            .map(|flat| flat.rule.kind())
            .collect();
        assert_eq!(kinds, [RuleKind::FontFace, RuleKind::Style]);
        assert!(container.errors().is_empty());
        Ok(())
    }
}
