//! CSS Syntax Module Level 3 - Parsing and tokenization.
//! Spec: <https://www.w3.org/TR/css-syntax-3/>
//!
//! Produces the structured rule objects consumed by the cascade. Style rules,
//! `@import`, `@media`, `@font-face` and `@page` are kept; every other at-rule
//! is dropped during parsing.
use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::ParseError;
use cssparser::Parser;
use cssparser::ParserInput;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;
use cssparser::StyleSheetParser;

mod components;

pub use components::{split_selector_list, split_value_components};

/// A single CSS declaration (property: value [!important]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name (custom properties keep their case).
    pub name: String,
    /// Raw value text (without trailing !important).
    pub value: String,
    /// Whether the declaration was marked as `!important`.
    pub important: bool,
}

impl Declaration {
    /// Convenience constructor used by callers that synthesize declarations.
    #[inline]
    pub fn new(name: &str, value: &str, important: bool) -> Self {
        Self {
            name: normalize_property_name(name),
            value: value.trim().to_owned(),
            important,
        }
    }
}

/// A single style rule with a raw prelude and parsed declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Raw prelude text (the selector list).
    pub prelude: String,
    /// Declarations within the rule block.
    pub declarations: Vec<Declaration>,
}

impl StyleRule {
    /// The individual selector clauses of the prelude, split on top-level commas.
    #[inline]
    pub fn selectors(&self) -> Vec<String> {
        split_selector_list(&self.prelude)
    }
}

/// `@import url(...) media;`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportRule {
    /// The target as written, unresolved.
    pub href: String,
    /// Raw media query list, empty when absent.
    pub media: String,
}

/// `@media query { rules }`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaRule {
    /// Raw media query list.
    pub media: String,
    /// Nested rules in source order.
    pub rules: Vec<CssRule>,
}

/// `@font-face { declarations }`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFaceRule {
    pub declarations: Vec<Declaration>,
}

/// `@page selector { declarations }`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRule {
    /// Page selector text such as `:first`, empty when absent.
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

/// Any rule kept by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CssRule {
    Style(StyleRule),
    Import(ImportRule),
    Media(MediaRule),
    FontFace(FontFaceRule),
    Page(PageRule),
}

impl CssRule {
    /// The kind tag of this rule.
    #[inline]
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::Style(_) => RuleKind::Style,
            Self::Import(_) => RuleKind::Import,
            Self::Media(_) => RuleKind::Media,
            Self::FontFace(_) => RuleKind::FontFace,
            Self::Page(_) => RuleKind::Page,
        }
    }
}

/// Rule kind tags, used to filter flattened rule streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Style,
    Import,
    Media,
    FontFace,
    Page,
}

/// A parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Top-level rules in source order.
    pub rules: Vec<CssRule>,
}

/// Lowercase a property name, leaving custom properties (`--name`) untouched.
fn normalize_property_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.starts_with("--") {
        return trimmed.to_owned();
    }
    trimmed.to_ascii_lowercase()
}

/// Parse `!important` at the end of a value, returning (`value_without_important`, `important_flag`).
fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(bang) = trimmed.rfind('!')
        && let Some(head) = trimmed.get(..bang)
        && let Some(tail) = trimmed.get(bang.saturating_add(1)..)
        && tail.trim().eq_ignore_ascii_case("important")
    {
        return (head.trim_end().to_owned(), true);
    }
    (trimmed.to_owned(), false)
}

/// Consume the rest of `input` and return it as trimmed source text.
fn consume_remaining(input: &mut Parser<'_, '_>) -> String {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    input.slice_from(start).trim().to_owned()
}

/// A declaration parser that records property name and its raw value.
struct BodyDeclParser;

impl<'input> CssDeclarationParser<'input> for BodyDeclParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
        _declaration_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let start = input.position();
        // Consume until end of the declaration item.
        while input.next_including_whitespace_and_comments().is_ok() {}
        let (value, important) = split_important_tail(input.slice_from(start));
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(Declaration {
            name: normalize_property_name(&name),
            value,
            important,
        })
    }
}

impl<'input> CssAtRuleParser<'input> for BodyDeclParser {
    type Prelude = ();
    type AtRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name)))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Err(())
    }

    #[inline]
    fn parse_block<'tokens>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
    }
}

impl<'input> CssQualifiedRuleParser<'input> for BodyDeclParser {
    type Prelude = ();
    type QualifiedRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'tokens>(
        &mut self,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }

    #[inline]
    fn parse_block<'tokens>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl<'input> CssRuleBodyItemParser<'input, Declaration, ()> for BodyDeclParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Parsed at-rule prelude, before the block (if any) is seen.
enum AtPrelude {
    Import { href: String, media: String },
    Media(String),
    FontFace,
    Page(String),
}

/// Rule-list parser that builds `CssRule` items for qualified rules and the kept at-rules.
struct TopLevelParser;

impl<'input> CssAtRuleParser<'input> for TopLevelParser {
    type Prelude = AtPrelude;
    type AtRule = CssRule;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        if name.eq_ignore_ascii_case("import") {
            let target = input.expect_url_or_string()?;
            let href = (*target).to_owned();
            return Ok(AtPrelude::Import {
                href,
                media: consume_remaining(input),
            });
        }
        if name.eq_ignore_ascii_case("media") {
            return Ok(AtPrelude::Media(consume_remaining(input)));
        }
        if name.eq_ignore_ascii_case("font-face") {
            consume_remaining(input);
            return Ok(AtPrelude::FontFace);
        }
        if name.eq_ignore_ascii_case("page") {
            return Ok(AtPrelude::Page(consume_remaining(input)));
        }
        Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name)))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        match prelude {
            AtPrelude::Import { href, media } => Ok(CssRule::Import(ImportRule { href, media })),
            AtPrelude::Media(_) | AtPrelude::FontFace | AtPrelude::Page(_) => Err(()),
        }
    }

    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        match prelude {
            AtPrelude::Media(media) => {
                let rules = parse_rule_list(input, self);
                Ok(CssRule::Media(MediaRule { media, rules }))
            }
            AtPrelude::FontFace => Ok(CssRule::FontFace(FontFaceRule {
                declarations: parse_declarations_from_block(input),
            })),
            AtPrelude::Page(selector) => Ok(CssRule::Page(PageRule {
                selector,
                declarations: parse_declarations_from_block(input),
            })),
            AtPrelude::Import { .. } => Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid)),
        }
    }
}

impl<'input> CssQualifiedRuleParser<'input> for TopLevelParser {
    type Prelude = String; // raw selector/prelude
    type QualifiedRule = CssRule;
    type Error = ();

    #[inline]
    fn parse_prelude<'tokens>(
        &mut self,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(consume_remaining(input))
    }

    #[inline]
    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        let declarations = parse_declarations_from_block(input);
        Ok(CssRule::Style(StyleRule {
            prelude,
            declarations,
        }))
    }
}

/// Parse a list of rules (top level or the body of `@media`).
fn parse_rule_list(input: &mut Parser<'_, '_>, top: &mut TopLevelParser) -> Vec<CssRule> {
    StyleSheetParser::new(input, top).flatten().collect()
}

/// Parse declarations from a rule block using `cssparser` body parser.
fn parse_declarations_from_block(block: &mut Parser<'_, '_>) -> Vec<Declaration> {
    let mut body = BodyDeclParser;
    CssRuleBodyParser::new(block, &mut body).flatten().collect()
}

/// Parse a full stylesheet into a `Stylesheet` using cssparser.
///
/// Invalid rules are skipped individually; parsing never fails as a whole.
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut top = TopLevelParser;
    Stylesheet {
        rules: parse_rule_list(&mut parser, &mut top),
    }
}

/// Parse a bare declaration list, such as the text of a `style` attribute.
pub fn parse_declaration_list(css: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    parse_declarations_from_block(&mut parser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::error::Error;

    /// Style rules keep their prelude and declarations, with importance split off.
    ///
    /// # Errors
    /// Returns an error if the stylesheet does not parse as expected.
    #[test]
    fn parses_style_rule_with_important() -> Result<(), Box<dyn Error>> {
        let sheet = parse_stylesheet("p.note, div { color: red !important; Margin: 0 }");
        let Some(CssRule::Style(rule)) = sheet.rules.first() else {
            return Err("expected a style rule".into());
        };
        assert_eq!(rule.prelude, "p.note, div");
        assert_eq!(rule.selectors(), vec!["p.note".to_owned(), "div".to_owned()]);
        assert_eq!(
            rule.declarations,
            vec![
                Declaration::new("color", "red", true),
                Declaration::new("margin", "0", false),
            ]
        );
        Ok(())
    }

    /// `@import` accepts both `url()` and string targets and keeps the media list.
    ///
    /// # Errors
    /// Returns an error if the import rules are missing.
    #[test]
    fn parses_imports() -> Result<(), Box<dyn Error>> {
        let sheet = parse_stylesheet("@import url(base.css);\n@import \"print.css\" print;");
        let [CssRule::Import(first), CssRule::Import(second)] = sheet.rules.as_slice() else {
            return Err("expected two import rules".into());
        };
        assert_eq!(first.href, "base.css");
        assert_eq!(first.media, "");
        assert_eq!(second.href, "print.css");
        assert_eq!(second.media, "print");
        Ok(())
    }

    /// `@media` blocks nest their rules, including further `@media` blocks.
    ///
    /// # Errors
    /// Returns an error if the nesting is lost.
    #[test]
    fn parses_nested_media() -> Result<(), Box<dyn Error>> {
        let sheet =
            parse_stylesheet("@media screen { a { color: blue } @media (color) { b { x: y } } }");
        let Some(CssRule::Media(media)) = sheet.rules.first() else {
            return Err("expected a media rule".into());
        };
        assert_eq!(media.media, "screen");
        assert_eq!(media.rules.len(), 2);
        assert_eq!(media.rules.get(1).map(CssRule::kind), Some(RuleKind::Media));
        Ok(())
    }

    /// Unknown at-rules and empty declarations are dropped.
    #[test]
    fn drops_unknown_at_rules() {
        let sheet = parse_stylesheet(
            "@charset \"utf-8\"; @keyframes spin { from { x: y } } @font-face { font-family: A } h1 { color: ; }",
        );
        let kinds: Vec<RuleKind> = sheet.rules.iter().map(CssRule::kind).collect();
        assert_eq!(kinds, vec![RuleKind::FontFace, RuleKind::Style]);
        if let Some(CssRule::Style(rule)) = sheet.rules.get(1) {
            assert!(rule.declarations.is_empty());
        }
    }

    /// Declaration lists parse the way a `style` attribute is written.
    #[test]
    fn parses_declaration_list() {
        let decls = parse_declaration_list("color: red; font-weight: bold ! IMPORTANT;; --Main: 1px");
        assert_eq!(
            decls,
            vec![
                Declaration::new("color", "red", false),
                Declaration::new("font-weight", "bold", true),
                Declaration {
                    name: "--Main".to_owned(),
                    value: "1px".to_owned(),
                    important: false,
                },
            ]
        );
    }
}
