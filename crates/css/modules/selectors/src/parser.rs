//! CSS selector parsing.
//! Spec: <https://www.w3.org/TR/selectors-3/>

use crate::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorError,
    SimpleSelector,
};
use core::mem::take;
use cssparser::{ParseError, Parser, ParserInput, parse_nth};
use std::collections::HashSet;

/// Pseudo-elements that may be written with a single colon (CSS 2 syntax).
const LEGACY_PSEUDO_ELEMENTS: [&str; 4] = ["before", "after", "first-line", "first-letter"];

#[derive(Clone, Debug, PartialEq, Eq)]
/// Internal tokenizer token kinds.
enum Tok {
    /// A combinator token like child/adjacent/general sibling.
    Combinator(Combinator),
    /// Whitespace that implies a descendant combinator.
    DescendantWS,
    /// A simple selector token.
    Simple(SimpleSelector),
}

/// Tokenizer over a selector string.
struct SelectorTokenizer<'set> {
    /// Selector characters.
    input_chars: Vec<char>,
    /// Current cursor index into `input_chars`.
    index: usize,
    /// Pseudo names accepted without matching semantics.
    ignored: &'set HashSet<String>,
}

/// True for characters that may appear inside an identifier.
const fn is_ident_char(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '-' || character == '_' || !character.is_ascii()
}

impl<'set> SelectorTokenizer<'set> {
    /// Construct a tokenizer from input.
    #[inline]
    fn new(input: &str, ignored: &'set HashSet<String>) -> Self {
        Self {
            input_chars: input.trim().chars().collect(),
            index: 0,
            ignored,
        }
    }

    /// Character at the cursor.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.input_chars.get(self.index).copied()
    }

    /// Advance the cursor by one character.
    #[inline]
    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// Return the next selector token, if any.
    fn next_token(&mut self) -> Result<Option<Tok>, SelectorError> {
        if self.skip_spaces() {
            return Ok(Some(Tok::DescendantWS));
        }
        let Some(current) = self.peek() else {
            return Ok(None);
        };
        let token = match current {
            '*' => {
                self.bump();
                Tok::Simple(SimpleSelector::Universal)
            }
            '.' => {
                self.bump();
                Tok::Simple(SimpleSelector::Class(self.consume_ident("class name")?))
            }
            '#' => {
                self.bump();
                Tok::Simple(SimpleSelector::IdSelector(self.consume_ident("id")?))
            }
            '[' => {
                self.bump();
                Tok::Simple(self.consume_attr()?)
            }
            ':' => {
                self.bump();
                Tok::Simple(self.consume_pseudo()?)
            }
            '>' => {
                self.bump();
                Tok::Combinator(Combinator::Child)
            }
            '+' => {
                self.bump();
                Tok::Combinator(Combinator::AdjacentSibling)
            }
            '~' => {
                self.bump();
                Tok::Combinator(Combinator::GeneralSibling)
            }
            '|' => return Err(SelectorError::UnsupportedSyntax("namespace prefix".to_owned())),
            '\\' => return Err(SelectorError::UnsupportedSyntax("escape sequence".to_owned())),
            other if is_ident_char(other) => {
                let ident = self.consume_ident("type")?;
                Tok::Simple(SimpleSelector::Type(ident.to_ascii_lowercase()))
            }
            other => {
                return Err(SelectorError::Syntax(format!("unexpected character {other:?}")));
            }
        };
        Ok(Some(token))
    }

    /// Skip whitespace; returns true if any was skipped and more input follows.
    fn skip_spaces(&mut self) -> bool {
        let start = self.index;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.index != start && self.peek().is_some()
    }

    /// Consume an identifier; `what` names it for error messages.
    fn consume_ident(&mut self, what: &str) -> Result<String, SelectorError> {
        let start = self.index;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        let ident: String = self
            .input_chars
            .get(start..self.index)
            .unwrap_or_default()
            .iter()
            .collect();
        if ident.is_empty() || ident == "-" {
            return Err(SelectorError::Syntax(format!("expected {what}")));
        }
        Ok(ident)
    }

    /// Parse an attribute selector after `[`, supporting all CSS 3 operators.
    fn consume_attr(&mut self) -> Result<SimpleSelector, SelectorError> {
        self.skip_inner_spaces();
        let name = self.consume_ident("attribute name")?.to_ascii_lowercase();
        self.skip_inner_spaces();
        let operator = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(SimpleSelector::Attribute {
                    name,
                    operator: AttrOperator::Exists,
                    value: String::new(),
                });
            }
            Some('=') => AttrOperator::Equals,
            Some('~') => AttrOperator::Includes,
            Some('|') => AttrOperator::DashMatch,
            Some('^') => AttrOperator::Prefix,
            Some('$') => AttrOperator::Suffix,
            Some('*') => AttrOperator::Substring,
            _ => return Err(SelectorError::Syntax("malformed attribute selector".to_owned())),
        };
        self.bump();
        if operator != AttrOperator::Equals {
            if self.peek() != Some('=') {
                return Err(SelectorError::Syntax("malformed attribute operator".to_owned()));
            }
            self.bump();
        }
        self.skip_inner_spaces();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.consume_quoted(quote)?
            }
            _ => self.consume_ident("attribute value")?,
        };
        self.skip_inner_spaces();
        if self.peek() != Some(']') {
            return Err(SelectorError::Syntax("unterminated attribute selector".to_owned()));
        }
        self.bump();
        Ok(SimpleSelector::Attribute {
            name,
            operator,
            value,
        })
    }

    /// Consume a quoted value until the matching quote.
    fn consume_quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(SelectorError::Syntax("unterminated string".to_owned())),
                Some(character) if character == quote => {
                    self.bump();
                    return Ok(out);
                }
                Some(character) => {
                    out.push(character);
                    self.bump();
                }
            }
        }
    }

    /// Parse a pseudo-class or pseudo-element after the first `:`.
    fn consume_pseudo(&mut self) -> Result<SimpleSelector, SelectorError> {
        let is_element = self.peek() == Some(':');
        if is_element {
            self.bump();
        }
        let name = self.consume_ident("pseudo name")?.to_ascii_lowercase();
        let is_ignored = self.ignored.contains(&name);
        if self.peek() == Some('(') {
            let argument = self.consume_arguments()?;
            if !is_ignored {
                if is_element {
                    return Err(SelectorError::UnsupportedPseudo(format!("::{name}()")));
                }
                return self
                    .functional_pseudo(&name, &argument)
                    .map(SimpleSelector::PseudoClass);
            }
        }
        if is_element || LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
            if is_ignored {
                return Ok(SimpleSelector::PseudoElement(name));
            }
            return Err(SelectorError::UnsupportedPseudo(format!("::{name}")));
        }
        if is_ignored {
            return Ok(SimpleSelector::PseudoClass(PseudoClass::Ignored(name)));
        }
        let pseudo = match name.as_str() {
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "only-of-type" => PseudoClass::OnlyOfType,
            "root" => PseudoClass::Root,
            "empty" => PseudoClass::Empty,
            _ => return Err(SelectorError::UnsupportedPseudo(format!(":{name}"))),
        };
        Ok(SimpleSelector::PseudoClass(pseudo))
    }

    /// Consume a parenthesised argument list, honouring nesting, and return
    /// the text between the outer parentheses.
    fn consume_arguments(&mut self) -> Result<String, SelectorError> {
        let mut depth = 0usize;
        let mut argument = String::new();
        while let Some(character) = self.peek() {
            self.bump();
            match character {
                '(' => {
                    if depth > 0 {
                        argument.push(character);
                    }
                    depth = depth.saturating_add(1);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(argument);
                    }
                    argument.push(character);
                }
                _ => argument.push(character),
            }
        }
        Err(SelectorError::Syntax("unterminated pseudo-class arguments".to_owned()))
    }

    /// Build a functional pseudo-class from its name and argument text.
    /// Spec: Section 6.6.5 - Structural pseudo-classes; 6.6.7 - Negation
    fn functional_pseudo(
        &self,
        name: &str,
        argument: &str,
    ) -> Result<PseudoClass, SelectorError> {
        let nth = |of_type: bool, from_end: bool| -> Result<PseudoClass, SelectorError> {
            let (step, offset) = parse_nth_argument(argument)?;
            Ok(PseudoClass::Nth {
                step,
                offset,
                of_type,
                from_end,
            })
        };
        match name {
            "nth-child" => nth(false, false),
            "nth-last-child" => nth(false, true),
            "nth-of-type" => nth(true, false),
            "nth-last-of-type" => nth(true, true),
            "not" => self.negation(argument),
            "lang" => {
                let lang = argument.trim().trim_matches(['"', '\'']).trim();
                if lang.is_empty() {
                    return Err(SelectorError::Syntax("empty :lang() argument".to_owned()));
                }
                Ok(PseudoClass::Lang(lang.to_ascii_lowercase()))
            }
            _ => Err(SelectorError::UnsupportedPseudo(format!(":{name}()"))),
        }
    }

    /// Parse the compound list of `:not()`. Combinators, pseudo-elements,
    /// ignored pseudo-classes and nested negations are not accepted.
    fn negation(&self, argument: &str) -> Result<PseudoClass, SelectorError> {
        let mut compounds = Vec::new();
        for clause in argument.split(',') {
            let mut tokens = SelectorTokenizer::new(clause, self.ignored);
            let mut compound = CompoundSelector::default();
            while let Some(token) = tokens.next_token()? {
                let simple = match token {
                    Tok::Simple(
                        SimpleSelector::PseudoElement(_)
                        | SimpleSelector::PseudoClass(PseudoClass::Ignored(_) | PseudoClass::Not(_)),
                    ) => {
                        return Err(SelectorError::UnsupportedPseudo(format!(":not({})", clause.trim())));
                    }
                    Tok::Simple(simple) => simple,
                    Tok::Combinator(_) | Tok::DescendantWS => {
                        return Err(SelectorError::UnsupportedSyntax(
                            "combinator inside :not()".to_owned(),
                        ));
                    }
                };
                if !compound.simples.is_empty()
                    && matches!(simple, SimpleSelector::Type(_) | SimpleSelector::Universal)
                {
                    return Err(SelectorError::Syntax(
                        "type selector must start a compound".to_owned(),
                    ));
                }
                compound.simples.push(simple);
            }
            if compound.simples.is_empty() {
                return Err(SelectorError::Syntax("empty :not() argument".to_owned()));
            }
            compounds.push(compound);
        }
        Ok(PseudoClass::Not(compounds))
    }

    /// Skip whitespace inside brackets.
    #[inline]
    fn skip_inner_spaces(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }
}

/// Parse an `an+b` argument such as `2n+1`, `odd` or `-n+3`.
/// Spec: Section 6.6.5.2 - `:nth-child()` pseudo-class
fn parse_nth_argument(argument: &str) -> Result<(i32, i32), SelectorError> {
    let mut input = ParserInput::new(argument.trim());
    let mut parser = Parser::new(&mut input);
    parser
        .parse_entirely(nth_tokens)
        .map_err(|_| SelectorError::Syntax(format!("invalid an+b argument {argument:?}")))
}

/// `cssparser::parse_nth` with its error widened for `parse_entirely`.
fn nth_tokens<'input>(
    parser: &mut Parser<'input, '_>,
) -> Result<(i32, i32), ParseError<'input, ()>> {
    parse_nth(parser).map_err(ParseError::from)
}

/// Parse one complex selector.
///
/// Pseudo-classes and pseudo-elements named in `ignored` are accepted and
/// always match; every other pseudo outside the supported structural set is an
/// error.
/// Spec: Section 11 - Combinators; Section 5–8 - simple selectors
///
/// # Errors
/// Returns a [`SelectorError`] for empty, malformed or unsupported selectors.
pub fn parse_complex_selector(
    input: &str,
    ignored: &HashSet<String>,
) -> Result<ComplexSelector, SelectorError> {
    let mut tokens = SelectorTokenizer::new(input, ignored);
    let mut closed: Vec<(Option<Combinator>, CompoundSelector)> = Vec::new();
    let mut current = CompoundSelector::default();
    let mut lead: Option<Combinator> = None;
    let mut pending: Option<Combinator> = None;

    while let Some(token) = tokens.next_token()? {
        match token {
            Tok::DescendantWS => {
                if !current.simples.is_empty() {
                    closed.push((lead, take(&mut current)));
                    pending = Some(Combinator::Descendant);
                }
            }
            Tok::Combinator(comb) => {
                if !current.simples.is_empty() {
                    closed.push((lead, take(&mut current)));
                    pending = Some(comb);
                } else if pending == Some(Combinator::Descendant) {
                    pending = Some(comb);
                } else {
                    return Err(SelectorError::Syntax("misplaced combinator".to_owned()));
                }
            }
            Tok::Simple(simple) => {
                if current.simples.is_empty() {
                    lead = (!closed.is_empty())
                        .then(|| pending.take().unwrap_or(Combinator::Descendant));
                } else if matches!(simple, SimpleSelector::Type(_) | SimpleSelector::Universal) {
                    return Err(SelectorError::Syntax(
                        "type selector must start a compound".to_owned(),
                    ));
                }
                current.simples.push(simple);
            }
        }
    }

    if current.simples.is_empty() {
        if closed.is_empty() {
            return Err(SelectorError::Empty);
        }
        return Err(SelectorError::Syntax("dangling combinator".to_owned()));
    }
    closed.push((lead, current));

    let mut parts = closed.into_iter();
    let first = parts.next().map(|pair| pair.1).unwrap_or_default();
    let rest = parts
        .map(|(comb, compound)| (comb.unwrap_or(Combinator::Descendant), compound))
        .collect();
    Ok(ComplexSelector { first, rest })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::error::Error;

    fn ignored() -> HashSet<String> {
        ["hover", "before", "after", "first-line"]
            .iter()
            .map(|name| (*name).to_owned())
            .collect()
    }

    /// Combinators split compounds, with or without surrounding whitespace.
    ///
    /// # Errors
    /// Returns an error if parsing fails.
    #[test]
    fn parses_combinators() -> Result<(), Box<dyn Error>> {
        let selector = parse_complex_selector("div.a > p+span ~ em  b", &ignored())?;
        assert_eq!(
            selector.first.simples,
            vec![
                SimpleSelector::Type("div".to_owned()),
                SimpleSelector::Class("a".to_owned())
            ]
        );
        let combinators: Vec<Combinator> = selector.rest.iter().map(|pair| pair.0).collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Child,
                Combinator::AdjacentSibling,
                Combinator::GeneralSibling,
                Combinator::Descendant
            ]
        );
        Ok(())
    }

    /// Attribute selectors accept every operator and quoted values.
    ///
    /// # Errors
    /// Returns an error if parsing fails.
    #[test]
    fn parses_attribute_operators() -> Result<(), Box<dyn Error>> {
        let selector = parse_complex_selector("a[href^='http'][ lang |= en ][rel]", &ignored())?;
        assert_eq!(
            selector.first.simples.get(1),
            Some(&SimpleSelector::Attribute {
                name: "href".to_owned(),
                operator: AttrOperator::Prefix,
                value: "http".to_owned(),
            })
        );
        assert_eq!(
            selector.first.simples.get(2),
            Some(&SimpleSelector::Attribute {
                name: "lang".to_owned(),
                operator: AttrOperator::DashMatch,
                value: "en".to_owned(),
            })
        );
        Ok(())
    }

    /// Ignored pseudo names parse and are reported in source order.
    ///
    /// # Errors
    /// Returns an error if parsing fails.
    #[test]
    fn keeps_ignored_pseudos() -> Result<(), Box<dyn Error>> {
        let selector = parse_complex_selector("p:first-line", &ignored())?;
        assert_eq!(selector.ignored_pseudo(), Some("first-line"));
        let selector = parse_complex_selector("a:hover span::before", &ignored())?;
        assert_eq!(selector.ignored_pseudo(), Some("hover"));
        let selector = parse_complex_selector("li:first-child", &ignored())?;
        assert_eq!(selector.ignored_pseudo(), None);
        Ok(())
    }

    /// Functional pseudo-classes parse their arguments.
    ///
    /// # Errors
    /// Returns an error if parsing fails.
    #[test]
    fn parses_functional_pseudo_classes() -> Result<(), Box<dyn Error>> {
        let selector = parse_complex_selector("li:nth-child( 2n+1 ):nth-last-of-type(odd)", &ignored())?;
        assert_eq!(
            selector.first.simples.get(1),
            Some(&SimpleSelector::PseudoClass(PseudoClass::Nth {
                step: 2,
                offset: 1,
                of_type: false,
                from_end: false,
            }))
        );
        assert_eq!(
            selector.first.simples.get(2),
            Some(&SimpleSelector::PseudoClass(PseudoClass::Nth {
                step: 2,
                offset: 1,
                of_type: true,
                from_end: true,
            }))
        );

        let selector = parse_complex_selector("p:not(.a, div#b):lang(\"EN\")", &ignored())?;
        let negated = CompoundSelector {
            simples: vec![SimpleSelector::Class("a".to_owned())],
        };
        let qualified = CompoundSelector {
            simples: vec![
                SimpleSelector::Type("div".to_owned()),
                SimpleSelector::IdSelector("b".to_owned()),
            ],
        };
        assert_eq!(
            selector.first.simples.get(1),
            Some(&SimpleSelector::PseudoClass(PseudoClass::Not(vec![negated, qualified])))
        );
        assert_eq!(
            selector.first.simples.get(2),
            Some(&SimpleSelector::PseudoClass(PseudoClass::Lang("en".to_owned())))
        );

        let selector = parse_complex_selector("a:hover(x) em:only-of-type", &ignored())?;
        assert_eq!(selector.ignored_pseudo(), Some("hover"));
        Ok(())
    }

    /// Malformed and unsupported selectors are distinguishable errors.
    #[test]
    fn rejects_bad_selectors() {
        let set = ignored();
        assert_eq!(parse_complex_selector("  ", &set), Err(SelectorError::Empty));
        assert!(matches!(parse_complex_selector("a >", &set), Err(SelectorError::Syntax(_))));
        assert!(matches!(parse_complex_selector("> a", &set), Err(SelectorError::Syntax(_))));
        assert!(matches!(parse_complex_selector("a[x", &set), Err(SelectorError::Syntax(_))));
        assert!(matches!(parse_complex_selector("p!", &set), Err(SelectorError::Syntax(_))));
        assert!(matches!(
            parse_complex_selector("a:visited", &set),
            Err(SelectorError::UnsupportedPseudo(_))
        ));
        assert!(matches!(
            parse_complex_selector("p:contains(x)", &set),
            Err(SelectorError::UnsupportedPseudo(_))
        ));
        assert!(matches!(
            parse_complex_selector("p:nth-child(2x)", &set),
            Err(SelectorError::Syntax(_))
        ));
        assert!(matches!(
            parse_complex_selector("p:not(div p)", &set),
            Err(SelectorError::UnsupportedSyntax(_))
        ));
        assert!(matches!(
            parse_complex_selector("p:not(:hover)", &set),
            Err(SelectorError::UnsupportedPseudo(_))
        ));
        assert!(matches!(
            parse_complex_selector("p::before(x)", &set),
            Err(SelectorError::UnsupportedPseudo(_))
        ));
        assert!(matches!(
            parse_complex_selector("svg|rect", &set),
            Err(SelectorError::UnsupportedSyntax(_))
        ));
    }
}
