//! CSS Style Attributes - style="..." attribute processing.
//! Spec: <https://www.w3.org/TR/css-style-attr/>

#![forbid(unsafe_code)]

use css_syntax::{Declaration, parse_declaration_list};

/// Parse the value of a `style` attribute into a list of declarations.
///
/// The attribute value is parsed as the contents of a declaration block:
/// - Declarations are separated by semicolons; empty items are skipped.
/// - Property names are ASCII lowercased.
/// - A trailing `!important` sets the declaration's importance.
/// - Invalid items (no colon, empty value) are dropped individually.
///
/// Spec: <https://www.w3.org/TR/css-style-attr/#interpreting>
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    if is_blank_style_attribute(input) {
        return Vec::new();
    }
    parse_declaration_list(input)
}

/// True when the attribute holds nothing but ASCII whitespace.
///
/// Spec: <https://www.w3.org/TR/css-syntax-3/#whitespace>
pub fn is_blank_style_attribute(input: &str) -> bool {
    input.chars().all(is_ascii_whitespace)
}

/// ASCII whitespace per CSS Syntax (TAB, LF, FF, CR, SPACE).
///
/// Spec: <https://www.w3.org/TR/css-syntax-3/#whitespace>
const fn is_ascii_whitespace(character: char) -> bool {
    matches!(
        character,
        '\u{0009}' | '\u{000A}' | '\u{000C}' | '\u{000D}' | '\u{0020}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Items are parsed in order with importance and lowercase names.
    #[test]
    fn parses_items_in_order() {
        let decls = parse_style_attribute(" COLOR : red ; margin:0 1px !important; bogus; ;");
        assert_eq!(
            decls,
            vec![
                Declaration::new("color", "red", false),
                Declaration::new("margin", "0 1px", true),
            ]
        );
    }

    /// Duplicate properties are all kept; the cascade picks the last one.
    #[test]
    fn keeps_duplicates() {
        let decls = parse_style_attribute("color: red; color: blue");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls.last().map(|decl| decl.value.as_str()), Some("blue"));
    }

    /// Blank attributes produce nothing.
    #[test]
    fn blank_attribute() {
        assert!(is_blank_style_attribute(" \t\n"));
        assert!(!is_blank_style_attribute("x:y"));
        assert!(parse_style_attribute("   ").is_empty());
    }
}
