//! Initial values and inheritance flags of the CSS 2.1 properties.
//! Spec: <https://www.w3.org/TR/CSS21/propidx.html>

use crate::PropertyValue;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Initial value literal for each known property.
/// Spec: CSS 2.1 Appendix F - Full property table
const INITIAL_VALUES: &[(&str, &str)] = &[
    ("azimuth", "center"),
    ("background-attachment", "scroll"),
    ("background-color", "transparent"),
    ("background-image", "none"),
    ("background-position", "0% 0%"),
    ("background-repeat", "repeat"),
    ("border-bottom-color", "currentColor"),
    ("border-bottom-style", "none"),
    ("border-bottom-width", "medium"),
    ("border-collapse", "separate"),
    ("border-left-color", "currentColor"),
    ("border-left-style", "none"),
    ("border-left-width", "medium"),
    ("border-right-color", "currentColor"),
    ("border-right-style", "none"),
    ("border-right-width", "medium"),
    ("border-spacing", "0"),
    ("border-top-color", "currentColor"),
    ("border-top-style", "none"),
    ("border-top-width", "medium"),
    ("bottom", "auto"),
    ("caption-side", "top"),
    ("clear", "none"),
    ("clip", "auto"),
    ("color", "black"),
    ("content", "normal"),
    ("counter-increment", "none"),
    ("counter-reset", "none"),
    ("cue-after", "none"),
    ("cue-before", "none"),
    ("cursor", "auto"),
    ("direction", "ltr"),
    ("display", "inline"),
    ("elevation", "level"),
    ("empty-cells", "show"),
    ("float", "none"),
    ("font-family", "serif"),
    ("font-size", "medium"),
    ("font-stretch", "normal"),
    ("font-style", "normal"),
    ("font-variant", "normal"),
    ("font-weight", "normal"),
    ("height", "auto"),
    ("left", "auto"),
    ("letter-spacing", "normal"),
    ("line-height", "normal"),
    ("list-style-image", "none"),
    ("list-style-position", "outside"),
    ("list-style-type", "disc"),
    ("margin-bottom", "0"),
    ("margin-left", "0"),
    ("margin-right", "0"),
    ("margin-top", "0"),
    ("max-height", "none"),
    ("max-width", "none"),
    ("min-height", "0"),
    ("min-width", "0"),
    ("orphans", "2"),
    ("outline-color", "invert"),
    ("outline-style", "none"),
    ("outline-width", "medium"),
    ("overflow", "visible"),
    ("padding-bottom", "0"),
    ("padding-left", "0"),
    ("padding-right", "0"),
    ("padding-top", "0"),
    ("page-break-after", "auto"),
    ("page-break-before", "auto"),
    ("page-break-inside", "auto"),
    ("pause-after", "0"),
    ("pause-before", "0"),
    ("pitch", "medium"),
    ("pitch-range", "50"),
    ("play-during", "auto"),
    ("position", "static"),
    ("quotes", "'\u{201c}' '\u{201d}' '\u{2018}' '\u{2019}'"),
    ("richness", "50"),
    ("right", "auto"),
    ("speak", "normal"),
    ("speak-header", "once"),
    ("speak-numeral", "continuous"),
    ("speak-punctuation", "none"),
    ("speech-rate", "medium"),
    ("stress", "50"),
    ("table-layout", "auto"),
    ("text-align", "auto"),
    ("text-decoration", "none"),
    ("text-indent", "0"),
    ("text-shadow", "none"),
    ("text-transform", "none"),
    ("top", "auto"),
    ("unicode-bidi", "normal"),
    ("vertical-align", "baseline"),
    ("visibility", "visible"),
    ("voice-family", "default"),
    ("volume", "medium"),
    ("white-space", "normal"),
    ("widows", "2"),
    ("width", "auto"),
    ("word-spacing", "normal"),
    ("z-index", "auto"),
];

/// Properties inherited by default.
/// Spec: CSS 2.1 Appendix F - "Inherited?" column
const INHERITED_PROPERTIES: &[&str] = &[
    "azimuth",
    "border-collapse",
    "border-spacing",
    "caption-side",
    "color",
    "cursor",
    "direction",
    "elevation",
    "empty-cells",
    "font-family",
    "font-size",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "letter-spacing",
    "line-height",
    "list-style-image",
    "list-style-position",
    "list-style-type",
    "orphans",
    "page-break-inside",
    "pitch",
    "pitch-range",
    "quotes",
    "richness",
    "speak",
    "speak-header",
    "speak-numeral",
    "speak-punctuation",
    "speech-rate",
    "stress",
    "text-align",
    "text-indent",
    "text-transform",
    "visibility",
    "voice-family",
    "volume",
    "white-space",
    "widows",
    "word-spacing",
];

/// Parsed initial values, built on first use and shared read-only afterwards.
static DEFAULT_VALUES: Lazy<HashMap<&'static str, PropertyValue>> = Lazy::new(|| {
    INITIAL_VALUES
        .iter()
        .map(|&(name, literal)| (name, PropertyValue::parse(literal, None, false)))
        .collect()
});

static INHERITED: Lazy<HashSet<&'static str>> =
    Lazy::new(|| INHERITED_PROPERTIES.iter().copied().collect());

/// Whether a property is inherited by default.
/// Spec: Section 7 - Inheritance
pub fn is_inherited_property(property_name: &str) -> bool {
    INHERITED.contains(property_name)
}

/// Initial value literal of a property, if known.
/// Spec: Section 7.1 - Initial values
pub fn initial_value(property_name: &str) -> Option<&'static str> {
    INITIAL_VALUES
        .iter()
        .find(|(name, _)| *name == property_name)
        .map(|&(_, literal)| literal)
}

/// Parsed initial value of a property. Unknown properties have none.
pub fn default_value(property_name: &str) -> Option<&'static PropertyValue> {
    DEFAULT_VALUES.get(property_name)
}

/// The whole default table.
pub fn default_values() -> &'static HashMap<&'static str, PropertyValue> {
    &DEFAULT_VALUES
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every inherited property has an initial value.
    #[test]
    fn inherited_properties_have_defaults() {
        for name in INHERITED_PROPERTIES {
            assert!(initial_value(name).is_some(), "{name}");
        }
    }

    /// Default values are parsed from their literals and carry no sheet.
    #[test]
    fn parses_defaults() {
        let position = default_value("background-position");
        assert_eq!(position.map(PropertyValue::components), Some(&["0%".to_owned(), "0%".to_owned()][..]));
        assert_eq!(default_value("quotes").map(PropertyValue::len), Some(4));
        assert_eq!(default_value("color").and_then(PropertyValue::sheet_name), None);
        assert!(default_value("no-such-property").is_none());
        assert_eq!(default_values().len(), INITIAL_VALUES.len());
    }

    /// Inheritance flags follow CSS 2.1.
    #[test]
    fn inheritance_flags() {
        assert!(is_inherited_property("color"));
        assert!(is_inherited_property("font-family"));
        assert!(!is_inherited_property("margin-top"));
        assert!(!is_inherited_property("background-color"));
    }
}
