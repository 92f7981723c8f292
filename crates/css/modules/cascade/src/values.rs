//! Declared property values as ordered component lists.
//! Spec: <https://www.w3.org/TR/css-values-4/#component-types>

use core::fmt;
use css_syntax::split_value_components;
use smallvec::SmallVec;

/// A declared value: one or more component values, the sheet whose location
/// relative URLs in it resolve against, and its importance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyValue {
    /// Top-level components in source order; commas are standalone `","` items.
    components: SmallVec<String, 2>,
    /// Name of the sheet the value was declared in, `None` for built-in defaults.
    sheet_name: Option<String>,
    /// Whether the declaration carried `!important`.
    important: bool,
}

impl PropertyValue {
    /// Build a value from already split components.
    pub fn new<I>(components: I, sheet_name: Option<&str>, important: bool) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            components: components.into_iter().collect(),
            sheet_name: sheet_name.map(ToOwned::to_owned),
            important,
        }
    }

    /// Split raw value text into components.
    pub fn parse(text: &str, sheet_name: Option<&str>, important: bool) -> Self {
        Self::new(split_value_components(text), sheet_name, important)
    }

    /// A value with other components but the same sheet and importance.
    /// Used for longhands produced by shorthand expansion.
    pub fn derive<I>(&self, components: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            components: components.into_iter().collect(),
            sheet_name: self.sheet_name.clone(),
            important: self.important,
        }
    }

    /// All components in order.
    #[inline]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// The first component.
    #[inline]
    pub fn first(&self) -> Option<&str> {
        self.components.first().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Sheet relative to which URLs in this value resolve.
    #[inline]
    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }

    #[inline]
    pub const fn is_important(&self) -> bool {
        self.important
    }

    /// True when the value is the single keyword `keyword` (ASCII case-insensitive).
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.len() == 1 && self.first().is_some_and(|first| first.eq_ignore_ascii_case(keyword))
    }

    /// Serialize back to CSS text: components joined by spaces, commas attached
    /// to the preceding component.
    pub fn css_text(&self) -> String {
        let mut out = String::new();
        for component in &self.components {
            if component != "," && !out.is_empty() {
                out.push(' ');
            }
            out.push_str(component);
        }
        out
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.css_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Components keep their order and the sheet tag travels with the value.
    #[test]
    fn keeps_components_and_sheet() {
        let value = PropertyValue::parse("url(a.png) no-repeat", Some("css/main.css"), true);
        assert_eq!(value.components(), ["url(a.png)", "no-repeat"]);
        assert_eq!(value.first(), Some("url(a.png)"));
        assert_eq!(value.sheet_name(), Some("css/main.css"));
        assert!(value.is_important());

        let derived = value.derive(["none".to_owned()]);
        assert_eq!(derived.sheet_name(), Some("css/main.css"));
        assert!(derived.is_important());
        assert!(derived.is_keyword("NONE"));
    }

    /// Serialization attaches commas to the preceding component.
    #[test]
    fn css_text_round_trips_lists() {
        let value = PropertyValue::parse("\"Times New Roman\" , Georgia,serif", None, false);
        assert_eq!(value.css_text(), "\"Times New Roman\", Georgia, serif");
        assert_eq!(value.to_string(), value.css_text());
    }
}
