//! Shorthand expansion into canonical longhand properties.
//! Spec: <https://www.w3.org/TR/CSS21/about.html#shorthand>

use crate::PropertyValue;
use css_syntax::Declaration;
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical property name to winning value, for one declaration block or one element.
pub type DeclarationMap = HashMap<String, PropertyValue>;

/// Longhands produced by one shorthand, in output order.
pub type Longhands = Vec<(&'static str, PropertyValue)>;

/// Keywords that apply to every longhand of a shorthand at once.
const GLOBAL_KEYWORDS: [&str; 3] = ["inherit", "initial", "unset"];

const BORDER_STYLES: [&str; 10] = [
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

const WIDTH_KEYWORDS: [&str; 3] = ["thin", "medium", "thick"];

const FONT_STYLES: [&str; 2] = ["italic", "oblique"];

const FONT_WEIGHTS: [&str; 12] = [
    "bold", "bolder", "lighter", "100", "200", "300", "400", "500", "600", "700", "800", "900",
];

const FONT_STRETCHES: [&str; 8] = [
    "ultra-condensed",
    "extra-condensed",
    "condensed",
    "semi-condensed",
    "semi-expanded",
    "expanded",
    "extra-expanded",
    "ultra-expanded",
];

const SYSTEM_FONTS: [&str; 6] = ["caption", "icon", "menu", "message-box", "small-caption", "status-bar"];

const BACKGROUND_REPEATS: [&str; 6] = ["repeat", "repeat-x", "repeat-y", "no-repeat", "space", "round"];

const BACKGROUND_ATTACHMENTS: [&str; 3] = ["scroll", "fixed", "local"];

const POSITION_KEYWORDS: [&str; 5] = ["left", "right", "top", "bottom", "center"];

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// How a shorthand maps onto its longhands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expansion {
    /// One to four values distributed over top, right, bottom and left.
    Edges([&'static str; 4]),
    /// Width, style and color in any order, for every listed side.
    Border(&'static [&'static str]),
    /// Width, style and color of the outline.
    Outline,
    /// `[style || variant || weight || stretch]? size[/line-height]? family`.
    Font,
    /// `type || position || image`.
    ListStyle,
    /// `color || image || repeat || attachment || position`.
    Background,
}

/// Registration table of every shorthand the normalizer expands.
static EXPANSIONS: Lazy<HashMap<&'static str, Expansion>> = Lazy::new(|| {
    HashMap::from([
        (
            "margin",
            Expansion::Edges(["margin-top", "margin-right", "margin-bottom", "margin-left"]),
        ),
        (
            "padding",
            Expansion::Edges(["padding-top", "padding-right", "padding-bottom", "padding-left"]),
        ),
        (
            "border-width",
            Expansion::Edges([
                "border-top-width",
                "border-right-width",
                "border-bottom-width",
                "border-left-width",
            ]),
        ),
        (
            "border-style",
            Expansion::Edges([
                "border-top-style",
                "border-right-style",
                "border-bottom-style",
                "border-left-style",
            ]),
        ),
        (
            "border-color",
            Expansion::Edges([
                "border-top-color",
                "border-right-color",
                "border-bottom-color",
                "border-left-color",
            ]),
        ),
        ("border", Expansion::Border(&SIDES)),
        ("border-top", Expansion::Border(&["top"])),
        ("border-right", Expansion::Border(&["right"])),
        ("border-bottom", Expansion::Border(&["bottom"])),
        ("border-left", Expansion::Border(&["left"])),
        ("outline", Expansion::Outline),
        ("font", Expansion::Font),
        ("list-style", Expansion::ListStyle),
        ("background", Expansion::Background),
    ])
});

/// The registered expansion for `property_name`, if it is a shorthand.
#[inline]
pub fn expansion_for(property_name: &str) -> Option<Expansion> {
    EXPANSIONS.get(property_name).copied()
}

impl Expansion {
    /// Every longhand this shorthand sets.
    pub fn longhands(self) -> Vec<&'static str> {
        match self {
            Self::Edges(names) => names.to_vec(),
            Self::Border(sides) => sides
                .iter()
                .flat_map(|side| border_longhands(side))
                .collect(),
            Self::Outline => vec!["outline-width", "outline-style", "outline-color"],
            Self::Font => vec![
                "font-style",
                "font-variant",
                "font-weight",
                "font-stretch",
                "font-size",
                "line-height",
                "font-family",
            ],
            Self::ListStyle => vec!["list-style-type", "list-style-position", "list-style-image"],
            Self::Background => vec![
                "background-color",
                "background-image",
                "background-repeat",
                "background-attachment",
                "background-position",
            ],
        }
    }

    /// Expand `value`. `None` means the shorthand is invalid and sets nothing.
    pub fn expand(self, value: &PropertyValue) -> Option<Longhands> {
        if GLOBAL_KEYWORDS.iter().any(|keyword| value.is_keyword(keyword)) {
            return Some(
                self.longhands()
                    .into_iter()
                    .map(|name| (name, value.clone()))
                    .collect(),
            );
        }
        match self {
            Self::Edges(names) => expand_edges(names, value),
            Self::Border(sides) => expand_border(sides, value),
            Self::Outline => expand_outline(value),
            Self::Font => expand_font(value),
            Self::ListStyle => expand_list_style(value),
            Self::Background => expand_background(value),
        }
    }
}

fn border_longhands(side: &str) -> [&'static str; 3] {
    match side {
        "top" => ["border-top-width", "border-top-style", "border-top-color"],
        "right" => ["border-right-width", "border-right-style", "border-right-color"],
        "bottom" => ["border-bottom-width", "border-bottom-style", "border-bottom-color"],
        _ => ["border-left-width", "border-left-style", "border-left-color"],
    }
}

fn is_one_of(component: &str, keywords: &[&str]) -> bool {
    keywords
        .iter()
        .any(|keyword| component.eq_ignore_ascii_case(keyword))
}

/// Numbers, lengths and percentages.
fn is_numeric(component: &str) -> bool {
    component
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_digit() || matches!(first, '.' | '+' | '-'))
        && component.chars().any(|character| character.is_ascii_digit())
}

fn is_image(component: &str) -> bool {
    let lower = component.to_ascii_lowercase();
    lower == "none" || lower.starts_with("url(") || lower.contains("gradient(")
}

/// Store `component` in `slot` unless something already claimed it.
fn claim(slot: &mut Option<String>, component: &str) -> Option<()> {
    if slot.is_some() {
        return None;
    }
    *slot = Some(component.to_owned());
    Some(())
}

/// `margin: 1px 2px` style distribution.
fn expand_edges(names: [&'static str; 4], value: &PropertyValue) -> Option<Longhands> {
    let components = value.components();
    if components.iter().any(|component| component == ",") {
        return None;
    }
    let order: [usize; 4] = match components.len() {
        1 => [0, 0, 0, 0],
        2 => [0, 1, 0, 1],
        3 => [0, 1, 2, 1],
        4 => [0, 1, 2, 3],
        _ => return None,
    };
    names
        .into_iter()
        .zip(order)
        .map(|(name, index)| {
            components
                .get(index)
                .map(|component| (name, value.derive([component.clone()])))
        })
        .collect()
}

/// Width, style and color in any order. Missing parts take their initial value.
fn width_style_color(
    value: &PropertyValue,
    default_color: &str,
) -> Option<(String, String, String)> {
    let mut width = None;
    let mut style = None;
    let mut color = None;
    for component in value.components() {
        if component == "," {
            return None;
        }
        if is_one_of(component, &BORDER_STYLES) {
            claim(&mut style, component)?;
        } else if is_one_of(component, &WIDTH_KEYWORDS) || is_numeric(component) {
            claim(&mut width, component)?;
        } else {
            claim(&mut color, component)?;
        }
    }
    Some((
        width.unwrap_or_else(|| "medium".to_owned()),
        style.unwrap_or_else(|| "none".to_owned()),
        color.unwrap_or_else(|| default_color.to_owned()),
    ))
}

fn expand_border(sides: &[&str], value: &PropertyValue) -> Option<Longhands> {
    let (width, style, color) = width_style_color(value, "currentColor")?;
    Some(
        sides
            .iter()
            .flat_map(|side| {
                let [width_name, style_name, color_name] = border_longhands(side);
                [
                    (width_name, value.derive([width.clone()])),
                    (style_name, value.derive([style.clone()])),
                    (color_name, value.derive([color.clone()])),
                ]
            })
            .collect(),
    )
}

fn expand_outline(value: &PropertyValue) -> Option<Longhands> {
    let (width, style, color) = width_style_color(value, "invert")?;
    Some(vec![
        ("outline-width", value.derive([width])),
        ("outline-style", value.derive([style])),
        ("outline-color", value.derive([color])),
    ])
}

/// Font shorthand. System font keywords are not supported and make the value invalid.
fn expand_font(value: &PropertyValue) -> Option<Longhands> {
    let components = value.components();
    if components.len() == 1 && components.iter().any(|component| is_one_of(component, &SYSTEM_FONTS)) {
        return None;
    }
    let mut style = None;
    let mut variant = None;
    let mut weight = None;
    let mut stretch = None;
    let mut normals = 0_usize;
    let mut rest = components.iter().peekable();
    let size_component = loop {
        let component = rest.next()?;
        if component.eq_ignore_ascii_case("normal") {
            normals += 1;
        } else if is_one_of(component, &FONT_STYLES) {
            claim(&mut style, component)?;
        } else if component.eq_ignore_ascii_case("small-caps") {
            claim(&mut variant, component)?;
        } else if is_one_of(component, &FONT_WEIGHTS) {
            claim(&mut weight, component)?;
        } else if is_one_of(component, &FONT_STRETCHES) {
            claim(&mut stretch, component)?;
        } else {
            break component;
        }
    };
    let claimed = [&style, &variant, &weight, &stretch]
        .iter()
        .filter(|slot| slot.is_some())
        .count();
    if claimed + normals > 4 {
        return None;
    }

    let (size, mut line_height) = match size_component.split_once('/') {
        Some((size, line_height)) if !line_height.is_empty() => {
            (size.to_owned(), Some(line_height.to_owned()))
        }
        Some((size, _)) => (size.to_owned(), Some(rest.next()?.clone())),
        None => (size_component.clone(), None),
    };
    if line_height.is_none() && rest.peek().is_some_and(|next| next.starts_with('/')) {
        let slash = rest.next()?;
        line_height = Some(match slash.strip_prefix('/') {
            Some(tail) if !tail.is_empty() => tail.to_owned(),
            _ => rest.next()?.clone(),
        });
    }
    let family: Vec<String> = rest.cloned().collect();
    if size.is_empty() || family.is_empty() || family.first().is_some_and(|first| first == ",") {
        return None;
    }

    let normal = || "normal".to_owned();
    Some(vec![
        ("font-style", value.derive([style.unwrap_or_else(normal)])),
        ("font-variant", value.derive([variant.unwrap_or_else(normal)])),
        ("font-weight", value.derive([weight.unwrap_or_else(normal)])),
        ("font-stretch", value.derive([stretch.unwrap_or_else(normal)])),
        ("font-size", value.derive([size])),
        ("line-height", value.derive([line_height.unwrap_or_else(normal)])),
        ("font-family", value.derive(family)),
    ])
}

fn expand_list_style(value: &PropertyValue) -> Option<Longhands> {
    let mut list_type = None;
    let mut position = None;
    let mut image = None;
    let mut nones = 0_usize;
    for component in value.components() {
        if component.eq_ignore_ascii_case("none") {
            nones += 1;
        } else if is_one_of(component, &["inside", "outside"]) {
            claim(&mut position, component)?;
        } else if is_image(component) {
            claim(&mut image, component)?;
        } else if component == "," {
            return None;
        } else {
            claim(&mut list_type, component)?;
        }
    }
    for _ in 0..nones {
        if list_type.is_none() {
            list_type = Some("none".to_owned());
        } else {
            claim(&mut image, "none")?;
        }
    }
    Some(vec![
        ("list-style-type", value.derive([list_type.unwrap_or_else(|| "disc".to_owned())])),
        (
            "list-style-position",
            value.derive([position.unwrap_or_else(|| "outside".to_owned())]),
        ),
        ("list-style-image", value.derive([image.unwrap_or_else(|| "none".to_owned())])),
    ])
}

fn expand_background(value: &PropertyValue) -> Option<Longhands> {
    let mut color = None;
    let mut image = None;
    let mut repeat = None;
    let mut attachment = None;
    let mut position: Vec<String> = Vec::new();
    for component in value.components() {
        if component == "," {
            return None;
        }
        if is_image(component) {
            claim(&mut image, component)?;
        } else if is_one_of(component, &BACKGROUND_REPEATS) {
            claim(&mut repeat, component)?;
        } else if is_one_of(component, &BACKGROUND_ATTACHMENTS) {
            claim(&mut attachment, component)?;
        } else if is_one_of(component, &POSITION_KEYWORDS) || is_numeric(component) {
            if position.len() == 2 {
                return None;
            }
            position.push(component.clone());
        } else {
            claim(&mut color, component)?;
        }
    }
    let position = if position.is_empty() {
        vec!["0%".to_owned(), "0%".to_owned()]
    } else {
        position
    };
    Some(vec![
        ("background-color", value.derive([color.unwrap_or_else(|| "transparent".to_owned())])),
        ("background-image", value.derive([image.unwrap_or_else(|| "none".to_owned())])),
        ("background-repeat", value.derive([repeat.unwrap_or_else(|| "repeat".to_owned())])),
        (
            "background-attachment",
            value.derive([attachment.unwrap_or_else(|| "scroll".to_owned())]),
        ),
        ("background-position", value.derive(position)),
    ])
}

/// Expand one declaration into canonical longhands. Unregistered properties
/// pass through under their own name; an invalid shorthand yields nothing.
pub fn expand_declaration(declaration: &Declaration, sheet_name: Option<&str>) -> Vec<(String, PropertyValue)> {
    let value = PropertyValue::parse(&declaration.value, sheet_name, declaration.important);
    let Some(expansion) = expansion_for(&declaration.name) else {
        return vec![(declaration.name.clone(), value)];
    };
    expansion.expand(&value).map_or_else(
        || {
            debug!(
                "Ignoring invalid {} shorthand value {:?}",
                declaration.name, declaration.value
            );
            Vec::new()
        },
        |longhands| {
            longhands
                .into_iter()
                .map(|(name, longhand)| (name.to_owned(), longhand))
                .collect()
        },
    )
}

/// Normalize a declaration block. Later declarations of the same effective
/// property overwrite earlier ones.
pub fn normalize_style_declaration(declarations: &[Declaration], sheet_name: Option<&str>) -> DeclarationMap {
    let mut map = DeclarationMap::new();
    for declaration in declarations {
        map.extend(expand_declaration(declaration, sheet_name));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_syntax::parse_declaration_list;

    fn normalized(css: &str) -> DeclarationMap {
        normalize_style_declaration(&parse_declaration_list(css), Some("style.css"))
    }

    fn text(map: &DeclarationMap, name: &str) -> Option<String> {
        map.get(name).map(PropertyValue::css_text)
    }

    /// Edge shorthands follow the one-to-four value rule.
    #[test]
    fn expands_edges() {
        let map = normalized("margin: 1px 2px 3px; padding: 4px");
        assert_eq!(text(&map, "margin-top").as_deref(), Some("1px"));
        assert_eq!(text(&map, "margin-right").as_deref(), Some("2px"));
        assert_eq!(text(&map, "margin-bottom").as_deref(), Some("3px"));
        assert_eq!(text(&map, "margin-left").as_deref(), Some("2px"));
        assert_eq!(text(&map, "padding-left").as_deref(), Some("4px"));
        assert!(!map.contains_key("margin"));
    }

    /// Later declarations overwrite earlier ones, including through shorthands.
    #[test]
    fn last_declaration_wins() {
        let map = normalized("margin-left: 5px; margin: 0; color: red; color: blue");
        assert_eq!(text(&map, "margin-left").as_deref(), Some("0"));
        assert_eq!(text(&map, "color").as_deref(), Some("blue"));

        let map = normalized("margin: 0; margin-left: 5px");
        assert_eq!(text(&map, "margin-left").as_deref(), Some("5px"));
    }

    /// Importance and the sheet tag reach every longhand.
    #[test]
    fn longhands_keep_priority_and_sheet() {
        let map = normalized("border: 1px solid red !important");
        assert_eq!(map.len(), 12);
        for (name, value) in &map {
            assert!(value.is_important(), "{name}");
            assert_eq!(value.sheet_name(), Some("style.css"));
        }
        assert_eq!(text(&map, "border-left-style").as_deref(), Some("solid"));
        assert_eq!(text(&map, "border-top-color").as_deref(), Some("red"));
    }

    /// Missing border parts take their initial values.
    #[test]
    fn border_defaults() {
        let map = normalized("border-top: dashed; outline: thick");
        assert_eq!(text(&map, "border-top-width").as_deref(), Some("medium"));
        assert_eq!(text(&map, "border-top-color").as_deref(), Some("currentColor"));
        assert!(!map.contains_key("border-left-style"));
        assert_eq!(text(&map, "outline-color").as_deref(), Some("invert"));
        assert_eq!(text(&map, "outline-style").as_deref(), Some("none"));
    }

    /// The font shorthand handles line heights and multi-word family lists.
    #[test]
    fn expands_font() {
        let map = normalized("font: italic bold 12px/1.5 \"Times New Roman\", serif");
        assert_eq!(text(&map, "font-style").as_deref(), Some("italic"));
        assert_eq!(text(&map, "font-weight").as_deref(), Some("bold"));
        assert_eq!(text(&map, "font-variant").as_deref(), Some("normal"));
        assert_eq!(text(&map, "font-size").as_deref(), Some("12px"));
        assert_eq!(text(&map, "line-height").as_deref(), Some("1.5"));
        assert_eq!(text(&map, "font-family").as_deref(), Some("\"Times New Roman\", serif"));

        let spaced = normalized("font: 10pt / 2 Georgia");
        assert_eq!(text(&spaced, "line-height").as_deref(), Some("2"));
        assert_eq!(text(&spaced, "font-family").as_deref(), Some("Georgia"));
    }

    /// Invalid shorthands contribute nothing.
    #[test]
    fn invalid_shorthands_are_dropped() {
        assert!(normalized("font: caption").is_empty());
        assert!(normalized("font: bold").is_empty());
        assert!(normalized("margin: 1px 2px 3px 4px 5px").is_empty());
        assert!(normalized("border: solid dashed").is_empty());
    }

    /// Global keywords apply to every longhand.
    #[test]
    fn global_keywords_fan_out() {
        let map = normalized("list-style: inherit");
        assert_eq!(map.len(), 3);
        assert!(map.values().all(|value| value.is_keyword("inherit")));

        let commented = normalized("margin: inherit/**/");
        assert_eq!(commented.len(), 4);
        assert!(commented.values().all(|value| value.is_keyword("inherit")));
    }

    /// List style and background pick their parts in any order.
    #[test]
    fn expands_list_style_and_background() {
        let map = normalized("list-style: none inside; background: url(a.png) no-repeat #fff center");
        assert_eq!(text(&map, "list-style-type").as_deref(), Some("none"));
        assert_eq!(text(&map, "list-style-position").as_deref(), Some("inside"));
        assert_eq!(text(&map, "list-style-image").as_deref(), Some("none"));
        assert_eq!(text(&map, "background-image").as_deref(), Some("url(a.png)"));
        assert_eq!(text(&map, "background-repeat").as_deref(), Some("no-repeat"));
        assert_eq!(text(&map, "background-color").as_deref(), Some("#fff"));
        assert_eq!(text(&map, "background-position").as_deref(), Some("center"));
        assert_eq!(text(&map, "background-attachment").as_deref(), Some("scroll"));

        let defaults = normalized("background: red");
        assert_eq!(text(&defaults, "background-position").as_deref(), Some("0% 0%"));
    }

    /// Unregistered properties pass through unchanged.
    #[test]
    fn passes_through_unknown_properties() {
        let map = normalized("-webkit-hyphens: auto; color: red");
        assert_eq!(text(&map, "-webkit-hyphens").as_deref(), Some("auto"));
        assert_eq!(expansion_for("color"), None);
        assert_eq!(expansion_for("border-top"), Some(Expansion::Border(&["top"])));
    }
}
