use css_media_queries::MediaContext;
use css_syntax::Stylesheet;
use html::Document;
use std::collections::HashSet;

/// Pseudo-classes and pseudo-elements that have no meaning for a static
/// document. Selectors using them still match, but their declarations are
/// routed to the pseudo-style map.
pub const INAPPROPRIATE_PSEUDO_CLASSES: [&str; 13] = [
    "active",
    "after",
    "before",
    "checked",
    "disabled",
    "enabled",
    "first-letter",
    "first-line",
    "focus",
    "hover",
    "link",
    "target",
    "visited",
];

/// `<link type>` values accepted as stylesheets.
pub const STYLESHEET_MIME_TYPES: [&str; 3] = ["text/css", "text/x-oeb1-css", "text/x-oeb-css"];

/// A container resource after parsing.
#[derive(Clone, Copy, Debug)]
pub enum Parsed<'res> {
    Stylesheet(&'res Stylesheet),
    Document(&'res Document),
}

/// Knobs for one resolution pass.
#[derive(Clone, Debug)]
pub struct CascadeOptions {
    /// Media the document is styled for.
    pub media: MediaContext,
    /// Lowercased names matched as always-true and routed to the pseudo-style map.
    pub inappropriate_pseudo_classes: HashSet<String>,
    /// Sheet name tagged on values from the user-agent stylesheet.
    pub user_agent_sheet_name: String,
    /// Accepted `<link type>` values, lowercased.
    pub stylesheet_mime_types: Vec<String>,
}

impl Default for CascadeOptions {
    #[inline]
    fn default() -> Self {
        Self {
            media: MediaContext::default(),
            inappropriate_pseudo_classes: INAPPROPRIATE_PSEUDO_CLASSES
                .iter()
                .map(|name| (*name).to_owned())
                .collect(),
            user_agent_sheet_name: "user-agent.css".to_owned(),
            stylesheet_mime_types: STYLESHEET_MIME_TYPES
                .iter()
                .map(|mime| (*mime).to_owned())
                .collect(),
        }
    }
}

impl CascadeOptions {
    /// Style for `media_type` with every other option at its default.
    #[inline]
    pub fn for_media(media_type: &str) -> Self {
        Self {
            media: MediaContext::new(media_type),
            ..Self::default()
        }
    }

    /// Whether a `<link type>` value names a stylesheet (ASCII case-insensitive).
    pub fn is_stylesheet_type(&self, mime: &str) -> bool {
        let mime = mime.trim();
        self.stylesheet_mime_types
            .iter()
            .any(|known| known.eq_ignore_ascii_case(mime))
    }
}
