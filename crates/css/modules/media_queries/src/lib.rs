//! Media Queries Level 3 - Evaluating media query lists for static documents.
//! Spec: <https://www.w3.org/TR/mediaqueries-3/>

#![forbid(unsafe_code)]

use cssparser::{ParseError, Parser, ParserInput};
use log::debug;

/// Media features that describe a physical device. A static document has no
/// device, so queries testing them never match.
const DEVICE_FEATURES: [&str; 13] = [
    "device-width",
    "min-device-width",
    "max-device-width",
    "device-height",
    "min-device-height",
    "max-device-height",
    "device-aspect-ratio",
    "min-device-aspect-ratio",
    "max-device-aspect-ratio",
    "device-pixel-ratio",
    "-webkit-device-pixel-ratio",
    "-webkit-min-device-pixel-ratio",
    "-webkit-max-device-pixel-ratio",
];

/// One parsed media query.
/// Spec: Section 2 - Media queries
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct MediaQuery {
    /// `not` qualifier.
    negated: bool,
    /// Media type, lowercased; `None` when only features were given.
    media_type: Option<String>,
    /// Feature names in the query, lowercased.
    features: Vec<String>,
}

/// The medium a document is being styled for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaContext {
    /// Accepted media type in addition to `all`.
    media_type: String,
    /// Feature names that make a query fail.
    failing_features: Vec<String>,
}

impl Default for MediaContext {
    #[inline]
    fn default() -> Self {
        Self::new("screen")
    }
}

impl MediaContext {
    /// Context for `media_type` with the default failing device features.
    pub fn new(media_type: &str) -> Self {
        Self {
            media_type: media_type.trim().to_ascii_lowercase(),
            failing_features: DEVICE_FEATURES.iter().map(|name| (*name).to_owned()).collect(),
        }
    }

    /// Replace the list of features that always fail.
    #[must_use]
    pub fn with_failing_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.failing_features = features
            .into_iter()
            .map(|name| name.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    /// The accepted media type.
    #[inline]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Whether a media query list applies in this context.
    ///
    /// An empty list always applies. A list that cannot be parsed also applies,
    /// so that unknown syntax never hides content.
    /// Spec: Section 3 - Syntax; Section 2.1 - Comma-separated lists
    pub fn media_ok(&self, media_text: &str) -> bool {
        let trimmed = media_text.trim();
        if trimmed.is_empty() {
            return true;
        }
        let mut input = ParserInput::new(trimmed);
        let mut parser = Parser::new(&mut input);
        match parser.parse_comma_separated(parse_query) {
            Ok(queries) => queries.iter().any(|query| self.query_ok(query)),
            Err(err) => {
                debug!("Unparseable media query {trimmed:?} treated as matching: {err:?}");
                true
            }
        }
    }

    /// Evaluate a single query.
    fn query_ok(&self, query: &MediaQuery) -> bool {
        let type_ok = query
            .media_type
            .as_deref()
            .is_none_or(|name| name == "all" || name == self.media_type);
        let features_ok = !query
            .features
            .iter()
            .any(|feature| self.failing_features.contains(feature));
        (type_ok && features_ok) != query.negated
    }
}

/// Parse `[not|only]? type [and (feature)]*` or `(feature) [and (feature)]*`.
fn parse_query<'input>(input: &mut Parser<'input, '_>) -> Result<MediaQuery, ParseError<'input, ()>> {
    let mut query = MediaQuery::default();
    if input
        .try_parse(|parser| parser.expect_ident_matching("not"))
        .is_ok()
    {
        query.negated = true;
    } else if input
        .try_parse(|parser| parser.expect_ident_matching("only"))
        .is_ok()
    {
        // `only` only hides the query from legacy user agents.
    }
    let media_type = input.try_parse(|parser| {
        parser
            .expect_ident()
            .map(|ident| ident.to_ascii_lowercase())
    });
    if let Ok(name) = media_type {
        query.media_type = Some(name);
    } else {
        query.features.push(parse_feature(input)?);
    }
    while input
        .try_parse(|parser| parser.expect_ident_matching("and"))
        .is_ok()
    {
        query.features.push(parse_feature(input)?);
    }
    input.expect_exhausted()?;
    Ok(query)
}

/// Parse `( name [: value] )`, returning the lowercased feature name.
fn parse_feature<'input>(input: &mut Parser<'input, '_>) -> Result<String, ParseError<'input, ()>> {
    input.expect_parenthesis_block()?;
    input.parse_nested_block(parse_feature_body)
}

/// Body of a feature block; the value is not evaluated.
fn parse_feature_body<'input>(block: &mut Parser<'input, '_>) -> Result<String, ParseError<'input, ()>> {
    let name = block.expect_ident()?.to_ascii_lowercase();
    while block.next().is_ok() {}
    Ok(name)
}
