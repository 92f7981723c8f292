//! Splitting of raw value and prelude text into top-level pieces.
//! Spec: <https://www.w3.org/TR/css-syntax-3/#component-value>

use cssparser::{ParseError, Parser, ParserInput, SourcePosition, Token};

/// How a token affects component boundaries.
enum Piece {
    /// Whitespace ends the current component.
    Space,
    /// A comma ends the current component and is kept as its own component.
    Comma,
    /// Comments never extend a component.
    Comment,
    /// A function or block; its contents belong to the current component.
    Block,
    /// Any other token extends the current component.
    Plain,
}

/// Source range of a token or of the component being built.
type Span = (SourcePosition, SourcePosition);

/// Classify a token for component splitting.
const fn classify(token: &Token<'_>) -> Piece {
    match token {
        Token::WhiteSpace(_) => Piece::Space,
        Token::Comma => Piece::Comma,
        Token::Comment(_) => Piece::Comment,
        Token::Function(_)
        | Token::ParenthesisBlock
        | Token::SquareBracketBlock
        | Token::CurlyBracketBlock => Piece::Block,
        _ => Piece::Plain,
    }
}

/// The next top-level token with its source range. Blocks are consumed
/// whole, so their range ends after the closing bracket.
fn next_piece(parser: &mut Parser<'_, '_>) -> Option<(Piece, Span)> {
    let start = parser.position();
    let piece = classify(parser.next_including_whitespace_and_comments().ok()?);
    if matches!(piece, Piece::Block) {
        parser
            .parse_nested_block(|nested| {
                while nested.next_including_whitespace_and_comments().is_ok() {}
                Ok::<(), ParseError<'_, ()>>(())
            })
            .ok()?;
    }
    Some((piece, (start, parser.position())))
}

/// Grow `run` to cover `span`.
fn extend(run: &mut Option<Span>, span: Span) {
    let start = run.map_or(span.0, |current| current.0);
    *run = Some((start, span.1));
}

/// Split a declaration value into its top-level component values.
///
/// Components are separated by whitespace; commas are kept as standalone `","`
/// components. Functions and blocks stay whole, so `rgb(1, 2, 3)` and
/// `12px/1.5` are single components. Comments before or after a component
/// are not part of it.
pub fn split_value_components(value: &str) -> Vec<String> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    let mut out: Vec<String> = Vec::new();
    let mut run: Option<Span> = None;

    while let Some((piece, span)) = next_piece(&mut parser) {
        match piece {
            Piece::Space => flush(&parser, &mut out, run.take()),
            Piece::Comma => {
                flush(&parser, &mut out, run.take());
                out.push(",".to_owned());
            }
            Piece::Comment => {}
            Piece::Block | Piece::Plain => extend(&mut run, span),
        }
    }
    flush(&parser, &mut out, run);
    out
}

/// Push the source text of `run` as one component.
fn flush(parser: &Parser<'_, '_>, out: &mut Vec<String>, run: Option<Span>) {
    if let Some((start, end)) = run {
        let text = parser.slice(start..end).trim();
        if !text.is_empty() {
            out.push(text.to_owned());
        }
    }
}

/// Split a selector list on top-level commas. Commas nested in functional
/// pseudo-classes or attribute values are left alone, and comments around a
/// clause are dropped.
pub fn split_selector_list(prelude: &str) -> Vec<String> {
    let mut input = ParserInput::new(prelude);
    let mut parser = Parser::new(&mut input);
    let mut out: Vec<String> = Vec::new();
    let mut run: Option<Span> = None;

    while let Some((piece, span)) = next_piece(&mut parser) {
        match piece {
            Piece::Comma => flush(&parser, &mut out, run.take()),
            Piece::Space | Piece::Comment => {}
            Piece::Block | Piece::Plain => extend(&mut run, span),
        }
    }
    flush(&parser, &mut out, run);
    out
}
