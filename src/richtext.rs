//! Utilities for working with styled text fragments.
//!
//! The guide copy is authored with a tiny markdown-inspired syntax (`**bold**`, `*italic*` and
//! `[color=#RRGGBB]{...}`). This module turns that syntax into [`Span`]s which are later converted
//! to [`genpdf`][genpdf] styled strings by the element layer.
//!
//! [genpdf]: https://docs.rs/genpdf/

use std::borrow::Cow;
use std::fmt;

use genpdf::style::{Color, Style, StyledString};

/// A slice of text together with inline style attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    color: Option<Color>,
}

impl Span {
    /// Creates a new span with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Returns the raw text contained in this span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the span should be rendered in bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns whether the span should be rendered in italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Returns the configured color for the span, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Sets the bold flag and returns the updated span.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Sets the italic flag and returns the updated span.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Sets the span color and returns the updated span.
    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    /// Convenience shorthand that marks the span as bold.
    pub fn bold(self) -> Self {
        self.with_bold(true)
    }

    /// Convenience shorthand that marks the span as italic.
    pub fn italic(self) -> Self {
        self.with_italic(true)
    }

    /// Convenience shorthand that assigns a color to the span.
    pub fn colored(self, color: Color) -> Self {
        self.with_color(Some(color))
    }

    /// Returns a copy of the span with different text but the same styling.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    /// Builds the inline [`Style`] for the span.
    pub fn style(&self) -> Style {
        let mut style = Style::new();
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span to a [`StyledString`].
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.style())
    }
}

impl From<&Span> for StyledString {
    fn from(span: &Span) -> Self {
        span.to_styled_string()
    }
}

impl From<Span> for StyledString {
    fn from(span: Span) -> Self {
        span.to_styled_string()
    }
}

/// Concatenates the text of all spans, dropping styling.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(Span::text).collect()
}

/// Parse errors produced by [`parse_markup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    index: usize,
    message: String,
}

impl ParseError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Byte index in the original input string where the error was detected.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Human-readable description of the parsing error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.index)
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Copy, Debug, Default)]
struct StyleState {
    bold: bool,
    italic: bool,
    color: Option<Color>,
}

impl StyleState {
    fn to_span(self, text: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            bold: self.bold,
            italic: self.italic,
            color: self.color,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Bold,
    Italic,
    Color,
}

impl Marker {
    fn closing_token(self) -> &'static str {
        match self {
            Marker::Bold => "**",
            Marker::Italic => "*",
            Marker::Color => "}",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Marker::Bold => "bold span",
            Marker::Italic => "italic span",
            Marker::Color => "color span",
        }
    }
}

const COLOR_PREFIX: &str = "[color=";

/// Parses the guide markup into a list of [`Span`]s.
///
/// The supported constructs are:
///
/// - `**bold**` for bold text
/// - `*italic*` for italic text
/// - `[color=#RRGGBB]{text}` for colored text
///
/// Square brackets that do not open a color directive are kept verbatim, which lets the copy
/// mention placeholders such as `[crochets]`. Line breaks are preserved inside the spans.
pub fn parse_markup(input: &str) -> Result<Vec<Span>, ParseError> {
    let (spans, _) = parse_inner(input, 0, StyleState::default(), None)?;
    Ok(spans)
}

fn parse_inner(
    input: &str,
    mut index: usize,
    state: StyleState,
    closing_marker: Option<Marker>,
) -> Result<(Vec<Span>, usize), ParseError> {
    let mut spans = Vec::new();
    let mut buffer = String::new();

    while index < input.len() {
        let rest = &input[index..];

        if let Some(marker) = closing_marker {
            if rest.starts_with(marker.closing_token()) {
                flush_buffer(&mut buffer, &mut spans, state);
                index += marker.closing_token().len();
                return Ok((spans, index));
            }
        }

        let opened = if rest.starts_with("**") {
            index += 2;
            Some((Marker::Bold, StyleState { bold: true, ..state }))
        } else if rest.starts_with('*') {
            index += 1;
            Some((
                Marker::Italic,
                StyleState {
                    italic: true,
                    ..state
                },
            ))
        } else if rest.starts_with(COLOR_PREFIX) {
            let (color, after_directive) = parse_color_directive(input, index)?;
            index = after_directive;
            Some((
                Marker::Color,
                StyleState {
                    color: Some(color),
                    ..state
                },
            ))
        } else {
            None
        };

        if let Some((marker, nested_state)) = opened {
            flush_buffer(&mut buffer, &mut spans, state);
            let (nested, new_index) = parse_inner(input, index, nested_state, Some(marker))?;
            spans.extend(nested);
            index = new_index;
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        buffer.push(ch);
        index += ch.len_utf8();
    }

    if let Some(marker) = closing_marker {
        Err(ParseError::new(
            index,
            format!("unterminated {}", marker.description()),
        ))
    } else {
        flush_buffer(&mut buffer, &mut spans, state);
        Ok((spans, index))
    }
}

fn flush_buffer(buffer: &mut String, spans: &mut Vec<Span>, state: StyleState) {
    if buffer.is_empty() {
        return;
    }
    spans.push(state.to_span(std::mem::take(buffer)));
}

fn parse_color_directive(input: &str, index: usize) -> Result<(Color, usize), ParseError> {
    let start_hex = index + COLOR_PREFIX.len();
    if !input[start_hex..].starts_with('#') {
        return Err(ParseError::new(
            start_hex,
            "expected `#` followed by a hexadecimal RGB value",
        ));
    }

    let hex_start = start_hex + 1;
    let hex_end = hex_start + 6;
    let Some(hex) = input.get(hex_start..hex_end) else {
        return Err(ParseError::new(
            hex_start,
            "incomplete color specification; expected 6 hexadecimal digits",
        ));
    };

    let color = crate::style::parse_hex_color(hex).map_err(|_| {
        ParseError::new(
            hex_start,
            "invalid RGB specification; use hexadecimal digits only",
        )
    })?;

    if !input[hex_end..].starts_with("]{") {
        return Err(ParseError::new(
            hex_end,
            "expected `]{` to close the color directive",
        ));
    }

    Ok((color, hex_end + 2))
}

fn is_pictograph(ch: char) -> bool {
    matches!(
        u32::from(ch),
        0x1F000..=0x1FAFF | 0x2600..=0x27BF | 0x2B00..=0x2BFF | 0xFE0F | 0x200D
    )
}

/// Removes emoji and pictographic symbols that the bundled PDF fonts cannot display.
///
/// A space directly following a removed symbol is dropped as well when the symbol stood at the
/// start of the text or after another space, so `"🚀 Prompt"` becomes `"Prompt"`.
pub fn strip_pictographs(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_pictograph) {
        return Cow::Borrowed(text);
    }

    let mut output = String::with_capacity(text.len());
    let mut swallow_space = false;
    for ch in text.chars() {
        if is_pictograph(ch) {
            swallow_space = output.is_empty() || output.ends_with(' ');
            continue;
        }
        if ch == ' ' && swallow_space {
            swallow_space = false;
            continue;
        }
        swallow_space = false;
        output.push(ch);
    }
    Cow::Owned(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_to_style_reflects_flags() {
        let span = Span::new("Hello")
            .bold()
            .italic()
            .colored(Color::Rgb(10, 20, 30));
        let styled = span.to_styled_string();
        assert_eq!(styled.s, "Hello");
        assert!(styled.style.is_bold());
        assert!(styled.style.is_italic());
        assert_eq!(styled.style.color(), Some(Color::Rgb(10, 20, 30)));
    }

    #[test]
    fn parse_plain_text() {
        let spans = parse_markup("Hello world").expect("parse succeeds");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text(), "Hello world");
        assert!(!spans[0].is_bold());
    }

    #[test]
    fn parse_bold_label() {
        let spans = parse_markup("**Cas d'usage** : Réponses clients").expect("parse succeeds");
        assert_eq!(spans.len(), 2);
        assert!(spans[0].is_bold());
        assert_eq!(spans[0].text(), "Cas d'usage");
        assert_eq!(spans[1].text(), " : Réponses clients");
    }

    #[test]
    fn parse_nested_styles() {
        let spans = parse_markup("This is **very *cool***!").expect("parse succeeds");
        assert_eq!(spans.len(), 4);
        assert!(spans[2].is_bold());
        assert!(spans[2].is_italic());
        assert_eq!(spans[2].text(), "cool");
        assert_eq!(spans[3].text(), "!");
    }

    #[test]
    fn square_brackets_are_literal() {
        let spans = parse_markup("remplacez les parties entre [crochets]").expect("parse succeeds");
        assert_eq!(plain_text(&spans), "remplacez les parties entre [crochets]");
    }

    #[test]
    fn line_breaks_survive_parsing() {
        let spans = parse_markup("**Code promo**\n**-30%**").expect("parse succeeds");
        assert_eq!(plain_text(&spans), "Code promo\n-30%");
    }

    #[test]
    fn parse_color_directive() {
        let spans = parse_markup("[color=#FF6B35]{EARLYBIRD30} inside").expect("parse succeeds");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text(), "EARLYBIRD30");
        assert_eq!(spans[0].color(), Some(Color::Rgb(0xff, 0x6b, 0x35)));
        assert_eq!(spans[1].text(), " inside");
    }

    #[test]
    fn error_on_unterminated_bold() {
        let err = parse_markup("**oops").unwrap_err();
        assert!(err.message().contains("unterminated bold"));
    }

    #[test]
    fn error_on_invalid_color() {
        let err = parse_markup("[color=#12FG34]{x}").unwrap_err();
        assert!(err.message().contains("invalid RGB"));
        assert_eq!(err.index(), 8);
    }

    #[test]
    fn strips_leading_pictograph_and_its_space() {
        assert_eq!(
            strip_pictographs("🚀 Prompt 1 : Rédaction"),
            "Prompt 1 : Rédaction"
        );
        assert_eq!(strip_pictographs("✅ Analyse"), "Analyse");
    }

    #[test]
    fn keeps_arrows_and_plain_text_borrowed() {
        let text = "15-20 minutes → 5h";
        assert!(matches!(strip_pictographs(text), Cow::Borrowed(_)));
    }

    #[test]
    fn strips_inner_pictograph() {
        assert_eq!(
            strip_pictographs("C'est exactement ce que fait Ezia. 🤖"),
            "C'est exactement ce que fait Ezia. "
        );
    }
}
