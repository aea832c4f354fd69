//! Brand palette and the named paragraph styles used throughout the guide.

use std::fmt;

use genpdf::fonts::{Font, FontFamily};
use genpdf::style::{Color, Style};

/// Millimetres per typographic point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Converts a length in points to millimetres.
pub fn pt_to_mm(points: f64) -> f64 {
    points * MM_PER_PT
}

/// Error returned by [`parse_hex_color`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorError {
    input: String,
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid color `{}`; expected #RRGGBB with hexadecimal digits",
            self.input
        )
    }
}

impl std::error::Error for ColorError {}

/// Parses a `#RRGGBB` (or bare `RRGGBB`) string into an RGB color.
pub fn parse_hex_color(input: &str) -> Result<Color, ColorError> {
    let error = || ColorError {
        input: input.to_owned(),
    };
    let hex = input.trim().strip_prefix('#').unwrap_or(input.trim());
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(error());
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => Ok(Color::Rgb(r, g, b)),
        _ => Err(error()),
    }
}

/// Colors of the Ezia brand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Headings and titles.
    pub primary: Color,
    /// Background of highlight boxes.
    pub primary_light: Color,
    /// Running text.
    pub text: Color,
    /// Background of prompt code blocks.
    pub code_background: Color,
    /// Footer and page number.
    pub footer: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Color::Rgb(0x6D, 0x3F, 0xC8),
            primary_light: Color::Rgb(0xE8, 0xDF, 0xF5),
            text: Color::Rgb(0x2C, 0x3E, 0x50),
            code_background: Color::Rgb(0xEC, 0xF0, 0xF1),
            footer: Color::Greyscale(128),
        }
    }
}

impl Palette {
    /// Replaces the primary color and returns the updated palette.
    pub fn with_primary(mut self, primary: Color) -> Self {
        self.primary = primary;
        self
    }
}

/// Horizontal alignment of a paragraph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
    /// Fully justified paragraphs; the last line of each paragraph is left aligned.
    Justified,
}

/// Names of the styles defined by the [`StyleSheet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleName {
    Title,
    Subtitle,
    SectionTitle,
    Subsection,
    Body,
    Code,
    Highlight,
}

impl StyleName {
    /// All style names in declaration order.
    pub const ALL: [StyleName; 7] = [
        StyleName::Title,
        StyleName::Subtitle,
        StyleName::SectionTitle,
        StyleName::Subsection,
        StyleName::Body,
        StyleName::Code,
        StyleName::Highlight,
    ];

    /// Short lowercase label used in outlines and logs.
    pub fn label(self) -> &'static str {
        match self {
            StyleName::Title => "title",
            StyleName::Subtitle => "subtitle",
            StyleName::SectionTitle => "section",
            StyleName::Subsection => "subsection",
            StyleName::Body => "body",
            StyleName::Code => "code",
            StyleName::Highlight => "highlight",
        }
    }
}

/// Visual attributes of a paragraph or box. Lengths are in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParagraphStyle {
    pub font_size: u8,
    pub bold: bool,
    pub monospace: bool,
    pub color: Color,
    pub background: Option<Color>,
    pub left_indent: f64,
    pub right_indent: f64,
    pub space_before: f64,
    pub space_after: f64,
    /// Inner padding between the background box and the text.
    pub padding: f64,
    pub alignment: HorizontalAlignment,
    pub line_spacing: f64,
}

impl ParagraphStyle {
    fn new(font_size: u8, color: Color) -> Self {
        Self {
            font_size,
            bold: false,
            monospace: false,
            color,
            background: None,
            left_indent: 0.0,
            right_indent: 0.0,
            space_before: 0.0,
            space_after: 0.0,
            padding: 0.0,
            alignment: HorizontalAlignment::Left,
            line_spacing: 1.1,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn spacing(mut self, before: f64, after: f64) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    fn aligned(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    fn boxed(mut self, background: Color, indent: f64) -> Self {
        self.background = Some(background);
        self.left_indent = indent;
        self.right_indent = indent;
        self.padding = 4.0;
        self
    }

    /// Builds the `genpdf` text style, using `mono` for monospace paragraphs.
    pub fn text_style(&self, mono: Option<FontFamily<Font>>) -> Style {
        let mut style = Style::new()
            .with_font_size(self.font_size)
            .with_color(self.color)
            .with_line_spacing(self.line_spacing);
        if self.bold {
            style.set_bold();
        }
        if self.monospace {
            if let Some(family) = mono {
                style.set_font_family(family);
            }
        }
        style
    }
}

/// The complete set of named styles.
#[derive(Clone, Debug)]
pub struct StyleSheet {
    palette: Palette,
    title: ParagraphStyle,
    subtitle: ParagraphStyle,
    section_title: ParagraphStyle,
    subsection: ParagraphStyle,
    body: ParagraphStyle,
    code: ParagraphStyle,
    highlight: ParagraphStyle,
}

impl StyleSheet {
    pub fn new(palette: Palette) -> Self {
        use HorizontalAlignment::*;

        let mut code = ParagraphStyle::new(9, palette.text)
            .spacing(12.0, 12.0)
            .boxed(palette.code_background, 20.0);
        code.monospace = true;

        Self {
            palette,
            title: ParagraphStyle::new(24, palette.primary)
                .bold()
                .spacing(0.0, 30.0)
                .aligned(Center),
            subtitle: ParagraphStyle::new(16, palette.text)
                .spacing(0.0, 20.0)
                .aligned(Center),
            section_title: ParagraphStyle::new(18, palette.primary)
                .bold()
                .spacing(20.0, 15.0),
            subsection: ParagraphStyle::new(14, palette.primary)
                .bold()
                .spacing(15.0, 10.0),
            body: ParagraphStyle::new(11, palette.text)
                .spacing(0.0, 12.0)
                .aligned(Justified),
            code,
            highlight: ParagraphStyle::new(11, palette.text)
                .spacing(12.0, 12.0)
                .boxed(palette.primary_light, 15.0),
        }
    }

    /// Returns the palette the sheet was built from.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Looks up a style by name.
    pub fn get(&self, name: StyleName) -> &ParagraphStyle {
        match name {
            StyleName::Title => &self.title,
            StyleName::Subtitle => &self.subtitle,
            StyleName::SectionTitle => &self.section_title,
            StyleName::Subsection => &self.subsection,
            StyleName::Body => &self.body,
            StyleName::Code => &self.code,
            StyleName::Highlight => &self.highlight,
        }
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}
