//! Data structures describing the logical content of the guide.
//!
//! The types in this module avoid referencing `genpdf` so the content can be inspected, printed
//! as an outline, or tested without loading fonts. [`Guide::story`] flattens everything into the
//! ordered list of instructions consumed by the renderer.

use std::fmt;

use crate::richtext::{self, ParseError, Span};
use crate::style::StyleName;

/// Rich text paragraph rendered with one of the named styles.
#[derive(Clone, Debug, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
    style: StyleName,
}

impl RichParagraph {
    /// Creates a paragraph from the provided spans.
    pub fn new(style: StyleName, spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
            style,
        }
    }

    /// Parses `markup` with [`richtext::parse_markup`].
    pub fn markup(style: StyleName, markup: &str) -> Result<Self, ParseError> {
        Ok(Self::new(style, richtext::parse_markup(markup)?))
    }

    /// Returns the spans that make up the paragraph.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Returns the style the paragraph is rendered with.
    pub fn style(&self) -> StyleName {
        self.style
    }

    /// Returns the paragraph text without styling.
    pub fn plain_text(&self) -> String {
        richtext::plain_text(&self.spans)
    }
}

/// A simple grid of text cells with relative column widths.
#[derive(Clone, Debug, PartialEq)]
pub struct TableBlock {
    column_weights: Vec<usize>,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Error returned when a table row does not match the column count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableShapeError {
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for TableShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table row has {} cells but the table has {} columns",
            self.found, self.expected
        )
    }
}

impl std::error::Error for TableShapeError {}

impl TableBlock {
    /// Creates a table with the given header; the column count is the header length.
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let header: Vec<String> = header.into_iter().map(Into::into).collect();
        Self {
            column_weights: vec![1; header.len()],
            header,
            rows: Vec::new(),
        }
    }

    /// Sets relative column widths. Missing weights default to 1.
    pub fn with_column_weights(mut self, weights: impl Into<Vec<usize>>) -> Self {
        let mut weights = weights.into();
        weights.resize(self.header.len(), 1);
        self.column_weights = weights;
        self
    }

    /// Appends a row, rejecting rows whose length differs from the header.
    pub fn push_row<I, S>(&mut self, cells: I) -> Result<(), TableShapeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(Into::into).collect();
        if row.len() != self.header.len() {
            return Err(TableShapeError {
                expected: self.header.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_weights(&self) -> &[usize] {
        &self.column_weights
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// Individual content blocks that make up sections and the cover.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Styled paragraph content.
    Paragraph(RichParagraph),
    /// Literal prompt text rendered in the code style; never parsed as markup.
    Code(String),
    /// Vertical space in millimetres.
    Spacer(f64),
    /// Tabular content.
    Table(TableBlock),
    /// Explicit page break request.
    PageBreak,
}

impl Block {
    /// Convenience helper for building a paragraph block from markup.
    pub fn markup(style: StyleName, markup: &str) -> Result<Self, ParseError> {
        Ok(Self::Paragraph(RichParagraph::markup(style, markup)?))
    }

    /// Convenience helper for building a code block.
    pub fn code(text: impl Into<String>) -> Self {
        Self::Code(text.into())
    }

    /// Vertical space expressed in centimetres.
    pub fn spacer_cm(cm: f64) -> Self {
        Self::Spacer(cm * 10.0)
    }
}

/// Cover page content: leading space, stacked title lines, subtitle and free blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct Cover {
    title_lines: Vec<String>,
    subtitle: Option<String>,
    blocks: Vec<Block>,
}

impl Cover {
    /// Space above the first title line, in millimetres.
    pub const TOP_SPACE_MM: f64 = 30.0;
    /// Space between the title and the subtitle, in millimetres.
    pub const SUBTITLE_SPACE_MM: f64 = 10.0;
    /// Space between the subtitle and the remaining blocks, in millimetres.
    pub const BLOCKS_SPACE_MM: f64 = 20.0;

    /// Creates a new cover with the given title lines.
    pub fn new<I, S>(title_lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title_lines: title_lines.into_iter().map(Into::into).collect(),
            subtitle: None,
            blocks: Vec::new(),
        }
    }

    /// Returns the title lines shown on the cover page.
    pub fn title_lines(&self) -> &[String] {
        &self.title_lines
    }

    /// Returns the subtitle, if any. Line breaks are kept.
    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    /// Returns the content blocks rendered below the subtitle.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Sets the subtitle and returns the updated cover.
    pub fn with_subtitle(mut self, subtitle: impl Into<Option<String>>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    /// Appends a block to the cover and returns the updated instance.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    fn story(&self) -> Vec<StoryItem> {
        let mut story = vec![StoryItem::Block(Block::Spacer(Self::TOP_SPACE_MM))];
        story.extend(self.title_lines.iter().map(|line| {
            StoryItem::Block(Block::Paragraph(RichParagraph::new(
                StyleName::Title,
                vec![Span::new(line.as_str())],
            )))
        }));
        if let Some(subtitle) = &self.subtitle {
            story.push(StoryItem::Block(Block::Spacer(Self::SUBTITLE_SPACE_MM)));
            story.push(StoryItem::Block(Block::Paragraph(RichParagraph::new(
                StyleName::Subtitle,
                vec![Span::new(subtitle.as_str())],
            ))));
        }
        if !self.blocks.is_empty() {
            story.push(StoryItem::Block(Block::Spacer(Self::BLOCKS_SPACE_MM)));
            story.extend(self.blocks.iter().cloned().map(StoryItem::Block));
        }
        story
    }
}

/// Logical representation of a guide section.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    identifier: Option<String>,
    title: String,
    blocks: Vec<Block>,
}

impl Section {
    /// Creates a new section with the provided title, rendered as a section heading.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            identifier: None,
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Returns the section identifier used for bookmarks.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Returns the title of the section.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the blocks contained in the section.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Sets the identifier and returns the updated section.
    pub fn with_identifier(mut self, identifier: impl Into<Option<String>>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Appends a block and returns the updated section.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Extends the section with additional blocks and returns the updated instance.
    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }

    /// Creates a builder that can inject an initial page break.
    pub fn builder(title: impl Into<String>) -> SectionBuilder {
        SectionBuilder::new(title)
    }

    fn story(&self, index: usize) -> Vec<StoryItem> {
        let leading_breaks = self
            .blocks
            .iter()
            .take_while(|block| matches!(block, Block::PageBreak))
            .count();

        let mut story: Vec<StoryItem> = self.blocks[..leading_breaks]
            .iter()
            .cloned()
            .map(StoryItem::Block)
            .collect();
        story.push(StoryItem::SectionStart(index));
        story.push(StoryItem::Heading {
            text: self.title.clone(),
            style: StyleName::SectionTitle,
        });
        story.extend(
            self.blocks[leading_breaks..]
                .iter()
                .cloned()
                .map(StoryItem::Block),
        );
        story
    }
}

/// Builder for [`Section`] values.
#[derive(Clone, Debug, Default)]
pub struct SectionBuilder {
    identifier: Option<String>,
    title: String,
    blocks: Vec<Block>,
    start_on_new_page: bool,
}

impl SectionBuilder {
    /// Creates a builder for a section with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Marks the section to start on a new page.
    pub fn start_on_new_page(mut self, start_on_new_page: bool) -> Self {
        self.start_on_new_page = start_on_new_page;
        self
    }

    /// Sets the identifier for the section.
    pub fn identifier(mut self, identifier: impl Into<Option<String>>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Pushes an additional block into the section.
    pub fn push_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Builds the final section, injecting a leading page break when requested.
    pub fn build(mut self) -> Section {
        if self.start_on_new_page {
            match self.blocks.first() {
                Some(Block::PageBreak) => {}
                _ => self.blocks.insert(0, Block::PageBreak),
            }
        }

        Section::new(self.title)
            .with_identifier(self.identifier)
            .with_blocks(self.blocks)
    }
}

/// One instruction of the flattened document.
#[derive(Clone, Debug, PartialEq)]
pub enum StoryItem {
    /// A content block.
    Block(Block),
    /// Marks the first page of the section with the given index.
    SectionStart(usize),
    /// A section heading paragraph.
    Heading { text: String, style: StyleName },
}

impl fmt::Display for StoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryItem::SectionStart(index) => write!(f, "-- section {}", index + 1),
            StoryItem::Heading { text, style } => write!(f, "[{}] {}", style.label(), text),
            StoryItem::Block(Block::Paragraph(paragraph)) => write!(
                f,
                "[{}] {}",
                paragraph.style().label(),
                paragraph.plain_text().replace('\n', " / ")
            ),
            StoryItem::Block(Block::Code(text)) => {
                write!(f, "[code] {} lines", text.lines().count())
            }
            StoryItem::Block(Block::Spacer(mm)) => write!(f, "[spacer] {mm} mm"),
            StoryItem::Block(Block::Table(table)) => write!(
                f,
                "[table] {} columns, {} rows",
                table.header().len(),
                table.rows().len()
            ),
            StoryItem::Block(Block::PageBreak) => write!(f, "[page break]"),
        }
    }
}

/// The whole document: metadata, cover and sections.
#[derive(Clone, Debug, PartialEq)]
pub struct Guide {
    title: String,
    cover: Cover,
    sections: Vec<Section>,
}

impl Guide {
    pub fn new(title: impl Into<String>, cover: Cover) -> Self {
        Self {
            title: title.into(),
            cover,
            sections: Vec::new(),
        }
    }

    /// Document title stored in the PDF metadata.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cover(&self) -> &Cover {
        &self.cover
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Appends a section and returns the updated guide.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Flattens the cover and all sections into the ordered rendering instructions.
    pub fn story(&self) -> Vec<StoryItem> {
        let mut story = self.cover.story();
        for (index, section) in self.sections.iter().enumerate() {
            story.extend(section.story(index));
        }
        story
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_inserts_page_break() {
        let section = Section::builder("Intro")
            .start_on_new_page(true)
            .push_block(Block::Spacer(1.0))
            .build();

        assert!(matches!(section.blocks().first(), Some(Block::PageBreak)));
    }

    #[test]
    fn builder_does_not_duplicate_page_break() {
        let section = Section::builder("Intro")
            .start_on_new_page(true)
            .push_block(Block::PageBreak)
            .build();

        assert!(matches!(section.blocks().first(), Some(Block::PageBreak)));
        assert_eq!(section.blocks().len(), 1);
    }

    #[test]
    fn section_marker_follows_leading_page_break() {
        let guide = Guide::new("Doc", Cover::new(["Title"])).with_section(
            Section::builder("First")
                .start_on_new_page(true)
                .push_block(Block::code("x"))
                .build(),
        );

        let story = guide.story();
        let marker = story
            .iter()
            .position(|item| matches!(item, StoryItem::SectionStart(0)))
            .expect("marker present");
        assert!(matches!(story[marker - 1], StoryItem::Block(Block::PageBreak)));
        assert!(matches!(
            &story[marker + 1],
            StoryItem::Heading { text, style: StyleName::SectionTitle } if text == "First"
        ));
        assert!(matches!(story[marker + 2], StoryItem::Block(Block::Code(_))));
    }

    #[test]
    fn cover_story_stacks_titles_then_subtitle() {
        let cover = Cover::new(["5 Prompts IA", "pour Entrepreneurs Pressés"])
            .with_subtitle(Some("Gagnez 10h".to_string()));
        let story = cover.story();

        assert!(matches!(story[0], StoryItem::Block(Block::Spacer(mm)) if mm == 30.0));
        let titles = story
            .iter()
            .filter(|item| {
                matches!(item, StoryItem::Block(Block::Paragraph(p)) if p.style() == StyleName::Title)
            })
            .count();
        assert_eq!(titles, 2);
        assert!(matches!(
            story.last(),
            Some(StoryItem::Block(Block::Paragraph(p))) if p.style() == StyleName::Subtitle
        ));
    }

    #[test]
    fn table_rejects_ragged_rows() {
        let mut table = TableBlock::new(["Prompt", "Gain"]).with_column_weights(vec![3]);
        assert_eq!(table.column_weights(), &[3, 1]);
        assert!(table.push_row(["a", "b"]).is_ok());
        assert_eq!(
            table.push_row(["only one"]),
            Err(TableShapeError {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn outline_lines_are_readable() {
        let item = StoryItem::Block(Block::code("a\nb\nc"));
        assert_eq!(item.to_string(), "[code] 3 lines");
        assert_eq!(StoryItem::SectionStart(0).to_string(), "-- section 1");
    }
}
