//! Document construction and rendering for the guide.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::elements::{FrameCellDecorator, PageBreak, TableLayout};
use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{Font, FontFamily};
use genpdf::style;
use genpdf::{self, Element, Margins, Mm, PageDecorator, PaperSize, Position, Size};
use log::{debug, info};

use crate::elements::{mm_to_f64, FooterLine, PageMarker, PageTracker, TextBlock, VerticalSpace};
use crate::fonts;
use crate::model::{Block, Guide, StoryItem, TableBlock};
use crate::richtext::{strip_pictographs, Span};
use crate::style::{HorizontalAlignment, Palette, StyleName, StyleSheet};

/// Footer string printed on every page.
pub const DEFAULT_FOOTER_TEXT: &str =
    "© 2025 Ezia.ai - Votre copilote IA pour entrepreneurs pressés";

/// Height reserved at the bottom of each page for the footer line, in millimetres.
pub const FOOTER_HEIGHT_MM: f64 = 18.0;

/// Page margins in millimetres: top, right, bottom, left.
pub const PAGE_MARGINS_MM: (i32, i32, i32, i32) = (30, 20, 12, 20);

type FooterFactory = dyn Fn(usize) -> Box<dyn Element>;

/// Builder for `genpdf::Document` instances pre-configured with the guide fonts.
#[derive(Default)]
pub struct DocumentBuilder {
    paper_size: Option<Size>,
    margins: Option<Margins>,
    footer: Option<FooterSpec>,
    tracker: Option<PageTracker>,
    title: Option<String>,
}

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the paper size used for newly created documents.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = Some(paper_size.into());
        self
    }

    /// Sets the margins applied through the page decorator.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = Some(margins.into());
        self
    }

    /// Configures a footer callback with a fixed height that is invoked for every page.
    pub fn with_footer<F, E>(mut self, height: impl Into<Mm>, footer: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.footer = Some(FooterSpec::new(height, footer));
        self
    }

    /// Shares page numbering with `tracker` instead of a private counter.
    pub fn with_tracker(mut self, tracker: PageTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Sets the title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builds the document and returns it together with the installed monospace family.
    pub fn build(self) -> Result<(genpdf::Document, FontFamily<Font>), Error> {
        let guide_fonts = fonts::guide_fonts()?;
        let mut document = genpdf::Document::new(guide_fonts.sans);
        let mono = document.add_font_family(guide_fonts.mono);

        if let Some(paper_size) = self.paper_size {
            document.set_paper_size(paper_size);
        }
        if let Some(title) = self.title {
            document.set_title(title);
        }

        let decorator = ConfiguredPageDecorator {
            tracker: self.tracker.unwrap_or_default(),
            margins: self.margins,
            footer: self.footer,
        };
        document.set_page_decorator(decorator);

        Ok((document, mono))
    }
}

/// Definition of a footer rendered through the page decorator.
pub struct FooterSpec {
    height: Mm,
    factory: Box<FooterFactory>,
}

impl FooterSpec {
    /// Creates a new footer specification.
    pub fn new<F, E>(height: impl Into<Mm>, factory: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        Self {
            height: height.into(),
            factory: Box::new(move |page| Box::new(factory(page)) as Box<dyn Element>),
        }
    }
}

struct ConfiguredPageDecorator {
    tracker: PageTracker,
    margins: Option<Margins>,
    footer: Option<FooterSpec>,
}

impl PageDecorator for ConfiguredPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        let page = self.tracker.begin_page();
        debug!("Decorating page {}", page);

        if let Some(margins) = self.margins {
            area.add_margins(margins);
        }

        if let Some(footer) = &self.footer {
            let available = area.size().height;
            if footer.height > available {
                return Err(Error::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - footer.height));
            footer_area.set_height(footer.height);
            let mut element = (footer.factory)(page);
            let result = element.render(context, footer_area, style)?;
            if result.has_more {
                return Err(Error::new(
                    "Footer element does not fit into the reserved space",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - footer.height);
        }

        self.tracker.set_body_height(mm_to_f64(area.size().height));
        Ok(area)
    }
}

/// Settings that change how the guide is rendered, not what it says.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub palette: Palette,
    pub footer_text: String,
    /// Keep emoji in the text. The Liberation fonts have no glyphs for them.
    pub keep_pictographs: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            footer_text: DEFAULT_FOOTER_TEXT.to_owned(),
            keep_pictographs: false,
        }
    }
}

/// Errors raised while producing the guide PDF.
#[derive(Debug)]
pub enum PdfBuildError {
    /// The font families could not be loaded.
    FontLoad(Error),
    /// `genpdf` failed while laying out or serializing the document.
    Render(Error),
    /// The output file could not be written.
    Io { path: PathBuf, source: io::Error },
    /// The outline could not be added to the rendered PDF.
    #[cfg(feature = "bookmarks")]
    Bookmarks(crate::bookmarks::BookmarkError),
}

impl fmt::Display for PdfBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontLoad(_) => write!(f, "failed to load fonts"),
            Self::Render(_) => write!(f, "failed to render the guide"),
            Self::Io { path, .. } => write!(f, "failed to write {}", path.display()),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(_) => write!(f, "failed to add section bookmarks"),
        }
    }
}

impl std::error::Error for PdfBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Render(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => Some(err),
        }
    }
}

/// Output of a successful render.
#[derive(Clone, Debug)]
pub struct RenderedGuide {
    /// The PDF file contents.
    pub bytes: Vec<u8>,
    /// Number of pages in the document.
    pub page_count: usize,
    /// First page (1-based) of every section, in section order.
    pub section_pages: Vec<Option<usize>>,
}

impl RenderedGuide {
    /// Writes the PDF to `path`, creating missing parent directories.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), PdfBuildError> {
        let path = path.as_ref();
        let io_error = |source| PdfBuildError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, &self.bytes).map_err(io_error)?;
        info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(())
    }
}

/// Renders a [`Guide`] with the given [`RenderOptions`].
pub struct PdfBuilder {
    guide: Guide,
    options: RenderOptions,
}

impl PdfBuilder {
    /// Creates a builder for `guide` with default options.
    pub fn new(guide: Guide) -> Self {
        Self {
            guide,
            options: RenderOptions::default(),
        }
    }

    /// Replaces the render options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the guide being rendered.
    pub fn guide(&self) -> &Guide {
        &self.guide
    }

    /// Lays out the guide and serializes it to PDF bytes.
    pub fn render(&self) -> Result<RenderedGuide, PdfBuildError> {
        let tracker = PageTracker::new(self.guide.sections().len());
        let footer_text = self.options.footer_text.clone();
        let footer_color = self.options.palette.footer;
        let (top, right, bottom, left) = PAGE_MARGINS_MM;

        let (mut document, mono) = DocumentBuilder::new()
            .with_paper_size(PaperSize::A4)
            .with_margins(Margins::trbl(top, right, bottom, left))
            .with_footer(FOOTER_HEIGHT_MM, move |page| {
                FooterLine::new(footer_text.clone(), page, footer_color)
            })
            .with_tracker(tracker.clone())
            .with_title(self.guide.title())
            .build()
            .map_err(PdfBuildError::FontLoad)?;

        let sheet = StyleSheet::new(self.options.palette);
        let story = self.guide.story();
        debug!("Laying out {} story items", story.len());
        for item in story {
            self.push_item(&mut document, &sheet, mono, &tracker, item)
                .map_err(PdfBuildError::Render)?;
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(PdfBuildError::Render)?;

        let rendered = RenderedGuide {
            bytes,
            page_count: tracker.current_page(),
            section_pages: tracker.section_pages(),
        };
        info!(
            "Rendered '{}' ({} pages, {} bytes)",
            self.guide.title(),
            rendered.page_count,
            rendered.bytes.len()
        );
        Ok(rendered)
    }

    /// Renders the guide and adds a PDF outline entry for every section.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(&self) -> Result<RenderedGuide, PdfBuildError> {
        let mut rendered = self.render()?;
        rendered.bytes = crate::bookmarks::apply_section_bookmarks(
            &rendered.bytes,
            self.guide.sections(),
            &rendered.section_pages,
        )
        .map_err(PdfBuildError::Bookmarks)?;
        Ok(rendered)
    }

    fn push_item(
        &self,
        document: &mut genpdf::Document,
        sheet: &StyleSheet,
        mono: FontFamily<Font>,
        tracker: &PageTracker,
        item: StoryItem,
    ) -> Result<(), Error> {
        match item {
            StoryItem::SectionStart(index) => {
                document.push(PageMarker::new(tracker.clone(), index));
            }
            StoryItem::Heading { text, style } => {
                let spans = self.prepare_spans(&[Span::new(text)]);
                document.push(
                    self.text_block(&spans, style, sheet, mono)
                        .with_page_tracker(tracker.clone()),
                );
            }
            StoryItem::Block(Block::Paragraph(paragraph)) => {
                let spans = self.prepare_spans(paragraph.spans());
                document.push(
                    self.text_block(&spans, paragraph.style(), sheet, mono)
                        .with_page_tracker(tracker.clone()),
                );
            }
            StoryItem::Block(Block::Code(text)) => {
                let spans = self.prepare_spans(&[Span::new(text)]);
                document.push(
                    self.text_block(&spans, StyleName::Code, sheet, mono)
                        .with_page_tracker(tracker.clone()),
                );
            }
            StoryItem::Block(Block::Spacer(height)) => document.push(VerticalSpace::new(height)),
            StoryItem::Block(Block::Table(table)) => {
                document.push(self.table(&table, sheet, mono)?);
            }
            StoryItem::Block(Block::PageBreak) => document.push(PageBreak::new()),
        }
        Ok(())
    }

    fn text_block(
        &self,
        spans: &[Span],
        name: StyleName,
        sheet: &StyleSheet,
        mono: FontFamily<Font>,
    ) -> TextBlock {
        let paragraph = *sheet.get(name);
        TextBlock::new(spans, paragraph, paragraph.text_style(Some(mono)))
    }

    fn table(
        &self,
        table: &TableBlock,
        sheet: &StyleSheet,
        mono: FontFamily<Font>,
    ) -> Result<TableLayout, Error> {
        let mut cell_style = *sheet.get(StyleName::Body);
        cell_style.space_before = 0.0;
        cell_style.space_after = 0.0;
        cell_style.alignment = HorizontalAlignment::Left;
        let text_style = cell_style.text_style(Some(mono));

        let mut layout = TableLayout::new(table.column_weights().to_vec());
        layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

        let cell = |spans: Vec<Span>| {
            TextBlock::new(&self.prepare_spans(&spans), cell_style, text_style)
                .padded(Margins::trbl(2, 2, 2, 2))
        };

        let mut header = layout.row();
        for title in table.header() {
            header = header.element(cell(vec![
                Span::new(title.as_str()).bold().colored(sheet.palette().primary)
            ]));
        }
        header.push()?;

        for row in table.rows() {
            let mut table_row = layout.row();
            for value in row {
                table_row = table_row.element(cell(vec![Span::new(value.as_str())]));
            }
            table_row.push()?;
        }

        Ok(layout)
    }

    fn prepare_spans(&self, spans: &[Span]) -> Vec<Span> {
        if self.options.keep_pictographs {
            return spans.to_vec();
        }
        spans
            .iter()
            .map(|span| span.with_text(strip_pictographs(span.text())))
            .filter(|span| !span.text().is_empty())
            .collect()
    }
}

/// Convenience wrapper: renders `guide` with `options` and writes it to `path`.
pub fn render_to_path(
    guide: Guide,
    options: RenderOptions,
    path: impl AsRef<Path>,
) -> Result<RenderedGuide, PdfBuildError> {
    let rendered = PdfBuilder::new(guide).with_options(options).render()?;
    rendered.write_to(path)?;
    Ok(rendered)
}
