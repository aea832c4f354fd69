//! Element implementations built on top of `genpdf` primitives.
//!
//! `genpdf` ships paragraphs without background colors, indents or justification, and only
//! line-based breaks. The guide needs boxed prompts and highlights, justified body text and
//! spacers measured in millimetres, so this module provides those pieces together with the
//! footer line and the page bookkeeping used for bookmarks.

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

use genpdf::error::Error;
use genpdf::fonts::FontCache;
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult, Size};

use crate::richtext::Span;
use crate::style::{pt_to_mm, HorizontalAlignment, ParagraphStyle};

const EPSILON: f64 = 1e-6;
/// Vertical distance between the strokes that fill a background box. The default PDF line
/// width is one point (about 0.35 mm), so strokes at this pitch overlap.
const FILL_PITCH_MM: f64 = 0.3;
const FOOTER_TEXT_SIZE: u8 = 8;
const FOOTER_NUMBER_SIZE: u8 = 9;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Width of a word and of the whitespace that follows it, in millimetres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WordMetrics {
    pub width: f64,
    pub space_after: f64,
}

/// Greedy line breaking: packs consecutive words into lines no wider than `available`.
///
/// A word wider than the line is placed on its own line. An empty input yields one empty line so
/// blank lines keep their height.
pub fn break_lines(words: &[WordMetrics], available: f64) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut width = 0.0;

    for (index, word) in words.iter().enumerate() {
        if index == start {
            width = word.width;
            continue;
        }

        let candidate = width + words[index - 1].space_after + word.width;
        if candidate > available + EPSILON {
            lines.push(start..index);
            start = index;
            width = word.width;
        } else {
            width = candidate;
        }
    }

    if start < words.len() || lines.is_empty() {
        lines.push(start..words.len());
    }
    lines
}

/// Natural width of a line: the words plus the spaces between them, not the trailing one.
pub fn line_width(words: &[WordMetrics]) -> f64 {
    let spaces: f64 = words
        .iter()
        .take(words.len().saturating_sub(1))
        .map(|word| word.space_after)
        .sum();
    words.iter().map(|word| word.width).sum::<f64>() + spaces
}

/// Extra width added to each of `gaps` word gaps so a line of `natural` width fills `available`.
pub fn justify_gap(available: f64, natural: f64, gaps: usize) -> f64 {
    if gaps == 0 || natural >= available {
        0.0
    } else {
        (available - natural) / gaps as f64
    }
}

#[derive(Clone, Debug)]
struct Fragment {
    text: String,
    style: Style,
}

#[derive(Clone, Debug, Default)]
struct Word {
    fragments: Vec<Fragment>,
    space: Option<Fragment>,
    metrics: WordMetrics,
}

impl Word {
    fn is_empty(&self) -> bool {
        self.fragments.is_empty() && self.space.is_none()
    }

    fn fragments_all_spaces(&self) -> bool {
        self.fragments
            .iter()
            .all(|fragment| fragment.text.chars().all(|ch| ch == ' '))
    }

    fn push_char(&mut self, ch: char, style: Style, span: usize, last_span: &mut Option<usize>) {
        match self.fragments.last_mut() {
            Some(fragment) if *last_span == Some(span) => fragment.text.push(ch),
            _ => self.fragments.push(Fragment {
                text: ch.to_string(),
                style,
            }),
        }
        *last_span = Some(span);
    }

    fn push_space(&mut self, style: Style) {
        match &mut self.space {
            Some(space) => space.text.push(' '),
            None => {
                self.space = Some(Fragment {
                    text: " ".to_owned(),
                    style,
                })
            }
        }
    }

    fn measure(&mut self, font_cache: &FontCache) {
        self.metrics.width = self
            .fragments
            .iter()
            .map(|fragment| {
                mm_to_f64(StyledString::new(fragment.text.clone(), fragment.style).width(font_cache))
            })
            .sum();
        self.metrics.space_after = self
            .space
            .as_ref()
            .map(|space| mm_to_f64(StyledString::new(space.text.clone(), space.style).width(font_cache)))
            .unwrap_or_default();
    }
}

/// Splits one logical line into words. Leading spaces stay attached to the first word so
/// indentation inside prompt blocks survives wrapping.
fn split_words(line: &[(String, Style)]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = Word::default();
    let mut last_span = None;

    for (span_index, (text, style)) in line.iter().enumerate() {
        for ch in text.chars() {
            if ch == ' ' && !current.fragments.is_empty() && !current.fragments_all_spaces() {
                current.push_space(*style);
            } else if ch == ' ' && current.space.is_none() {
                current.push_char(ch, *style, span_index, &mut last_span);
            } else {
                if current.space.is_some() {
                    words.push(std::mem::take(&mut current));
                    last_span = None;
                }
                current.push_char(ch, *style, span_index, &mut last_span);
            }
        }
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

struct LaidOutLine {
    words: Vec<Word>,
    width: f64,
    justify: bool,
    /// Style with the tallest line height on the line; positions the text section.
    style: Style,
    height: f64,
}

struct Layout {
    width: f64,
    lines: Vec<LaidOutLine>,
}

/// A paragraph rendered with a [`ParagraphStyle`]: wrapping, alignment, justification, indents,
/// background box and vertical spacing.
///
/// Line breaks (`\n`) in the spans start a new line. The block splits across pages line by line;
/// the space before is only applied to the first chunk and the space after to the last. With a
/// [`PageTracker`], the space before is dropped when the block opens a page.
pub struct TextBlock {
    lines: Vec<Vec<(String, Style)>>,
    paragraph: ParagraphStyle,
    text_style: Style,
    layout: Option<Layout>,
    next_line: usize,
    started: bool,
    tracker: Option<PageTracker>,
}

impl TextBlock {
    /// Creates a block from styled spans. `text_style` carries font family, size and color.
    pub fn new(spans: &[Span], paragraph: ParagraphStyle, text_style: Style) -> Self {
        let mut lines = vec![Vec::new()];
        for span in spans {
            let style = span.style();
            for (index, piece) in span.text().split('\n').enumerate() {
                if index > 0 {
                    lines.push(Vec::new());
                }
                if !piece.is_empty() {
                    if let Some(line) = lines.last_mut() {
                        line.push((piece.to_owned(), style));
                    }
                }
            }
        }

        Self {
            lines,
            paragraph,
            text_style,
            layout: None,
            next_line: 0,
            started: false,
            tracker: None,
        }
    }

    /// Drops the space before the block when it starts at the top of a page of `tracker`.
    pub fn with_page_tracker(mut self, tracker: PageTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    fn layout_lines(&self, font_cache: &FontCache, base: Style, width: f64) -> Layout {
        let mut laid_out = Vec::new();

        for line in &self.lines {
            let merged: Vec<(String, Style)> = line
                .iter()
                .map(|(text, style)| (text.clone(), base.and(*style)))
                .collect();
            let mut words = split_words(&merged);
            for word in &mut words {
                word.measure(font_cache);
            }
            let metrics: Vec<WordMetrics> = words.iter().map(|word| word.metrics).collect();
            let ranges = break_lines(&metrics, width);
            let last = ranges.len().saturating_sub(1);

            let mut remaining = words.into_iter();
            for (index, range) in ranges.into_iter().enumerate() {
                let line_words: Vec<Word> = remaining.by_ref().take(range.len()).collect();
                let (line_style, height) = line_words
                    .iter()
                    .flat_map(|word| word.fragments.iter())
                    .map(|fragment| fragment.style)
                    .fold(
                        (base, mm_to_f64(base.line_height(font_cache))),
                        |(tallest, height), style| {
                            let candidate = mm_to_f64(style.line_height(font_cache));
                            if candidate > height {
                                (style, candidate)
                            } else {
                                (tallest, height)
                            }
                        },
                    );
                laid_out.push(LaidOutLine {
                    width: line_width(&metrics[range]),
                    words: line_words,
                    justify: index < last,
                    style: line_style,
                    height,
                });
            }
        }

        Layout {
            width,
            lines: laid_out,
        }
    }

    fn render_line(
        &self,
        area: &render::Area<'_>,
        font_cache: &FontCache,
        line: &LaidOutLine,
        (x0, y): (f64, f64),
        text_width: f64,
    ) -> Result<(), Error> {
        let free = (text_width - line.width).max(0.0);
        let (offset, extra_gap) = match self.paragraph.alignment {
            HorizontalAlignment::Left => (0.0, 0.0),
            HorizontalAlignment::Center => (free / 2.0, 0.0),
            HorizontalAlignment::Right => (free, 0.0),
            HorizontalAlignment::Justified if line.justify => (
                0.0,
                justify_gap(
                    text_width,
                    line.width,
                    line.words.len().saturating_sub(1),
                ),
            ),
            HorizontalAlignment::Justified => (0.0, 0.0),
        };

        if extra_gap <= EPSILON {
            let position = Position::new(mm_from_f64(x0 + offset), mm_from_f64(y));
            let Some(mut section) = area.text_section(font_cache, position, line.style) else {
                return Ok(());
            };
            let count = line.words.len();
            for (index, word) in line.words.iter().enumerate() {
                for fragment in &word.fragments {
                    section.print_str(&fragment.text, fragment.style)?;
                }
                if index + 1 < count {
                    if let Some(space) = &word.space {
                        section.print_str(&space.text, space.style)?;
                    }
                }
            }
            return Ok(());
        }

        let mut x = offset;
        for word in &line.words {
            let position = Position::new(mm_from_f64(x0 + x), mm_from_f64(y));
            if let Some(mut section) = area.text_section(font_cache, position, line.style) {
                for fragment in &word.fragments {
                    section.print_str(&fragment.text, fragment.style)?;
                }
            }
            x += word.metrics.width + word.metrics.space_after + extra_gap;
        }
        Ok(())
    }
}

/// Offsets of the horizontal strokes that cover a box of the given height.
pub fn fill_offsets(height: f64) -> Vec<f64> {
    if height <= EPSILON {
        return Vec::new();
    }
    let steps = (height / FILL_PITCH_MM).ceil() as usize;
    (0..=steps)
        .map(|step| (step as f64 * FILL_PITCH_MM).min(height))
        .collect()
}

/// Fills a rectangle with stacked horizontal strokes in `color`.
fn fill_rect(area: &render::Area<'_>, x: f64, y: f64, width: f64, height: f64, color: Color) {
    if width <= EPSILON {
        return;
    }
    let stroke = Style::new().with_color(color);
    for offset in fill_offsets(height) {
        area.draw_line(
            vec![
                Position::new(mm_from_f64(x), mm_from_f64(y + offset)),
                Position::new(mm_from_f64(x + width), mm_from_f64(y + offset)),
            ],
            stroke,
        );
    }
}

impl Element for TextBlock {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let area_width = mm_to_f64(area.size().width);

        if !self.started {
            self.started = true;
            let remaining = mm_to_f64(area.size().height);
            let at_top = self
                .tracker
                .as_ref()
                .map_or(false, |tracker| tracker.is_page_top(remaining));
            let before = if at_top {
                0.0
            } else {
                pt_to_mm(self.paragraph.space_before).min(remaining)
            };
            if before > 0.0 {
                area.add_offset(Position::new(0, mm_from_f64(before)));
                result.size = Size::new(0, mm_from_f64(before));
            }
        }

        let left = pt_to_mm(self.paragraph.left_indent);
        let right = pt_to_mm(self.paragraph.right_indent);
        let padding = pt_to_mm(self.paragraph.padding);
        let box_width = (area_width - left - right).max(0.0);
        let text_width = (box_width - 2.0 * padding).max(0.0);

        let base = style.and(self.text_style);
        let stale = self
            .layout
            .as_ref()
            .map_or(true, |layout| (layout.width - text_width).abs() > EPSILON);
        if stale {
            self.layout = Some(self.layout_lines(&context.font_cache, base, text_width));
        }
        let Some(layout) = self.layout.as_ref() else {
            return Ok(result);
        };

        let available = mm_to_f64(area.size().height) - 2.0 * padding;
        let mut used = 0.0;
        let mut end = self.next_line;
        while end < layout.lines.len() {
            let height = layout.lines[end].height;
            if used + height > available + EPSILON {
                break;
            }
            used += height;
            end += 1;
        }

        if end == self.next_line && end < layout.lines.len() {
            result.has_more = true;
            return Ok(result);
        }

        let block_height = used + 2.0 * padding;
        if let Some(background) = self.paragraph.background {
            fill_rect(&area, left, 0.0, box_width, block_height, background);
        }

        let mut y = padding;
        for line in &layout.lines[self.next_line..end] {
            self.render_line(&area, &context.font_cache, line, (left + padding, y), text_width)?;
            y += line.height;
        }

        let finished = end == layout.lines.len();
        self.next_line = end;
        result.size = result
            .size
            .stack_vertical(Size::new(mm_from_f64(area_width), mm_from_f64(block_height)));

        if !finished {
            result.has_more = true;
            return Ok(result);
        }

        let remaining = (mm_to_f64(area.size().height) - block_height).max(0.0);
        let after = pt_to_mm(self.paragraph.space_after).min(remaining);
        if after > 0.0 {
            result.size = result.size.stack_vertical(Size::new(0, mm_from_f64(after)));
        }
        Ok(result)
    }
}

/// Fixed vertical space in millimetres, clamped to what is left on the page.
pub struct VerticalSpace {
    height: f64,
}

impl VerticalSpace {
    pub fn new(height_mm: f64) -> Self {
        Self {
            height: height_mm.max(0.0),
        }
    }
}

impl Element for VerticalSpace {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let height = self.height.min(mm_to_f64(area.size().height));
        let mut result = RenderResult::default();
        result.size = Size::new(0, mm_from_f64(height));
        Ok(result)
    }
}

/// Shared page bookkeeping between the page decorator and [`PageMarker`] elements.
#[derive(Clone, Debug, Default)]
pub struct PageTracker {
    current: Rc<Cell<usize>>,
    body_height: Rc<Cell<f64>>,
    section_pages: Rc<RefCell<Vec<Option<usize>>>>,
}

impl PageTracker {
    /// Creates a tracker with room for `sections` section start pages.
    pub fn new(sections: usize) -> Self {
        Self {
            current: Rc::default(),
            body_height: Rc::default(),
            section_pages: Rc::new(RefCell::new(vec![None; sections])),
        }
    }

    /// Advances to the next page and returns its 1-based number.
    pub fn begin_page(&self) -> usize {
        let page = self.current.get() + 1;
        self.current.set(page);
        page
    }

    /// Records the height left for content on the current page once it is decorated.
    pub fn set_body_height(&self, height_mm: f64) {
        self.body_height.set(height_mm);
    }

    /// Whether an area with `remaining_mm` of height starts at the top of the page body.
    pub fn is_page_top(&self, remaining_mm: f64) -> bool {
        self.current.get() > 0 && (self.body_height.get() - remaining_mm).abs() <= EPSILON
    }

    /// Number of the page currently being rendered (0 before the first page).
    pub fn current_page(&self) -> usize {
        self.current.get()
    }

    /// Records the current page as the first page of section `index`, keeping earlier records.
    pub fn mark_section(&self, index: usize) {
        let mut pages = self.section_pages.borrow_mut();
        if index >= pages.len() {
            pages.resize(index + 1, None);
        }
        if pages[index].is_none() {
            pages[index] = Some(self.current.get());
        }
    }

    /// First page of every section, `None` for sections that were never rendered.
    pub fn section_pages(&self) -> Vec<Option<usize>> {
        self.section_pages.borrow().clone()
    }
}

/// Zero-size element recording the page on which a section starts.
pub struct PageMarker {
    tracker: PageTracker,
    section: usize,
}

impl PageMarker {
    pub fn new(tracker: PageTracker, section: usize) -> Self {
        Self { tracker, section }
    }
}

impl Element for PageMarker {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        _area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        self.tracker.mark_section(self.section);
        Ok(RenderResult::default())
    }
}

/// Footer text centered and `Page N` right aligned, drawn at the bottom of the footer area.
pub struct FooterLine {
    text: String,
    page: usize,
    color: Color,
}

impl FooterLine {
    pub fn new(text: impl Into<String>, page: usize, color: Color) -> Self {
        Self {
            text: text.into(),
            page,
            color,
        }
    }
}

/// Where the footer strings go inside the footer area, in millimetres from its top left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FooterPlacement {
    pub text_x: f64,
    pub number_x: f64,
    pub y: f64,
}

/// Centers the footer text, right-aligns the page number and puts both on the last line of an
/// area of `(width, height)`. Returns `None` when a line does not fit.
pub fn footer_placement(
    (width, height): (f64, f64),
    text_width: f64,
    number_width: f64,
    line_height: f64,
) -> Option<FooterPlacement> {
    if line_height > height + EPSILON {
        return None;
    }
    Some(FooterPlacement {
        text_x: ((width - text_width) / 2.0).max(0.0),
        number_x: (width - number_width).max(0.0),
        y: height - line_height,
    })
}

impl Element for FooterLine {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let font_cache = &context.font_cache;
        let text_style = style
            .with_font_size(FOOTER_TEXT_SIZE)
            .with_color(self.color);
        let number_style = style
            .with_font_size(FOOTER_NUMBER_SIZE)
            .with_color(self.color);

        let text = StyledString::new(self.text.clone(), text_style);
        let number = StyledString::new(format!("Page {}", self.page), number_style);
        // Both strings share the larger style so their baselines line up.
        let line_style = number_style;

        let width = mm_to_f64(area.size().width);
        let height = mm_to_f64(area.size().height);
        let mut result = RenderResult::default();
        let Some(placement) = footer_placement(
            (width, height),
            mm_to_f64(text.width(font_cache)),
            mm_to_f64(number.width(font_cache)),
            mm_to_f64(line_style.line_height(font_cache)),
        ) else {
            result.has_more = true;
            return Ok(result);
        };

        for (string, x) in [(&text, placement.text_x), (&number, placement.number_x)] {
            let position = Position::new(mm_from_f64(x), mm_from_f64(placement.y));
            if let Some(mut section) = area.text_section(font_cache, position, line_style) {
                section.print_str(&string.s, string.style)?;
            }
        }

        result.size = Size::new(mm_from_f64(width), mm_from_f64(height));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{StyleName, StyleSheet};

    fn words(widths: &[f64]) -> Vec<WordMetrics> {
        widths
            .iter()
            .map(|&width| WordMetrics {
                width,
                space_after: 1.0,
            })
            .collect()
    }

    #[test]
    fn breaks_greedily() {
        // 10 + 1 + 10 = 21 fits in 25; adding another word would need 32.
        let lines = break_lines(&words(&[10.0, 10.0, 10.0, 5.0]), 25.0);
        assert_eq!(lines, vec![0..2, 2..4]);
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let lines = break_lines(&words(&[5.0, 40.0, 5.0]), 20.0);
        assert_eq!(lines, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn empty_input_keeps_one_blank_line() {
        assert_eq!(break_lines(&[], 20.0), vec![0..0]);
    }

    #[test]
    fn line_width_ignores_trailing_space() {
        assert_eq!(line_width(&words(&[10.0, 5.0])), 16.0);
        assert_eq!(line_width(&[]), 0.0);
    }

    #[test]
    fn justify_distributes_free_width() {
        assert_eq!(justify_gap(100.0, 90.0, 4), 2.5);
        assert_eq!(justify_gap(100.0, 90.0, 0), 0.0);
        assert_eq!(justify_gap(100.0, 120.0, 3), 0.0);
    }

    fn texts(words: &[Word]) -> Vec<String> {
        words
            .iter()
            .map(|word| {
                word.fragments
                    .iter()
                    .map(|fragment| fragment.text.as_str())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn split_words_keeps_indentation() {
        let line = vec![("   - Action".to_owned(), Style::new())];
        let words = split_words(&line);
        assert_eq!(texts(&words), vec!["   -", "Action"]);
        assert_eq!(words[0].space.as_ref().map(|s| s.text.as_str()), Some(" "));
    }

    #[test]
    fn split_words_joins_fragments_across_spans() {
        let line = vec![
            ("Cas d'usage".to_owned(), Style::new().bold()),
            (" : emails".to_owned(), Style::new()),
        ];
        let words = split_words(&line);
        assert_eq!(texts(&words), vec!["Cas", "d'usage", ":", "emails"]);
        assert!(words[1].fragments[0].style.is_bold());
        assert!(!words[2].fragments[0].style.is_bold());
    }

    #[test]
    fn split_words_handles_adjacent_styled_spans() {
        let line = vec![
            ("-30".to_owned(), Style::new().bold()),
            ("%".to_owned(), Style::new()),
        ];
        let words = split_words(&line);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].fragments.len(), 2);
    }

    #[test]
    fn tracker_records_first_page_only() {
        let tracker = PageTracker::new(2);
        tracker.begin_page();
        tracker.mark_section(0);
        tracker.begin_page();
        tracker.mark_section(0);
        tracker.mark_section(1);
        assert_eq!(tracker.section_pages(), vec![Some(1), Some(2)]);
        assert_eq!(tracker.current_page(), 2);
    }

    #[test]
    fn text_block_splits_lines_on_newlines() {
        let block = TextBlock::new(
            &[Span::new("a\n\nb").bold(), Span::new(" c")],
            *StyleSheet::default().get(StyleName::Body),
            Style::new(),
        );
        assert_eq!(block.lines.len(), 3);
        assert!(block.lines[1].is_empty());
        assert_eq!(block.lines[2].len(), 2);
    }

    #[test]
    fn fill_strokes_cover_the_whole_box() {
        let offsets = fill_offsets(1.0);
        assert_eq!(offsets.first(), Some(&0.0));
        assert_eq!(offsets.last(), Some(&1.0));
        assert!(offsets
            .windows(2)
            .all(|pair| pair[1] - pair[0] <= FILL_PITCH_MM + EPSILON));
        assert!(fill_offsets(0.0).is_empty());
    }

    #[test]
    fn footer_text_is_centered_and_number_right_aligned() {
        let placement = footer_placement((170.0, 18.0), 70.0, 12.0, 4.0).expect("footer fits");
        assert_eq!(placement.text_x, 50.0);
        assert_eq!(placement.number_x, 158.0);
        assert_eq!(placement.y, 14.0);
    }

    #[test]
    fn footer_placement_rejects_short_areas() {
        assert_eq!(footer_placement((170.0, 3.0), 70.0, 12.0, 4.0), None);
    }

    #[test]
    fn page_top_is_the_full_body_height() {
        let tracker = PageTracker::default();
        assert!(!tracker.is_page_top(0.0));

        tracker.begin_page();
        tracker.set_body_height(237.0);
        assert!(tracker.is_page_top(237.0));
        assert!(!tracker.is_page_top(200.0));
    }
}
