use std::cell::RefCell;
use std::rc::Rc;

use genpdf::{Margins, PaperSize};
use prompt_guide::builder::{
    render_to_path, DocumentBuilder, PdfBuilder, RenderOptions, RenderedGuide,
    DEFAULT_FOOTER_TEXT, FOOTER_HEIGHT_MM,
};
use prompt_guide::content::{self, ContentOptions};
use prompt_guide::elements::{FooterLine, PageTracker, TextBlock};
use prompt_guide::fonts;
use prompt_guide::model::{Block, Cover, Guide, Section};
use prompt_guide::richtext::Span;
use prompt_guide::style::{Palette, StyleName, StyleSheet};
use sha2::{Digest, Sha256};

const SKIP_HINT: &str = "guide fonts missing. Set PROMPT_GUIDE_FONTS_DIR or copy the Liberation fonts into assets/fonts.";

fn render_guide(options: ContentOptions) -> Option<RenderedGuide> {
    if !fonts::guide_fonts_available() {
        return None;
    }

    let guide = content::lead_magnet_guide(&options).expect("guide content parses");
    let rendered = PdfBuilder::new(guide)
        .with_options(RenderOptions::default())
        .render()
        .expect("render guide pdf");

    Some(rendered)
}

fn numbered_lines(count: usize) -> String {
    (1..=count)
        .map(|line| format!("ligne {line} du prompt"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            else {
                break;
            };
            let start_index = offset + start_pos + start.len();
            let Some(end_pos) = data[start_index..]
                .windows(end.len())
                .position(|window| window == end)
            else {
                break;
            };
            for byte in &mut data[start_index..start_index + end_pos] {
                if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            offset = start_index + end_pos + end.len();
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    scrub_xml(&mut normalized, b"<xmp:CreateDate>", b"</xmp:CreateDate>");
    scrub_xml(&mut normalized, b"<xmp:ModifyDate>", b"</xmp:ModifyDate>");
    scrub_xml(&mut normalized, b"<xmp:MetadataDate>", b"</xmp:MetadataDate>");
    scrub_xml(&mut normalized, b"<xmpMM:DocumentID>", b"</xmpMM:DocumentID>");
    scrub_xml(&mut normalized, b"<xmpMM:InstanceID>", b"</xmpMM:InstanceID>");
    scrub_xml(&mut normalized, b"<xmpMM:VersionID>", b"</xmpMM:VersionID>");
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

#[test]
fn renders_a_pdf_document() {
    let Some(rendered) = render_guide(ContentOptions::default()) else {
        eprintln!("Skipping renders_a_pdf_document: {SKIP_HINT}");
        return;
    };

    assert!(rendered.bytes.starts_with(b"%PDF"), "missing PDF header");
    assert!(
        rendered.page_count >= 8,
        "cover, introduction, five prompts and bonus need at least 8 pages, got {}",
        rendered.page_count
    );
}

#[test]
fn sections_start_on_expected_pages() {
    let Some(rendered) = render_guide(ContentOptions::default()) else {
        eprintln!("Skipping sections_start_on_expected_pages: {SKIP_HINT}");
        return;
    };

    let pages: Vec<usize> = rendered
        .section_pages
        .iter()
        .map(|page| page.expect("every section is rendered"))
        .collect();
    assert_eq!(pages.len(), 8);

    // Cover alone on page 1, introduction on page 2, one new page per prompt.
    assert_eq!(pages[0], 2);
    assert_eq!(pages[1], 3);
    for window in pages[1..=6].windows(2) {
        assert!(window[1] > window[0], "prompt and bonus pages: {pages:?}");
    }

    // The call to action follows the bonus tips without a page break.
    assert!(pages[7] >= pages[6]);
    assert!(pages[7] <= rendered.page_count);
}

#[test]
fn summary_table_adds_a_page() {
    let Some(plain) = render_guide(ContentOptions::default()) else {
        eprintln!("Skipping summary_table_adds_a_page: {SKIP_HINT}");
        return;
    };
    let Some(with_table) = render_guide(ContentOptions {
        summary_table: true,
    }) else {
        return;
    };

    assert_eq!(with_table.section_pages.len(), 9);
    assert!(with_table.page_count > plain.page_count);
}

#[test]
fn render_to_path_creates_parent_directories() {
    if !fonts::guide_fonts_available() {
        eprintln!("Skipping render_to_path_creates_parent_directories: {SKIP_HINT}");
        return;
    }

    let dir = std::env::temp_dir().join(format!("prompt_guide_{}", std::process::id()));
    let path = dir.join("guides").join("guide.pdf");
    let guide = content::lead_magnet_guide(&ContentOptions::default()).expect("guide content");
    let rendered =
        render_to_path(guide, RenderOptions::default(), &path).expect("render and write guide");

    let written = std::fs::read(&path).expect("read back guide");
    assert_eq!(written, rendered.bytes);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn rendering_is_deterministic() {
    let Some(first) = render_guide(ContentOptions::default()) else {
        eprintln!("Skipping rendering_is_deterministic: {SKIP_HINT}");
        return;
    };
    let Some(second) = render_guide(ContentOptions::default()) else {
        return;
    };

    assert_eq!(first.bytes.len(), second.bytes.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&first.bytes),
        normalized_hash(&second.bytes),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn footer_is_drawn_on_every_page_in_order() {
    if !fonts::guide_fonts_available() {
        eprintln!("Skipping footer_is_drawn_on_every_page_in_order: {SKIP_HINT}");
        return;
    }

    let seen = Rc::new(RefCell::new(Vec::new()));
    let recorder = Rc::clone(&seen);
    let tracker = PageTracker::default();
    let footer_color = Palette::default().footer;
    let (mut document, mono) = DocumentBuilder::new()
        .with_paper_size(PaperSize::A4)
        .with_margins(Margins::trbl(30, 20, 12, 20))
        .with_footer(FOOTER_HEIGHT_MM, move |page| {
            recorder.borrow_mut().push(page);
            FooterLine::new(DEFAULT_FOOTER_TEXT, page, footer_color)
        })
        .with_tracker(tracker.clone())
        .build()
        .expect("build document");

    let code = *StyleSheet::default().get(StyleName::Code);
    document.push(TextBlock::new(
        &[Span::new(numbered_lines(150))],
        code,
        code.text_style(Some(mono)),
    ));
    let mut bytes = Vec::<u8>::new();
    document.render(&mut bytes).expect("render document");

    let pages = tracker.current_page();
    assert!(pages > 1, "150 code lines should not fit on one page");
    assert_eq!(*seen.borrow(), (1..=pages).collect::<Vec<_>>());
}

#[test]
fn long_code_block_flows_over_several_pages() {
    if !fonts::guide_fonts_available() {
        eprintln!("Skipping long_code_block_flows_over_several_pages: {SKIP_HINT}");
        return;
    }

    let guide = Guide::new("Long", Cover::new(["Long"]))
        .with_section(
            Section::builder("Code")
                .start_on_new_page(true)
                .push_block(Block::code(numbered_lines(200)))
                .build(),
        )
        .with_section(
            Section::builder("Suite")
                .start_on_new_page(true)
                .push_block(Block::markup(StyleName::Body, "Fin du guide.").expect("markup"))
                .build(),
        );
    let rendered = PdfBuilder::new(guide).render().expect("render long guide");

    assert_eq!(rendered.section_pages[0], Some(2));
    let next = rendered.section_pages[1].expect("second section rendered");
    assert!(next >= 4, "200 code lines need several pages: {:?}", rendered.section_pages);
    assert_eq!(next, rendered.page_count);
}

#[cfg(feature = "bookmarks")]
#[test]
fn bookmarks_add_an_outline() {
    if !fonts::guide_fonts_available() {
        eprintln!("Skipping bookmarks_add_an_outline: {SKIP_HINT}");
        return;
    }

    let guide = content::lead_magnet_guide(&ContentOptions::default()).expect("guide content");
    let rendered = PdfBuilder::new(guide)
        .render_with_bookmarks()
        .expect("render with bookmarks");

    let needle = b"/Outlines";
    assert!(rendered
        .bytes
        .windows(needle.len())
        .any(|window| window == needle));
}
