//! Shared fixtures: synthetic documents as fragments and as real PDFs.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use pdfoutline::{BBox, Fragment, PageFragments};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

/// One line of text placed at `top` (top-down) on a page.
#[derive(Debug, Clone)]
pub struct Run {
    pub text: &'static str,
    pub size: f32,
    pub bold: bool,
    pub top: f32,
}

pub fn run(text: &'static str, size: f32, bold: bool, top: f32) -> Run {
    Run {
        text,
        size,
        bold,
        top,
    }
}

/// `count` body lines of 11pt text starting at `top`.
pub fn body(top: f32, count: usize) -> Vec<Run> {
    (0..count)
        .map(|i| run("The quick brown fox jumps over the lazy dog", 11.0, false, top + i as f32 * 16.0))
        .collect()
}

/// Build in-memory pages directly, bypassing the decoder.
pub fn pages(layout: &[Vec<Run>]) -> Vec<PageFragments> {
    layout.iter()
        .enumerate()
        .map(|(index, runs)| {
            let mut page = PageFragments::letter(index);
            for r in runs {
                let width = r.text.chars().count() as f32 * r.size * 0.5;
                let font = if r.bold { "Helvetica-Bold" } else { "Helvetica" };
                page.push(Fragment::new(
                    r.text,
                    font,
                    r.size,
                    BBox::new(72.0, r.top, 72.0 + width, r.top + r.size),
                    index,
                ));
            }
            page
        })
        .collect()
}

/// Two pages with no separate title line: Introduction (24pt bold) on the
/// first, Background (18pt) and Details (14pt bold) on the second, over 11pt
/// body text.
pub fn two_page_sections() -> Vec<Vec<Run>> {
    let mut first = vec![run("Introduction", 24.0, true, 80.0)];
    first.extend(body(120.0, 5));

    let mut second = vec![run("Background", 18.0, false, 80.0)];
    second.extend(body(110.0, 5));
    second.push(run("Details", 14.0, true, 250.0));
    second.extend(body(280.0, 5));

    vec![first, second]
}

/// The two-page report used across tests: a title line, then
/// Introduction (24pt bold), Background (18pt) and Details (14pt bold)
/// over 11pt body text.
pub fn two_page_report() -> Vec<Vec<Run>> {
    let mut first = vec![
        run("Annual Systems Review", 28.0, true, 60.0),
        run("Introduction", 24.0, true, 140.0),
    ];
    first.extend(body(180.0, 5));

    let mut second = vec![run("Background", 18.0, false, 80.0)];
    second.extend(body(110.0, 5));
    second.push(run("Details", 14.0, true, 250.0));
    second.extend(body(280.0, 5));

    vec![first, second]
}

/// Write a real PDF with one Helvetica / Helvetica-Bold text run per line.
pub fn build_pdf(layout: &[Vec<Run>], info_title: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids = Vec::new();
    for runs in layout {
        let mut operations = Vec::new();
        for r in runs {
            let baseline = PAGE_HEIGHT - r.top - r.size * 0.8;
            let font = if r.bold { "F2" } else { "F1" };
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec![font.into(), Object::Real(r.size)]));
            operations.push(Operation::new(
                "Td",
                vec![Object::Real(72.0), Object::Real(baseline)],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(r.text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(PAGE_WIDTH), Object::Real(PAGE_HEIGHT)],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = info_title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save pdf");
    buffer
}
