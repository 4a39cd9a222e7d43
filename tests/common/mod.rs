//! Shared test fixtures: minimal PDFs assembled in memory with lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as LopdfDocument, Object, Stream};

/// One positioned text run: (text, x, y, font size).
pub type Run<'a> = (&'a str, f32, f32, f32);

/// Build a PDF with one page per entry; each page draws its runs in
/// Helvetica at the given positions. An empty run list produces a page with
/// an empty content stream.
pub fn build_pdf(pages: &[Vec<Run<'_>>]) -> Vec<u8> {
    build_pdf_titled(pages, None)
}

/// Like [`build_pdf`], with an optional Info-dictionary title.
pub fn build_pdf_titled(pages: &[Vec<Run<'_>>], title: Option<&str>) -> Vec<u8> {
    let mut doc = LopdfDocument::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for runs in pages {
        let mut operations = Vec::new();
        for (text, x, y, size) in runs {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), (*size).into()]));
            operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
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
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize fixture pdf");
    bytes
}

/// A three-page document: "Introduction" and a paragraph on page 1, nothing
/// on page 2, "Conclusion" and a paragraph on page 3.
pub fn intro_conclusion_pdf() -> Vec<u8> {
    build_pdf(&[
        vec![
            ("Introduction", 72.0, 720.0, 24.0),
            ("The opening paragraph covers the motivation.", 72.0, 690.0, 12.0),
        ],
        vec![],
        vec![
            ("Conclusion", 72.0, 720.0, 24.0),
            ("The closing paragraph restates the findings.", 72.0, 690.0, 12.0),
        ],
    ])
}
