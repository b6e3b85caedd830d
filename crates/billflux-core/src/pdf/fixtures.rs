//! One-page PDFs built with lopdf for tests.

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Build a one-page PDF from a raw content stream and page resources.
pub fn make_pdf(content: &str, resources: Dictionary) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");

    let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => resources,
    });

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    });

    if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
        dict.set("Parent", pages_id);
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// One-page PDF showing `text` in Helvetica.
pub fn text_pdf(text: &str) -> Vec<u8> {
    make_pdf(
        &format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET"),
        dictionary! {
            "Font" => dictionary! {
                "F1" => dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                },
            },
        },
    )
}

/// Structurally valid PDF whose content selects a font the page never defines.
pub fn undefined_font_pdf() -> Vec<u8> {
    make_pdf("BT /F9 12 Tf 100 700 Td (Subtotal $1.00) Tj ET", dictionary! {})
}
