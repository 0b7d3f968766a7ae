//! Low-level drawing onto lopdf pages
//!
//! Shared by the editor and the image-to-PDF builder: embedding raster
//! images as XObjects, registering page resources and appending content
//! streams without disturbing what the page already draws.

use image::{DynamicImage, GenericImageView};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::error::PdfError;

/// Font every text edit is drawn with
pub const TEXT_FONT: &str = "Helvetica";

/// Line height as a multiple of the font size
const LEADING: f32 = 1.2;

/// Embed `img` as an RGB image XObject, with a soft mask when it has alpha
pub fn embed_image(doc: &mut Document, img: &DynamicImage) -> ObjectId {
    let (width, height) = img.dimensions();
    let mut dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ]);

    if img.color().has_alpha() {
        let alpha: Vec<u8> = img.to_rgba8().pixels().map(|p| p.0[3]).collect();
        let smask = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(width as i64)),
            ("Height", Object::Integer(height as i64)),
            ("ColorSpace", Object::Name(b"DeviceGray".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
        ]);
        let smask_id = doc.add_object(Stream::new(smask, alpha));
        dict.set("SMask", Object::Reference(smask_id));
    }

    doc.add_object(Stream::new(dict, img.to_rgb8().into_raw()))
}

/// Standard Helvetica font object in WinAnsi encoding
pub fn embed_standard_font(doc: &mut Document) -> ObjectId {
    doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(TEXT_FONT.as_bytes().to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]))
}

/// Resources in effect for a page, following `Parent` links when the page
/// inherits them
pub(crate) fn effective_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut current = Some(page_id);
    let mut depth = 0;

    while let Some(id) = current {
        if depth > 64 {
            break;
        }
        let Ok(node) = doc.get_dictionary(id) else {
            break;
        };
        match node.get(b"Resources") {
            Ok(Object::Dictionary(d)) => return d.clone(),
            Ok(Object::Reference(r)) => {
                if let Ok(d) = doc.get_dictionary(*r) {
                    return d.clone();
                }
            }
            _ => {}
        }
        current = node.get(b"Parent").and_then(|p| p.as_reference()).ok();
        depth += 1;
    }

    Dictionary::new()
}

/// Register `target` under a fresh name in the page's `category`
/// (`Font`, `XObject`) resource dictionary and return that name
pub fn add_page_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    prefix: &str,
    target: ObjectId,
) -> Result<String, PdfError> {
    let mut resources = effective_resources(doc, page_id);

    let mut entries = match resources.get(category.as_bytes()) {
        Ok(Object::Dictionary(d)) => d.clone(),
        Ok(Object::Reference(r)) => doc
            .get_dictionary(*r)
            .map(|d| d.clone())
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    };

    let mut n = 1;
    let name = loop {
        let candidate = format!("{}{}", prefix, n);
        if !entries.has(candidate.as_bytes()) {
            break candidate;
        }
        n += 1;
    };

    entries.set(name.as_str(), Object::Reference(target));
    resources.set(category, Object::Dictionary(entries));

    doc.get_dictionary_mut(page_id)
        .map_err(|e| PdfError::Operation(format!("Invalid page object: {}", e)))?
        .set("Resources", Object::Dictionary(resources));

    Ok(name)
}

/// Append a content stream after the page's existing content. The existing
/// content is wrapped in `q`/`Q` so its graphics state cannot leak into ours.
pub fn append_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<(), PdfError> {
    let encoded = Content { operations }
        .encode()
        .map_err(|e| PdfError::Operation(format!("Failed to encode content: {}", e)))?;

    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(other) => vec![other.clone()],
        Err(_) => Vec::new(),
    };

    let new_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let contents = if existing.is_empty() {
        vec![Object::Reference(new_id)]
    } else {
        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
        let mut contents = Vec::with_capacity(existing.len() + 3);
        contents.push(Object::Reference(save_id));
        contents.extend(existing);
        contents.push(Object::Reference(restore_id));
        contents.push(Object::Reference(new_id));
        contents
    };

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Map text to single-byte WinAnsi codes; characters outside Latin-1 become `?`
fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

fn real(v: f32) -> Object {
    Object::Real(v)
}

/// Operations drawing black text with its first baseline at `(x, y)`
pub fn text_operations(font: &str, size: f32, x: f32, y: f32, text: &str) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), real(size)]),
        Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
        Operation::new("TL", vec![real(size * LEADING)]),
        Operation::new("Td", vec![real(x), real(y)]),
    ];

    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            ops.push(Operation::new("T*", vec![]));
        }
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi_bytes(line), StringFormat::Literal)],
        ));
    }

    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// Operations painting an image XObject into the given rectangle
pub fn image_operations(name: &str, x: f32, y: f32, width: f32, height: f32) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![real(width), real(0.0), real(0.0), real(height), real(x), real(y)],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_ansi_bytes() {
        assert_eq!(win_ansi_bytes("Hi!"), b"Hi!".to_vec());
        assert_eq!(win_ansi_bytes("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(win_ansi_bytes("日本"), b"??".to_vec());
    }

    #[test]
    fn test_text_operations_multiline() {
        let ops = text_operations("F1", 12.0, 50.0, 700.0, "one\ntwo");
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(
            names,
            vec!["q", "BT", "Tf", "rg", "TL", "Td", "Tj", "T*", "Tj", "ET", "Q"]
        );
    }
}
