//! PDF merge
//!
//! Concatenates documents in the order given.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;

use super::error::PdfError;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Merge multiple PDFs into one
///
/// 1. Load every source, rejecting the whole job if one fails to parse
/// 2. Shift each later document's object IDs past the current maximum
/// 3. Copy inherited page attributes onto the pages themselves
/// 4. Rebuild the destination page tree with all pages in input order
pub fn merge_documents(documents: Vec<Vec<u8>>) -> Result<Vec<u8>, PdfError> {
    if documents.is_empty() {
        return Err(PdfError::InvalidInput("No documents to merge".into()));
    }

    let mut loaded_docs = Vec::with_capacity(documents.len());
    for (i, doc_bytes) in documents.iter().enumerate() {
        let doc = Document::load_mem(doc_bytes)
            .map_err(|e| PdfError::Parse(format!("Failed to load document {}: {}", i + 1, e)))?;
        loaded_docs.push(doc);
    }

    let mut dest = loaded_docs.remove(0);
    let mut dest_max_id = dest.max_id;
    let mut dest_page_refs = page_references(&dest);

    for source in loaded_docs.into_iter() {
        let source_pages = page_references(&source);
        let id_offset = dest_max_id;

        let mut remapped_objects = BTreeMap::new();
        for (old_id, object) in source.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            remapped_objects.insert(new_id, remap_object_refs(object, id_offset));
        }
        dest.objects.extend(remapped_objects);

        dest_page_refs.extend(
            source_pages
                .into_iter()
                .map(|(id, gen)| (id + id_offset, gen)),
        );

        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }

    dest.max_id = dest_max_id;

    let pages_id = pages_root(&dest)?;
    for &page_id in &dest_page_refs {
        flatten_inherited(&mut dest, page_id, pages_id)?;
    }
    update_page_tree(&mut dest, pages_id, &dest_page_refs)?;

    // Drops the source catalogs and page trees that are no longer referenced
    dest.prune_objects();
    dest.compress();

    let mut buffer = Vec::new();
    dest.save_to(&mut buffer)
        .map_err(|e| PdfError::Operation(format!("Failed to save merged PDF: {}", e)))?;

    tracing::debug!(
        documents = documents.len(),
        pages = dest_page_refs.len(),
        size = buffer.len(),
        "Merged PDFs"
    );

    Ok(buffer)
}

fn page_references(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Recursively remap object references in an object
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(dict) => Object::Dictionary(remap_dict(dict, offset)),
        Object::Stream(mut stream) => {
            stream.dict = remap_dict(stream.dict, offset);
            Object::Stream(stream)
        }
        other => other,
    }
}

fn remap_dict(mut dict: Dictionary, offset: u32) -> Dictionary {
    for (_, value) in dict.iter_mut() {
        *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
    }
    dict
}

fn pages_root(doc: &Document) -> Result<ObjectId, PdfError> {
    let catalog = doc
        .catalog()
        .map_err(|e| PdfError::Operation(format!("Catalog not found: {}", e)))?;
    catalog
        .get(b"Pages")
        .and_then(|p| p.as_reference())
        .map_err(|_| PdfError::Operation("Pages is not a reference".into()))
}

/// Copy attributes the page inherits onto the page and re-parent it
fn flatten_inherited(
    doc: &mut Document,
    page_id: ObjectId,
    new_parent: ObjectId,
) -> Result<(), PdfError> {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| PdfError::Operation(format!("Invalid page object: {}", e)))?;

        for key in INHERITABLE {
            if page.has(key) {
                continue;
            }
            let mut parent = page.get(b"Parent").and_then(|p| p.as_reference()).ok();
            let mut depth = 0;
            while let Some(parent_id) = parent {
                if depth > 64 {
                    break;
                }
                let Ok(node) = doc.get_dictionary(parent_id) else {
                    break;
                };
                if let Ok(value) = node.get(key) {
                    inherited.push((*key, value.clone()));
                    break;
                }
                parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok();
                depth += 1;
            }
        }
    }

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| PdfError::Operation(format!("Invalid page object: {}", e)))?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    page.set("Parent", Object::Reference(new_parent));
    Ok(())
}

/// Point the root page tree node at `page_refs`
fn update_page_tree(
    doc: &mut Document,
    pages_id: ObjectId,
    page_refs: &[ObjectId],
) -> Result<(), PdfError> {
    if let Some(Object::Dictionary(ref mut pages_dict)) = doc.objects.get_mut(&pages_id) {
        let kids = page_refs
            .iter()
            .map(|&id| Object::Reference(id))
            .collect::<Vec<_>>();
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
        Ok(())
    } else {
        Err(PdfError::Operation("Invalid pages dictionary".into()))
    }
}
