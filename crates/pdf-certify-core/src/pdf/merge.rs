//! Page-preserving concatenation of whole PDF documents.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// A named input to [`merge_documents`]; the label only shows up in errors.
pub struct MergeInput<'a> {
    pub label: String,
    pub bytes: &'a [u8],
}

/// Output of [`merge_documents`]
#[derive(Debug)]
pub struct MergedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Combine complete PDF documents into one, keeping every page in input order.
pub fn merge_documents(inputs: &[MergeInput<'_>]) -> Result<MergedPdf> {
    if inputs.is_empty() {
        return Err(Error::Merge("No documents to merge".to_string()));
    }

    // Parse everything up front so a bad input aborts before any work is kept
    let mut sources = Vec::with_capacity(inputs.len());
    for input in inputs {
        let doc = Document::load_mem(input.bytes)
            .map_err(|e| Error::Merge(format!("Failed to load {}: {}", input.label, e)))?;
        sources.push((input.label.as_str(), doc));
    }

    let mut max_id: u32 = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: Vec<(ObjectId, Object)> = Vec::new();
    let mut document = Document::with_version("1.5");

    for (label, mut doc) in sources {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        debug!("{} contributes {} page(s)", label, page_ids.len());

        for page_id in page_ids {
            pages.push((page_id, resolve_page(&doc, page_id, label)?));
        }

        for (object_id, object) in doc.objects {
            match object.type_name().unwrap_or(b"") {
                b"Catalog" | b"Pages" | b"Page" | b"Outlines" | b"Outline" => {}
                _ => objects.push((object_id, object)),
            }
        }
    }

    for (object_id, object) in objects {
        document.objects.insert(object_id, object);
    }
    document.max_id = max_id;

    let pages_id = document.new_object_id();

    let mut kids = Vec::with_capacity(pages.len());
    for (page_id, mut dict) in pages {
        dict.set("Parent", Object::Reference(pages_id));
        document.objects.insert(page_id, Object::Dictionary(dict));
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len();
    let total_pages = i64::try_from(page_count)
        .map_err(|_| Error::Merge("too many pages".to_string()))?;

    document.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(total_pages)),
        ])),
    );

    let catalog_id = document.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    document.trailer.set("Root", Object::Reference(catalog_id));

    document.renumber_objects();
    document.compress();

    let mut output = Vec::new();
    document
        .save_to(&mut output)
        .map_err(|e| Error::Merge(format!("Failed to save merged PDF: {e}")))?;

    Ok(MergedPdf {
        bytes: output,
        page_count,
    })
}

/// Copy a page dictionary, filling in attributes it inherits from the tree.
fn resolve_page(doc: &Document, page_id: ObjectId, label: &str) -> Result<Dictionary> {
    let mut dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::Merge(format!("Invalid page in {label}: {e}")))?
        .clone();

    let mut parent = dict.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            return Err(Error::Merge(format!("Page tree in {label} is too deep")));
        }
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if !dict.has(key)
                && let Ok(value) = node.get(key)
            {
                dict.set(key, value.clone());
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(dict)
}

/// Merge the PDFs at `inputs`, in order, into `output`.
///
/// Every input is read and parsed before `output` is touched; an existing
/// file at `output` is overwritten. Returns the number of merged pages.
pub fn merge_pdfs<P: AsRef<Path>>(inputs: &[P], output: &Path) -> Result<usize> {
    info!("Merging {} PDFs into {}", inputs.len(), output.display());

    let mut contents = Vec::with_capacity(inputs.len());
    for path in inputs {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Merge(format!("Failed to read {}: {}", path.display(), e)))?;
        contents.push((path.display().to_string(), bytes));
    }

    let merge_inputs: Vec<MergeInput<'_>> = contents
        .iter()
        .map(|(label, bytes)| MergeInput {
            label: label.clone(),
            bytes,
        })
        .collect();

    let merged = merge_documents(&merge_inputs)?;

    std::fs::write(output, &merged.bytes)
        .map_err(|e| Error::Merge(format!("Failed to write {}: {}", output.display(), e)))?;

    Ok(merged.page_count)
}
