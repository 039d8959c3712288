//! PDF inspector - page count and encryption status without rendering

use std::collections::HashSet;
use std::sync::LazyLock;

use lopdf::{Document, Object, ObjectId, Reader};
use regex::bytes::Regex;

use super::scan::{self, MAX_NESTING_DEPTH};
use crate::metadata::PdfMetadata;
use crate::sniff::pdf_header_offset;
use crate::traits::{guard_decoder, InspectionError, PdfInspector};

static HEADER_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%PDF-(\d\.\d)").expect("valid header pattern"));

/// Set on an object stream whose contents were dropped for nesting too deeply
const NESTING_REJECTED_KEY: &str = "DocgateNestingRejected";

/// PDF inspector backed by `lopdf`
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfInspector;

impl LopdfInspector {
    pub fn new() -> Self {
        Self
    }
}

impl PdfInspector for LopdfInspector {
    fn inspect(&self, data: &[u8]) -> Result<PdfMetadata, InspectionError> {
        // Cross-reference offsets count from the header, not from any junk before it
        let pdf = &data[pdf_header_offset(data).unwrap_or(0)..];
        let version = header_version(pdf);

        let loaded = match structural_fault(pdf) {
            Some(fault) => Err(fault),
            None => guard_decoder("lopdf", || load(pdf)),
        };

        let document = match loaded {
            Ok(document) => document,
            // An encrypted file is reported as such even when its structure is unreadable
            Err(err) if scan::trailer_declares_encryption(pdf) => {
                tracing::debug!(error = %err, "Encrypted PDF could not be parsed");
                return Ok(PdfMetadata {
                    page_count: 0,
                    is_encrypted: true,
                    version,
                });
            }
            Err(err) => return Err(err),
        };

        if document.trailer.get(b"Encrypt").is_ok() {
            let page_count = guard_decoder("lopdf", || count_pages(&document)).unwrap_or(0);
            return Ok(PdfMetadata {
                page_count,
                is_encrypted: true,
                version,
            });
        }

        if has_rejected_object_stream(&document) {
            return Err(InspectionError::Malformed(format!(
                "Object stream nested deeper than {} levels",
                MAX_NESTING_DEPTH
            )));
        }

        let page_count = guard_decoder("lopdf", || count_pages(&document))?;
        if page_count == 0 {
            return Err(InspectionError::NoPages);
        }

        tracing::debug!(page_count, version = ?version, "Inspected PDF structure");

        Ok(PdfMetadata {
            page_count,
            is_encrypted: false,
            version,
        })
    }
}

/// Faults found by linear scans that the parser must never see. lopdf recurses on nested
/// arrays and dictionaries without a depth limit.
fn structural_fault(pdf: &[u8]) -> Option<InspectionError> {
    if scan::exceeds_nesting_depth(pdf, MAX_NESTING_DEPTH) {
        return Some(InspectionError::Malformed(format!(
            "Objects nested deeper than {} levels",
            MAX_NESTING_DEPTH
        )));
    }

    if scan::has_cyclic_xref_chain(pdf) {
        return Some(InspectionError::Malformed(
            "Cross-reference chain loops back on itself".to_string(),
        ));
    }

    None
}

fn load(pdf: &[u8]) -> Result<Document, InspectionError> {
    let screen: fn(ObjectId, &mut Object) -> Option<(ObjectId, Object)> = screen_object_stream;
    Reader {
        buffer: pdf,
        document: Document::new(),
    }
    .read(Some(screen))
    .map_err(|e| InspectionError::Malformed(e.to_string()))
}

/// Load filter applied to every object before lopdf unpacks object streams. Compressed
/// object streams hide their contents from the raw scan, so they are checked here: a
/// stream that nests too deeply is emptied and marked, anything else is stored
/// decompressed.
fn screen_object_stream(id: ObjectId, object: &mut Object) -> Option<(ObjectId, Object)> {
    if let Ok(stream) = object.as_stream_mut() {
        if stream.dict.type_is(b"ObjStm") {
            match stream.get_plain_content() {
                Ok(content) if scan::exceeds_nesting_depth(&content, MAX_NESTING_DEPTH) => {
                    // An empty object stream unpacks to nothing
                    stream.set_plain_content(Vec::new());
                    stream.dict.set(NESTING_REJECTED_KEY, true);
                }
                Ok(content) => stream.set_plain_content(content),
                Err(_) => {}
            }
        }
    }
    Some((id, object.clone()))
}

fn has_rejected_object_stream(document: &Document) -> bool {
    document.objects.values().any(|object| {
        object
            .as_stream()
            .map(|stream| stream.dict.get(NESTING_REJECTED_KEY.as_bytes()).is_ok())
            .unwrap_or(false)
    })
}

/// Count leaf pages by walking the page tree from the catalog. A node reached twice
/// means the tree has a cycle or a shared subtree, and the document is malformed.
fn count_pages(document: &Document) -> Result<u32, InspectionError> {
    let root = document
        .catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| InspectionError::Malformed(format!("No page tree: {}", e)))?;

    let mut pending = vec![root];
    let mut visited = HashSet::new();
    let mut page_count: u32 = 0;

    while let Some(node_id) = pending.pop() {
        if !visited.insert(node_id) {
            return Err(InspectionError::Malformed(format!(
                "Page tree revisits object {} {}",
                node_id.0, node_id.1
            )));
        }

        let node = document
            .get_dictionary(node_id)
            .map_err(|e| InspectionError::Malformed(format!("Unreadable page tree node: {}", e)))?;

        let kids = match node.get(b"Kids") {
            Ok(Object::Reference(id)) => Some(document.get_object(*id).and_then(Object::as_array)),
            Ok(kids) => Some(kids.as_array()),
            Err(_) => None,
        };

        match kids {
            None => page_count = page_count.saturating_add(1),
            Some(Ok(kids)) => {
                for kid in kids.iter().rev() {
                    let kid_id = kid.as_reference().map_err(|_| {
                        InspectionError::Malformed("Page tree kid is not a reference".to_string())
                    })?;
                    pending.push(kid_id);
                }
            }
            Some(Err(e)) => {
                return Err(InspectionError::Malformed(format!("Unreadable /Kids: {}", e)))
            }
        }
    }

    Ok(page_count)
}

/// Version from the `%PDF-x.y` header
fn header_version(pdf: &[u8]) -> Option<String> {
    let window = &pdf[..pdf.len().min(16)];
    HEADER_VERSION
        .captures(window)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
}
