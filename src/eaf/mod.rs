/*!
 * ELAN `.eaf` codec.
 *
 * - `reader`: XML text to `Document`
 * - `writer`: `Document` to XML text
 * - `xml`: pass-through element tree
 */

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::document::Document;
use crate::errors::DocumentError;

pub mod reader;
pub mod writer;
pub mod xml;

pub use reader::parse_document;
pub use writer::to_xml_string;

/// Header property holding the annotation id counter
pub const LAST_USED_ANNOTATION_ID: &str = "lastUsedAnnotationId";

/// Whether the path has one of the given extensions (case-insensitive)
fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_with_extensions(path: &Path, extensions: &[&str], max_chain_depth: usize) -> Result<Document, DocumentError> {
    if !has_extension(path, extensions) {
        return Err(DocumentError::NotAnAnnotationDocument(format!(
            "{} (expected a .{} file)",
            path.display(),
            extensions.join(" or .")
        )));
    }
    let xml = fs::read_to_string(path)?;
    debug!("Read {} bytes from {}", xml.len(), path.display());
    parse_document(&xml, &display_name(path), max_chain_depth)
}

/// Load an annotation document from an `.eaf` file
pub fn read_document<P: AsRef<Path>>(path: P, max_chain_depth: usize) -> Result<Document, DocumentError> {
    read_with_extensions(path.as_ref(), &["eaf"], max_chain_depth)
}

/// Load a document or `.etf` template, used as a source of linguistic types
pub fn read_template<P: AsRef<Path>>(path: P) -> Result<Document, DocumentError> {
    read_with_extensions(
        path.as_ref(),
        &["eaf", "etf"],
        crate::document::DEFAULT_MAX_CHAIN_DEPTH,
    )
}

/// Write a document to disk
pub fn write_document<P: AsRef<Path>>(document: &Document, path: P) -> Result<(), DocumentError> {
    let path = path.as_ref();
    let xml = to_xml_string(document)?;
    fs::write(path, xml)?;
    info!("Wrote {}", path.display());
    Ok(())
}
