//! Zip packaging of rendered JPEG files.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::EngineError;

/// One named file ready for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Write `files` into a Deflate-compressed zip, preserving their order.
///
/// Repeated names get a ` (n)` suffix before the extension so every
/// row survives extraction.
pub fn write_zip(files: &[RenderedFile]) -> Result<Vec<u8>, EngineError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut emitted: HashSet<String> = HashSet::new();
    for file in files {
        let name = unique_name(&mut emitted, &file.file_name);
        zip.start_file(name, options)?;
        zip.write_all(&file.bytes)?;
    }

    let cursor = zip.finish()?;
    tracing::debug!(entries = files.len(), "Wrote zip archive");
    Ok(cursor.into_inner())
}

/// Pick the first free name among `name`, `name (2)`, `name (3)`, ...
///
/// Names are compared case-insensitively against every entry already
/// written, literal or suffixed.
fn unique_name(emitted: &mut HashSet<String>, name: &str) -> String {
    if emitted.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };
    let mut n = 2u32;
    loop {
        let candidate = format!("{stem} ({n}){ext}");
        if emitted.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}
