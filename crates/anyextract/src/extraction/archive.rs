//! Selective decompression of zip containers.
//!
//! Office Open XML and OpenDocument files are zip packages of named parts.
//! Adapters only need a handful of them, so [`read_selected_parts`] walks the
//! central directory once and materializes only the entries accepted by a
//! predicate, preserving archive order.

use crate::error::{AnyExtractError, Result};
use crate::types::ArchivePart;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Where the container bytes come from.
#[derive(Debug, Clone, Copy)]
pub enum ArchiveSource<'a> {
    Bytes(&'a [u8]),
    Path(&'a Path),
}

impl<'a> From<&'a [u8]> for ArchiveSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ArchiveSource::Bytes(bytes)
    }
}

impl<'a> From<&'a Path> for ArchiveSource<'a> {
    fn from(path: &'a Path) -> Self {
        ArchiveSource::Path(path)
    }
}

/// Read every entry whose path satisfies `predicate`.
///
/// Directory entries are skipped. Each materialized entry must decompress to at
/// most `max_part_bytes`.
///
/// # Errors
///
/// - `Io` if a path source does not exist or cannot be read
/// - `Archive` if the bytes are not a readable zip, or an entry exceeds the limit
pub fn read_selected_parts<F>(source: ArchiveSource<'_>, max_part_bytes: u64, predicate: F) -> Result<Vec<ArchivePart>>
where
    F: Fn(&str) -> bool,
{
    match source {
        ArchiveSource::Bytes(bytes) => {
            let archive = ZipArchive::new(Cursor::new(bytes))
                .map_err(|e| AnyExtractError::archive_with_source("Failed to read zip container", e))?;
            collect_parts(archive, max_part_bytes, predicate)
        }
        ArchiveSource::Path(path) => {
            let file = File::open(path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AnyExtractError::not_found(path.display())
                } else {
                    AnyExtractError::Io(e)
                }
            })?;
            let archive = open_archive(file)?;
            collect_parts(archive, max_part_bytes, predicate)
        }
    }
}

fn open_archive(file: File) -> Result<ZipArchive<File>> {
    match ZipArchive::new(file) {
        Ok(archive) => Ok(archive),
        Err(zip::result::ZipError::Io(io_err)) => Err(io_err.into()),
        Err(e) => Err(AnyExtractError::archive_with_source("Failed to read zip container", e)),
    }
}

fn collect_parts<R, F>(mut archive: ZipArchive<R>, max_part_bytes: u64, predicate: F) -> Result<Vec<ArchivePart>>
where
    R: Read + Seek,
    F: Fn(&str) -> bool,
{
    let mut parts = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || !predicate(entry.name()) {
            continue;
        }

        let path = entry.name().to_string();
        if entry.size() > max_part_bytes {
            return Err(AnyExtractError::archive(format!(
                "Part {} decompresses to {} bytes, above the {} byte limit",
                path,
                entry.size(),
                max_part_bytes
            )));
        }

        let mut content = Vec::with_capacity(entry.size() as usize);
        (&mut entry).take(max_part_bytes + 1).read_to_end(&mut content)?;
        if content.len() as u64 > max_part_bytes {
            return Err(AnyExtractError::archive(format!(
                "Part {} exceeds the {} byte limit",
                path, max_part_bytes
            )));
        }

        parts.push(ArchivePart::new(path, content));
    }

    tracing::debug!(selected = parts.len(), total = archive.len(), "read archive parts");
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{SimpleFileOptions, ZipWriter};

    const LIMIT: u64 = 1024 * 1024;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            let options = SimpleFileOptions::default();
            for (name, content) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_selects_matching_parts_in_archive_order() {
        let bytes = build_zip(&[
            ("word/document.xml", "<doc/>"),
            ("word/styles.xml", "<styles/>"),
            ("word/footnotes.xml", "<notes/>"),
        ]);

        let parts = read_selected_parts(ArchiveSource::Bytes(&bytes), LIMIT, |p| {
            p == "word/document.xml" || p == "word/footnotes.xml"
        })
        .unwrap();

        let paths: Vec<&str> = parts.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["word/document.xml", "word/footnotes.xml"]);
        assert_eq!(parts[0].content, b"<doc/>");
    }

    #[test]
    fn test_no_matches_is_empty() {
        let bytes = build_zip(&[("a.txt", "a")]);
        let parts = read_selected_parts(ArchiveSource::Bytes(&bytes), LIMIT, |_| false).unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_invalid_bytes_are_archive_error() {
        let err = read_selected_parts(ArchiveSource::Bytes(b"definitely not a zip"), LIMIT, |_| true).unwrap_err();
        assert!(matches!(err, AnyExtractError::Archive { .. }), "got {err:?}");
    }

    #[test]
    fn test_missing_path_is_io_error() {
        let path = Path::new("/nonexistent/anyextract/package.docx");
        let err = read_selected_parts(ArchiveSource::Path(path), LIMIT, |_| true).unwrap_err();
        assert!(matches!(err, AnyExtractError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_reads_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.zip");
        std::fs::write(&path, build_zip(&[("content.xml", "<x/>")])).unwrap();

        let parts = read_selected_parts(ArchiveSource::Path(&path), LIMIT, |p| p == "content.xml").unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].content, b"<x/>");
    }

    #[test]
    fn test_part_above_limit_rejected() {
        let big = "x".repeat(2048);
        let bytes = build_zip(&[("big.xml", big.as_str())]);
        let err = read_selected_parts(ArchiveSource::Bytes(&bytes), 1024, |_| true).unwrap_err();
        assert!(matches!(err, AnyExtractError::Archive { .. }));
        assert!(err.to_string().contains("big.xml"));
    }
}
