//! Archive codec: the entry-level view of a zip that the differ and the
//! deploy packager work against.
//!
//! Entry text is decoded as UTF-8 with lossy replacement, so binary entries
//! survive listing and comparison but not a byte-exact round trip.

use std::collections::HashSet;
use std::io::{Cursor, Read, Write};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::CodecError;

/// Read access to the entries of an archive.
pub trait EntryCodec {
    /// Non-directory entry paths in archive enumeration order.
    fn entry_paths(&self) -> &[String];

    /// Whether a non-directory entry exists at `path`.
    fn contains(&self, path: &str) -> bool;

    /// Full text of the entry at `path`.
    fn read_text(&mut self, path: &str) -> Result<String, CodecError>;
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// An in-memory zip archive.
pub struct ZipEntries {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    paths: Vec<String>,
    lookup: HashSet<String>,
}

impl ZipEntries {
    /// Parse a zip held in memory and index its file entries.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CodecError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut paths = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive.by_index(index)?;
            if !file.is_dir() {
                paths.push(file.name().to_string());
            }
        }
        let lookup = paths.iter().cloned().collect();
        Ok(Self {
            archive,
            paths,
            lookup,
        })
    }

    /// Decode a base64 zip (as carried in a SOAP response) and parse it.
    pub fn from_base64(payload: &str) -> Result<Self, CodecError> {
        Self::from_bytes(decode_base64(payload)?)
    }
}

impl EntryCodec for ZipEntries {
    fn entry_paths(&self) -> &[String] {
        &self.paths
    }

    fn contains(&self, path: &str) -> bool {
        self.lookup.contains(path)
    }

    fn read_text(&mut self, path: &str) -> Result<String, CodecError> {
        let mut file = self.archive.by_name(path)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Builds a deflate-compressed zip in memory.
pub struct ZipBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl Default for ZipBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// Append one entry. Writing the same path twice is a zip error.
    pub fn write_text(&mut self, path: &str, content: &str) -> Result<(), CodecError> {
        self.writer.start_file(path, self.options)?;
        self.writer.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Finalize the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>, CodecError> {
        Ok(self.writer.finish()?.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Transport encoding
// ---------------------------------------------------------------------------

pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode standard base64, ignoring embedded whitespace and line breaks.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, CodecError> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(BASE64.decode(compact.as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let mut builder = ZipBuilder::new();
        builder
            .write_text("unpackaged/classes/Foo.cls", "public class Foo {}")
            .expect("write foo");
        builder
            .write_text("unpackaged/package.xml", "<Package/>")
            .expect("write manifest");
        builder.finish().expect("finish")
    }

    #[test]
    fn entries_listed_in_write_order() {
        let entries = ZipEntries::from_bytes(sample()).expect("open");
        assert_eq!(
            entries.entry_paths(),
            &["unpackaged/classes/Foo.cls", "unpackaged/package.xml"]
        );
    }

    #[test]
    fn read_text_returns_content() {
        let mut entries = ZipEntries::from_bytes(sample()).expect("open");
        assert!(entries.contains("unpackaged/classes/Foo.cls"));
        assert_eq!(
            entries.read_text("unpackaged/classes/Foo.cls").expect("read"),
            "public class Foo {}"
        );
    }

    #[test]
    fn missing_entry_is_an_error() {
        let mut entries = ZipEntries::from_bytes(sample()).expect("open");
        assert!(!entries.contains("unpackaged/classes/Bar.cls"));
        assert!(entries.read_text("unpackaged/classes/Bar.cls").is_err());
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = ZipEntries::from_bytes(b"definitely not a zip".to_vec())
            .err()
            .expect("must fail");
        assert!(matches!(err, CodecError::Zip(_)), "got: {err}");
    }

    #[test]
    fn base64_tolerates_line_breaks() {
        let encoded = encode_base64(&sample());
        let wrapped: String = encoded
            .as_bytes()
            .chunks(76)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("\r\n");
        let entries = ZipEntries::from_base64(&wrapped).expect("decode wrapped");
        assert_eq!(entries.entry_paths().len(), 2);
    }

    #[test]
    fn invalid_base64_is_reported() {
        let err = ZipEntries::from_base64("***").err().expect("must fail");
        assert!(matches!(err, CodecError::Base64(_)), "got: {err}");
    }
}
