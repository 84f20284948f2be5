//! Spreadsheet archive handling.

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::cell::{CellSpan, CellValue};
use crate::edit::{TableEdits, rewrite_first_table};
use crate::error::{OdsError, Result};
use crate::reader::read_first_table;
use crate::xml::ROW_TAG;

const CONTENT_XML: &str = "content.xml";
const MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

const OFFICE_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:office:1.0";
const TABLE_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:table:1.0";
const TEXT_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:text:1.0";

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2"><manifest:file-entry manifest:full-path="/" manifest:version="1.2" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/><manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/></manifest:manifest>"#;

/// An `.ods` file held in memory.
///
/// Only `content.xml` is parsed; every other archive entry is copied
/// unchanged when the document is saved.
#[derive(Debug)]
pub struct OdsDocument {
    path: PathBuf,
    archive: Vec<u8>,
    content: String,
}

impl OdsDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let archive = fs::read(path)?;
        let content = {
            let mut zip = ZipArchive::new(Cursor::new(archive.as_slice()))?;
            let mut entry = match zip.by_name(CONTENT_XML) {
                Ok(entry) => entry,
                Err(zip::result::ZipError::FileNotFound) => return Err(OdsError::MissingContent),
                Err(err) => return Err(err.into()),
            };
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            content
        };
        debug!(path = %path.display(), bytes = archive.len(), "opened spreadsheet");
        Ok(Self {
            path: path.to_path_buf(),
            archive,
            content,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cell text of the first table, one vector per logical row.
    pub fn read_first_table(&self) -> Result<Vec<Vec<String>>> {
        read_first_table(&self.content)
    }

    /// Apply `edits` to the in-memory content. Nothing is written until
    /// [`OdsDocument::save`].
    pub fn apply(&mut self, edits: &TableEdits) -> Result<()> {
        if edits.is_empty() {
            return Ok(());
        }
        self.content = rewrite_first_table(&self.content, edits)?;
        Ok(())
    }

    /// Write the document to `path` through a temporary file in the same
    /// directory, replacing the target only once the archive is complete.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let temp = NamedTempFile::new_in(parent_dir(path))?;
        if let Ok(metadata) = fs::metadata(path) {
            temp.as_file().set_permissions(metadata.permissions())?;
        }

        let mut source = ZipArchive::new(Cursor::new(self.archive.as_slice()))?;
        let mut zip = ZipWriter::new(temp);
        for index in 0..source.len() {
            let entry = source.by_index_raw(index)?;
            if entry.name() == CONTENT_XML {
                drop(entry);
                zip.start_file(CONTENT_XML, deflated())?;
                zip.write_all(self.content.as_bytes())?;
            } else {
                zip.raw_copy_file(entry)?;
            }
        }
        let temp = zip.finish()?;
        temp.persist(path).map_err(|err| OdsError::Io(err.error))?;
        info!(path = %path.display(), "saved spreadsheet");
        Ok(())
    }

    /// Create a single-table spreadsheet at `path`. Blank text cells are
    /// written as empty cells.
    pub fn create(path: impl AsRef<Path>, rows: &[Vec<CellValue>]) -> Result<()> {
        let path = path.as_ref();
        let content = build_content(rows)?;
        let temp = NamedTempFile::new_in(parent_dir(path))?;
        let mut zip = ZipWriter::new(temp);
        zip.start_file(
            "mimetype",
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        )?;
        zip.write_all(MIMETYPE.as_bytes())?;
        zip.start_file("META-INF/manifest.xml", deflated())?;
        zip.write_all(MANIFEST.as_bytes())?;
        zip.start_file(CONTENT_XML, deflated())?;
        zip.write_all(content.as_bytes())?;
        let temp = zip.finish()?;
        temp.persist(path).map_err(|err| OdsError::Io(err.error))?;
        debug!(path = %path.display(), rows = rows.len(), "created spreadsheet");
        Ok(())
    }
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn build_content(rows: &[Vec<CellValue>]) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("office:document-content");
    root.push_attribute(("xmlns:office", OFFICE_NS));
    root.push_attribute(("xmlns:table", TABLE_NS));
    root.push_attribute(("xmlns:text", TEXT_NS));
    root.push_attribute(("office:version", "1.2"));
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("office:body")))?;
    writer.write_event(Event::Start(BytesStart::new("office:spreadsheet")))?;
    let mut table = BytesStart::new("table:table");
    table.push_attribute(("table:name", "Sheet1"));
    writer.write_event(Event::Start(table))?;

    for row in rows {
        writer.write_event(Event::Start(BytesStart::new(ROW_TAG)))?;
        if row.is_empty() {
            CellSpan::empty(1).write(&mut writer)?;
        }
        for value in row {
            CellSpan::from_value(value).write(&mut writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(ROW_TAG)))?;
    }

    writer.write_event(Event::End(BytesEnd::new("table:table")))?;
    writer.write_event(Event::End(BytesEnd::new("office:spreadsheet")))?;
    writer.write_event(Event::End(BytesEnd::new("office:body")))?;
    writer.write_event(Event::End(BytesEnd::new("office:document-content")))?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}
