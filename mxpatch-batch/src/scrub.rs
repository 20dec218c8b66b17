//! Scrub transform for generated insert scripts.
//!
//! A script looks like:
//!
//! ```text
//! <script author="..." scriptname="...">
//!   <description>...</description>
//!   <statements>
//!     <insert table="ASSET">
//!       <insertrow>
//!         <columnvalue column="ASSETNUM" string="1001"/>
//!         <columnvalue column="DESCRIPTION"/>        (removed)
//! ```
//!
//! Every element below the root whose only attribute is the structural key
//! carries no value and is dropped with its subtree. The root's `author` and
//! `scriptname` attributes are set, and the root's `<description>` child is
//! replaced or inserted. Output of a scrub scrubs to itself byte-for-byte.

use std::path::{Path, PathBuf};

use quick_xml::events::attributes::AttrError;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

use crate::error::{io_err, BatchError};
use crate::writer::atomic_write;

const AUTHOR_ATTR: &str = "author";
const SCRIPT_NAME_ATTR: &str = "scriptname";
const DESCRIPTION_TAG: &[u8] = b"description";
const SCRUBBED_SUFFIX: &str = "-scrubbed";

#[derive(Debug, Error)]
pub enum ScrubError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attr(#[from] AttrError),

    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("document has no root element")]
    NoRoot,
}

/// Metadata written onto a scrubbed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubMetadata {
    pub author: String,
    pub script_name: String,
    pub description: String,
    /// Attribute name that alone marks an element as valueless.
    pub structural_key: String,
}

impl ScrubMetadata {
    /// Metadata for the inserts of `table`, named after the output file.
    pub fn for_table(
        author: &str,
        structural_key: &str,
        table: &str,
        filter: Option<&str>,
        script_name: &str,
    ) -> Self {
        let mut description = format!("Insert {table} data");
        if let Some(clause) = filter {
            description.push_str(" where ");
            description.push_str(clause);
        }
        Self {
            author: author.to_string(),
            script_name: script_name.to_string(),
            description,
            structural_key: structural_key.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Document transform
// ---------------------------------------------------------------------------

/// Scrub one document held in memory.
pub fn scrub_document(xml: &str, meta: &ScrubMetadata) -> Result<String, ScrubError> {
    let has_description = root_has_description(xml)?;
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) if !seen_root => {
                seen_root = true;
                depth = 1;
                writer.write_event(Event::Start(rewrite_root(&e, meta)?))?;
                if !has_description {
                    write_description(&mut writer, &meta.description)?;
                }
            }
            Event::Empty(e) if !seen_root => {
                seen_root = true;
                let root = rewrite_root(&e, meta)?;
                writer.write_event(Event::Start(root.borrow()))?;
                write_description(&mut writer, &meta.description)?;
                writer.write_event(Event::End(root.to_end()))?;
            }
            Event::Start(e) => {
                if depth == 1 && e.name().as_ref() == DESCRIPTION_TAG {
                    writer.write_event(Event::Start(e.borrow()))?;
                    writer.write_event(Event::Text(description_text(&meta.description)))?;
                    reader.read_to_end(e.name())?;
                    writer.write_event(Event::End(e.to_end()))?;
                } else if is_structural(&e, &meta.structural_key)? {
                    reader.read_to_end(e.name())?;
                } else {
                    depth += 1;
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) => {
                if depth == 1 && e.name().as_ref() == DESCRIPTION_TAG {
                    writer.write_event(Event::Start(e.borrow()))?;
                    writer.write_event(Event::Text(description_text(&meta.description)))?;
                    writer.write_event(Event::End(e.to_end()))?;
                } else if !is_structural(&e, &meta.structural_key)? {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(e))?;
            }
            other => writer.write_event(other)?,
        }
    }

    if !seen_root {
        return Err(ScrubError::NoRoot);
    }
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Whether the root element already has a direct `<description>` child.
fn root_has_description(xml: &str) -> Result<bool, ScrubError> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Eof => return Ok(false),
            Event::Start(e) => {
                if depth == 1 && e.name().as_ref() == DESCRIPTION_TAG {
                    return Ok(true);
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 1 && e.name().as_ref() == DESCRIPTION_TAG {
                    return Ok(true);
                }
                if depth == 0 {
                    return Ok(false);
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(false);
                }
            }
            _ => {}
        }
    }
}

/// Exactly one attribute, and it is the structural key.
fn is_structural(e: &BytesStart<'_>, key: &str) -> Result<bool, ScrubError> {
    let mut attrs = e.attributes();
    let Some(first) = attrs.next() else {
        return Ok(false);
    };
    let first = first?;
    if attrs.next().is_some() {
        return Ok(false);
    }
    Ok(first.key.as_ref() == key.as_bytes())
}

/// Copy the root start tag, keeping attribute order, with metadata applied.
fn rewrite_root(e: &BytesStart<'_>, meta: &ScrubMetadata) -> Result<BytesStart<'static>, ScrubError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut root = BytesStart::new(name);
    let mut author_set = false;
    let mut script_name_set = false;

    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match key.as_str() {
            AUTHOR_ATTR => {
                author_set = true;
                meta.author.clone()
            }
            SCRIPT_NAME_ATTR => {
                script_name_set = true;
                meta.script_name.clone()
            }
            _ => attr.unescape_value()?.into_owned(),
        };
        root.push_attribute((key.as_str(), value.as_str()));
    }
    if !author_set {
        root.push_attribute((AUTHOR_ATTR, meta.author.as_str()));
    }
    if !script_name_set {
        root.push_attribute((SCRIPT_NAME_ATTR, meta.script_name.as_str()));
    }
    Ok(root)
}

fn write_description(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), ScrubError> {
    let tag = String::from_utf8_lossy(DESCRIPTION_TAG).into_owned();
    let start = BytesStart::new(tag);
    writer.write_event(Event::Start(start.borrow()))?;
    writer.write_event(Event::Text(description_text(text)))?;
    writer.write_event(Event::End(start.to_end()))?;
    Ok(())
}

/// Text content escaping only `<`, `>` and `&`; quotes stay literal.
fn description_text(text: &str) -> BytesText<'_> {
    BytesText::from_escaped(partial_escape(text))
}

// ---------------------------------------------------------------------------
// File transform
// ---------------------------------------------------------------------------

/// `<dir>/<stem>-scrubbed.<ext>` next to `path`.
pub fn scrubbed_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{SCRUBBED_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{SCRUBBED_SUFFIX}"),
    };
    path.with_file_name(name)
}

/// Scrub `path` into its `-scrubbed` sibling; the input is left untouched.
pub fn scrub_file(path: &Path, meta: &ScrubMetadata) -> Result<PathBuf, BatchError> {
    let xml = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let scrubbed = scrub_document(&xml, meta).map_err(|source| BatchError::Scrub {
        path: path.to_path_buf(),
        source,
    })?;
    let out = scrubbed_path(path);
    atomic_write(&out, scrubbed.as_bytes())?;
    tracing::info!(path = %out.display(), "scrubbed");
    Ok(out)
}
