//! Reading, encoding and rewriting notebook files.
//!
//! Output follows the conventions of Jupyter's own writer so that a badge
//! update produces a minimal diff: keys sorted, one-space indentation,
//! non-ASCII characters written as-is, floats in Python `repr` form, and a
//! trailing newline.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use serde_json::ser::{Formatter, PrettyFormatter};
use tracing::debug;

use crate::badge::{BadgeTarget, update};
use crate::error::{FormatError, Result};
use crate::notebook::Notebook;

/// Indentation used by Jupyter when saving notebooks.
const NOTEBOOK_INDENT: &[u8] = b" ";

/// Whether [`process_file`] may write to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    /// Rewrite the file when its badge state is out of date.
    Write,
    /// Only report whether the file would change.
    Check,
}

/// Result of processing one notebook file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was (or, in check mode, would be) rewritten.
    Changed,
    /// The document already carries the right badge.
    Unchanged,
}

/// Reads and decodes the notebook at `path`.
pub fn read_notebook(path: &Path) -> Result<Notebook> {
    let bytes = fs::read(path)?;
    let value: Value = serde_json::from_slice(&bytes).map_err(FormatError::from)?;
    Ok(Notebook::from_value(value)?)
}

/// Encodes a notebook the way Jupyter writes it to disk.
pub fn encode_notebook(notebook: &Notebook) -> std::result::Result<Vec<u8>, FormatError> {
    let value = serde_json::to_value(notebook)?;
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, NotebookFormatter::new());
    SortedKeys(&value).serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Serializes a JSON tree with object keys in sorted order, whatever map
/// implementation `serde_json` was built with.
struct SortedKeys<'a>(&'a Value);

impl Serialize for SortedKeys<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    out.serialize_entry(key, &SortedKeys(value))?;
                }
                out.end()
            }
            Value::Array(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(&SortedKeys(item))?;
                }
                out.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}

/// Pretty printer matching Python's `json.dump(nb, indent=1)`.
///
/// Layout is delegated to [`PrettyFormatter`]; only floats differ, since
/// Python writes `repr(float)` (`1e-05`, `1e+16`, `1.0`) where serde_json
/// would write `0.00001` or `1e16`.
struct NotebookFormatter<'a> {
    pretty: PrettyFormatter<'a>,
}

impl NotebookFormatter<'_> {
    fn new() -> Self {
        Self {
            pretty: PrettyFormatter::with_indent(NOTEBOOK_INDENT),
        }
    }
}

impl Formatter for NotebookFormatter<'_> {
    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(python_float_repr(value).as_bytes())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }
}

/// Formats a finite float the way Python's `repr` does.
///
/// The digits are the shortest round-trip form. Scientific notation is used
/// when the decimal exponent is below -4 or at least 16, with a signed
/// exponent of at least two digits; otherwise the number is written in fixed
/// notation with at least one fractional digit.
fn python_float_repr(value: f64) -> String {
    // `{:e}` gives the shortest round-trip digits, e.g. `-1.25e-7`.
    let sci = format!("{:e}", value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if !(-4..16).contains(&exp) {
        let (lead, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() { String::new() } else { format!(".{rest}") };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        return format!("{sign}{lead}{fraction}e{exp_sign}{:02}", exp.unsigned_abs());
    }

    if exp < 0 {
        let zeros = "0".repeat(exp.unsigned_abs() as usize - 1);
        return format!("{sign}0.{zeros}{digits}");
    }

    let int_len = exp as usize + 1;
    if digits.len() <= int_len {
        let pad = "0".repeat(int_len - digits.len());
        format!("{sign}{digits}{pad}.0")
    } else {
        let (int_part, frac_part) = digits.split_at(int_len);
        format!("{sign}{int_part}.{frac_part}")
    }
}

/// Replaces the file at `path` with `contents`.
///
/// The data goes to a temporary file in the same directory which is then
/// renamed over the target, so the original is never left half-written.
/// Existing permissions are carried over.
pub fn write_notebook_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Updates the badge of one notebook file.
///
/// The whole transformation happens in memory. Staleness is decided on the
/// decoded document, so a notebook that already carries the right badge is
/// left alone whatever its on-disk formatting. The file is only touched in
/// [`ProcessMode::Write`] and only when `update` changed the document.
pub fn process_file(path: &Path, target: &BadgeTarget, mode: ProcessMode) -> Result<FileOutcome> {
    let notebook = read_notebook(path)?;
    let updated = update(notebook.clone(), target);

    if updated == notebook {
        debug!(path = %path.display(), "notebook already up to date");
        return Ok(FileOutcome::Unchanged);
    }

    if mode == ProcessMode::Write {
        let encoded = encode_notebook(&updated)?;
        write_notebook_atomic(path, &encoded)?;
        debug!(path = %path.display(), bytes = encoded.len(), "notebook rewritten");
    }

    Ok(FileOutcome::Changed)
}
