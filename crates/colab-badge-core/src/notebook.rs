//! Jupyter notebook (nbformat v4) document model.
//!
//! Cells are decoded into an explicit tagged enum keyed on `cell_type`.
//! Every struct keeps the keys it does not model in a flattened `extra`
//! map, so a decode/encode cycle reproduces fields the tool never touches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FormatError;

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Cell source text.
///
/// nbformat allows either a list of lines (the usual on-disk form, each line
/// keeping its trailing `\n`) or a single string. The form that was read is
/// the form that gets written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Lines(Vec<String>),
    Text(String),
}

impl Source {
    /// Returns the source as lines, each keeping its line terminator.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            Self::Lines(lines) => lines.iter().map(String::as_str).collect(),
            Self::Text(text) => text.split_inclusive('\n').collect(),
        }
    }

    /// Returns `true` if every line is whitespace only (or there are none).
    pub fn is_blank(&self) -> bool {
        self.lines().iter().all(|line| line.trim().is_empty())
    }

    /// Removes every line matching `pred` and returns how many were removed.
    pub fn remove_lines<F>(&mut self, pred: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        match self {
            Self::Lines(lines) => {
                let before = lines.len();
                lines.retain(|line| !pred(line.as_str()));
                before - lines.len()
            }
            Self::Text(text) => {
                let mut removed = 0;
                let kept: String = text
                    .split_inclusive('\n')
                    .filter(|line: &&str| {
                        if pred(*line) {
                            removed += 1;
                            false
                        } else {
                            true
                        }
                    })
                    .collect();
                *text = kept;
                removed
            }
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Self::Lines(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A markdown or raw cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCell {
    /// Cell id, required from nbformat 4.5 onward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    pub source: Source,

    /// Inline attachments referenced from the cell's markdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An executable code cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    pub source: Source,

    /// `null` for cells that were never run.
    #[serde(default)]
    pub execution_count: Option<u64>,

    #[serde(default)]
    pub outputs: Vec<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One notebook cell, discriminated by `cell_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown(TextCell),
    Code(CodeCell),
    Raw(TextCell),
}

impl Cell {
    /// Builds a markdown cell with empty metadata and a single source line.
    pub fn markdown(line: impl Into<String>) -> Self {
        Self::Markdown(TextCell {
            id: None,
            metadata: Map::new(),
            source: Source::Lines(vec![line.into()]),
            attachments: None,
            extra: Map::new(),
        })
    }

    /// Returns the `cell_type` string.
    pub fn cell_type(&self) -> &'static str {
        match self {
            Self::Markdown(_) => "markdown",
            Self::Code(_) => "code",
            Self::Raw(_) => "raw",
        }
    }

    pub fn source(&self) -> &Source {
        match self {
            Self::Markdown(c) | Self::Raw(c) => &c.source,
            Self::Code(c) => &c.source,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Markdown(c) | Self::Raw(c) => c.id.as_deref(),
            Self::Code(c) => c.id.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Notebook
// ---------------------------------------------------------------------------

/// A whole notebook document.
///
/// Only `cells` is modelled; `metadata`, `nbformat`, `nbformat_minor` and any
/// other top-level key live untouched in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Notebook {
    /// Parses a notebook from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the text is not JSON or does not have the
    /// notebook shape.
    pub fn from_json_str(text: &str) -> Result<Self, FormatError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Decodes a notebook from a generic JSON tree.
    ///
    /// Cells are decoded one at a time so a failure names the offending cell.
    pub fn from_value(value: Value) -> Result<Self, FormatError> {
        let Value::Object(mut fields) = value else {
            return Err(FormatError::NotAnObject);
        };

        let raw_cells = match fields.remove("cells") {
            Some(Value::Array(cells)) => cells,
            Some(_) => return Err(FormatError::CellsNotAList),
            None => return Err(FormatError::MissingCells),
        };

        let cells = raw_cells
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                serde_json::from_value::<Cell>(raw)
                    .map_err(|source| FormatError::Cell { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { cells, fields })
    }

    /// Returns `(nbformat, nbformat_minor)`, treating absent values as 0.
    pub fn format_version(&self) -> (u64, u64) {
        let get = |key: &str| self.fields.get(key).and_then(Value::as_u64).unwrap_or(0);
        (get("nbformat"), get("nbformat_minor"))
    }

    /// Returns `true` if this nbformat version requires cell ids (4.5+).
    pub fn requires_cell_ids(&self) -> bool {
        let (major, minor) = self.format_version();
        major > 4 || (major == 4 && minor >= 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_all_cell_types() {
        let nb = Notebook::from_value(json!({
            "cells": [
                {"cell_type": "markdown", "metadata": {}, "source": ["# Title\n"]},
                {"cell_type": "code", "metadata": {}, "source": "x = 1",
                 "execution_count": 3, "outputs": []},
                {"cell_type": "raw", "metadata": {}, "source": []}
            ],
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 2
        }))
        .unwrap();

        let types: Vec<_> = nb.cells.iter().map(Cell::cell_type).collect();
        assert_eq!(types, vec!["markdown", "code", "raw"]);
        assert_eq!(nb.format_version(), (4, 2));
        assert!(!nb.requires_cell_ids());
    }

    #[test]
    fn missing_cells_is_format_error() {
        let err = Notebook::from_value(json!({"metadata": {}})).unwrap_err();
        assert!(matches!(err, FormatError::MissingCells));
    }

    #[test]
    fn non_list_cells_is_format_error() {
        let err = Notebook::from_value(json!({"cells": {}})).unwrap_err();
        assert!(matches!(err, FormatError::CellsNotAList));
    }

    #[test]
    fn non_object_root_is_format_error() {
        let err = Notebook::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, FormatError::NotAnObject));
    }

    #[test]
    fn cell_errors_carry_index() {
        let err = Notebook::from_value(json!({
            "cells": [
                {"cell_type": "markdown", "metadata": {}, "source": []},
                {"cell_type": "markdown", "metadata": {}}
            ]
        }))
        .unwrap_err();
        match err {
            FormatError::Cell { index, .. } => assert_eq!(index, 1),
            other => panic!("expected cell error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_cell_type_is_rejected() {
        let err = Notebook::from_value(json!({
            "cells": [{"cell_type": "widget", "metadata": {}, "source": []}]
        }))
        .unwrap_err();
        assert!(matches!(err, FormatError::Cell { index: 0, .. }));
    }

    #[test]
    fn missing_cell_type_is_rejected() {
        let err = Notebook::from_value(json!({
            "cells": [{"metadata": {}, "source": []}]
        }))
        .unwrap_err();
        assert!(matches!(err, FormatError::Cell { index: 0, .. }));
    }

    #[test]
    fn unknown_fields_survive_reencoding() {
        let original = json!({
            "cells": [
                {"cell_type": "code", "id": "abc", "metadata": {"tags": ["x"]},
                 "source": ["print(1)"], "execution_count": null,
                 "outputs": [{"output_type": "stream", "name": "stdout", "text": ["1\n"]}],
                 "custom_field": {"keep": true}}
            ],
            "metadata": {"kernelspec": {"name": "python3"}},
            "nbformat": 4,
            "nbformat_minor": 5,
            "extra_top_level": "kept"
        });
        let nb = Notebook::from_value(original.clone()).unwrap();
        let encoded = serde_json::to_value(&nb).unwrap();
        assert_eq!(encoded, original);
    }

    #[test]
    fn text_source_lines_keep_terminators() {
        let source = Source::Text("a\nb\n\nc".to_string());
        assert_eq!(source.lines(), vec!["a\n", "b\n", "\n", "c"]);
    }

    #[test]
    fn remove_lines_preserves_form() {
        let mut lines = Source::Lines(vec!["keep\n".into(), "drop\n".into(), "keep too".into()]);
        assert_eq!(lines.remove_lines(|l| l.starts_with("drop")), 1);
        assert_eq!(lines, Source::Lines(vec!["keep\n".into(), "keep too".into()]));

        let mut text = Source::Text("drop\nkeep\n".to_string());
        assert_eq!(text.remove_lines(|l| l.starts_with("drop")), 1);
        assert_eq!(text, Source::Text("keep\n".to_string()));
    }

    #[test]
    fn blank_detection() {
        assert!(Source::default().is_blank());
        assert!(Source::Lines(vec!["  \n".into(), "\n".into()]).is_blank());
        assert!(!Source::Text("x".into()).is_blank());
    }
}
