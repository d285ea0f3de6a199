//! "Open in Colab" badge construction, detection and the idempotent
//! notebook update.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::notebook::{Cell, Notebook};

/// Substring that identifies a badge line, whatever repo/branch/style it
/// points at.
pub const BADGE_MARKER: &str = "colab-badge.svg";

/// Badge image hosted by Colab.
pub const BADGE_IMAGE_URL: &str = "https://colab.research.google.com/assets/colab-badge.svg";

/// Prefix of every "open this GitHub notebook in Colab" link.
pub const COLAB_GITHUB_URL: &str = "https://colab.research.google.com/github";

/// Length of the hex cell id given to badge cells in nbformat 4.5+ notebooks.
const BADGE_CELL_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Badge style
// ---------------------------------------------------------------------------

/// How the badge is written into the markdown cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeStyle {
    /// `[![Open In Colab](image)](url)`
    #[default]
    Markdown,
    /// `<a href="url" target="_parent"><img src="image" alt="Open In Colab"/></a>`
    Html,
}

impl BadgeStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for BadgeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            other => Err(format!(
                "unknown badge style '{}' (expected 'markdown' or 'html')",
                other
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Badge target
// ---------------------------------------------------------------------------

/// Where a notebook's badge should point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeTarget {
    /// GitHub repository as `owner/name`.
    pub repository: String,
    /// Git ref name.
    pub branch: String,
    /// Notebook path relative to the repository root, used verbatim.
    pub file_path: String,
    pub style: BadgeStyle,
    /// Percent-encode the branch (so `feature/x` becomes `feature%2Fx`).
    pub encode_branch: bool,
}

impl BadgeTarget {
    /// Creates a markdown-style target with the branch used verbatim.
    pub fn new(
        repository: impl Into<String>,
        branch: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            branch: branch.into(),
            file_path: file_path.into(),
            style: BadgeStyle::default(),
            encode_branch: false,
        }
    }

    pub fn style(mut self, style: BadgeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn encode_branch(mut self, encode: bool) -> Self {
        self.encode_branch = encode;
        self
    }

    /// Returns the Colab URL for this notebook.
    pub fn badge_url(&self) -> String {
        let branch = if self.encode_branch {
            urlencoding::encode(&self.branch).into_owned()
        } else {
            self.branch.clone()
        };
        format!(
            "{}/{}/blob/{}/{}",
            COLAB_GITHUB_URL, self.repository, branch, self.file_path
        )
    }

    /// Returns the single source line of the badge cell.
    pub fn badge_markup(&self) -> String {
        let url = self.badge_url();
        match self.style {
            BadgeStyle::Markdown => format!("[![Open In Colab]({})]({})", BADGE_IMAGE_URL, url),
            BadgeStyle::Html => format!(
                r#"<a href="{}" target="_parent"><img src="{}" alt="Open In Colab"/></a>"#,
                url, BADGE_IMAGE_URL
            ),
        }
    }

    /// Builds the badge cell to insert at the top of `notebook`.
    ///
    /// Notebooks at nbformat 4.5 or later get a cell id derived from the
    /// badge URL, so re-running with the same target yields the same id.
    pub fn badge_cell(&self, notebook: &Notebook) -> Cell {
        let mut cell = Cell::markdown(self.badge_markup());
        if notebook.requires_cell_ids() {
            if let Cell::Markdown(ref mut md) = cell {
                md.id = Some(badge_cell_id(&self.badge_url()));
            }
        }
        cell
    }
}

/// Deterministic cell id for a badge pointing at `url`.
pub fn badge_cell_id(url: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(url.as_bytes()));
    digest[..BADGE_CELL_ID_LEN].to_string()
}

/// Returns `true` if `line` carries a Colab badge.
pub fn is_badge_line(line: &str) -> bool {
    line.contains(BADGE_MARKER)
}

// ---------------------------------------------------------------------------
// Transformation
// ---------------------------------------------------------------------------

/// Removes badge lines from every markdown cell.
///
/// A cell that loses at least one line and has nothing but blank lines left
/// is dropped. Cells that never held a badge are kept as they are, even if
/// empty. Returns the number of badge lines removed.
pub fn strip_badges(notebook: &mut Notebook) -> usize {
    let mut removed_total = 0;
    notebook.cells.retain_mut(|cell| {
        let Cell::Markdown(md) = cell else {
            return true;
        };
        let removed = md.source.remove_lines(is_badge_line);
        removed_total += removed;
        removed == 0 || !md.source.is_blank()
    });
    removed_total
}

/// Ensures `notebook` starts with exactly one badge cell pointing at `target`.
///
/// Existing badges anywhere in markdown cells are stripped first, so applying
/// the update twice gives the same document as applying it once.
pub fn update(mut notebook: Notebook, target: &BadgeTarget) -> Notebook {
    let before = notebook.cells.len();
    let removed = strip_badges(&mut notebook);
    debug!(
        removed_lines = removed,
        dropped_cells = before - notebook.cells.len(),
        url = %target.badge_url(),
        "stripped existing badges"
    );

    let badge = target.badge_cell(&notebook);
    notebook.cells.insert(0, badge);
    notebook
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::Source;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    const DEMO_BADGE: &str = "[![Open In Colab](https://colab.research.google.com/assets/colab-badge.svg)](https://colab.research.google.com/github/octocat/hello-world/blob/main/notebooks/demo.ipynb)";

    fn demo_target() -> BadgeTarget {
        BadgeTarget::new("octocat/hello-world", "main", "notebooks/demo.ipynb")
    }

    fn notebook(cells: Value) -> Notebook {
        Notebook::from_value(json!({
            "cells": cells,
            "metadata": {"kernelspec": {"name": "python3", "display_name": "Python 3"}},
            "nbformat": 4,
            "nbformat_minor": 2
        }))
        .unwrap()
    }

    fn code(src: &str) -> Value {
        json!({"cell_type": "code", "metadata": {}, "source": [src],
               "execution_count": null, "outputs": []})
    }

    fn badge_cells(nb: &Notebook) -> Vec<usize> {
        nb.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.source().lines().iter().any(|l| is_badge_line(l)))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn url_uses_parameters_verbatim() {
        let target = demo_target();
        assert_eq!(
            target.badge_url(),
            "https://colab.research.google.com/github/octocat/hello-world/blob/main/notebooks/demo.ipynb"
        );
        assert_eq!(target.badge_markup(), DEMO_BADGE);
    }

    #[test]
    fn branch_is_encoded_only_on_request() {
        let target = BadgeTarget::new("o/r", "feature/x", "a b.ipynb");
        assert!(target.badge_url().contains("/blob/feature/x/a b.ipynb"));
        let encoded = target.encode_branch(true);
        assert!(encoded.badge_url().contains("/blob/feature%2Fx/"));
    }

    #[test]
    fn html_style_contains_marker() {
        let markup = demo_target().style(BadgeStyle::Html).badge_markup();
        assert!(markup.starts_with("<a href=\"https://colab.research.google.com/github/"));
        assert!(is_badge_line(&markup));
    }

    #[test]
    fn style_parses_from_str() {
        assert_eq!("html".parse::<BadgeStyle>().unwrap(), BadgeStyle::Html);
        assert_eq!("Markdown".parse::<BadgeStyle>().unwrap(), BadgeStyle::Markdown);
        assert!("svg".parse::<BadgeStyle>().is_err());
    }

    #[test]
    fn fresh_notebook_gets_badge_first() {
        let nb = notebook(json!([code("a = 1"), code("b = 2")]));
        let originals = nb.cells.clone();

        let out = update(nb, &demo_target());

        assert_eq!(out.cells.len(), 3);
        assert_eq!(out.cells[0], Cell::markdown(DEMO_BADGE));
        assert_eq!(&out.cells[1..], &originals[..]);
    }

    #[test]
    fn replaces_badge_for_other_branch() {
        let old = "[![Open In Colab](https://colab.research.google.com/assets/colab-badge.svg)](https://colab.research.google.com/github/octocat/hello-world/blob/dev/notebooks/demo.ipynb)";
        let nb = notebook(json!([
            {"cell_type": "markdown", "metadata": {}, "source": [old]},
            {"cell_type": "markdown", "metadata": {}, "source": ["# Demo\n", "Some text"]},
            code("print('hi')")
        ]));
        let rest = nb.cells[1..].to_vec();

        let out = update(nb, &demo_target());

        assert_eq!(out.cells.len(), 3);
        assert_eq!(out.cells[0].source().lines(), vec![DEMO_BADGE]);
        assert!(out.cells[0].source().lines()[0].contains("/blob/main/"));
        assert_eq!(&out.cells[1..], &rest[..]);
    }

    #[test]
    fn update_is_idempotent() {
        let nb = notebook(json!([
            {"cell_type": "markdown", "metadata": {}, "source": ["# Title\n", "intro"]},
            code("x = 1")
        ]));
        let once = update(nb, &demo_target());
        let twice = update(once.clone(), &demo_target());
        assert_eq!(once, twice);
    }

    #[test]
    fn mixed_cell_keeps_other_text() {
        let nb = notebook(json!([
            {"cell_type": "markdown", "metadata": {},
             "source": ["# Title\n", format!("{}\n", DEMO_BADGE), "More text"]}
        ]));

        let out = update(nb, &demo_target());

        assert_eq!(out.cells.len(), 2);
        assert_eq!(out.cells[1].source().lines(), vec!["# Title\n", "More text"]);
        assert_eq!(badge_cells(&out), vec![0]);
    }

    #[test]
    fn badge_only_cell_is_removed_even_with_blank_lines() {
        let nb = notebook(json!([
            code("x = 1"),
            {"cell_type": "markdown", "metadata": {}, "source": [format!("{}\n", DEMO_BADGE), "\n"]}
        ]));

        let out = update(nb, &demo_target());

        assert_eq!(out.cells.len(), 2);
        assert_eq!(out.cells[1].cell_type(), "code");
    }

    #[test]
    fn empty_markdown_without_badge_is_kept() {
        let nb = notebook(json!([{"cell_type": "markdown", "metadata": {}, "source": []}]));
        let out = update(nb, &demo_target());
        assert_eq!(out.cells.len(), 2);
        assert_eq!(out.cells[1].source(), &Source::Lines(vec![]));
    }

    #[test]
    fn badges_in_code_cells_are_left_alone() {
        let nb = notebook(json!([code("# colab-badge.svg is just a string here")]));
        let out = update(nb, &demo_target());
        assert_eq!(out.cells.len(), 2);
        assert_eq!(out.cells[1].cell_type(), "code");
    }

    #[test]
    fn string_source_badge_is_stripped() {
        let nb = notebook(json!([
            {"cell_type": "markdown", "metadata": {}, "source": format!("{}\n# Heading", DEMO_BADGE)}
        ]));
        let out = update(nb, &demo_target());
        assert_eq!(out.cells.len(), 2);
        assert_eq!(out.cells[1].source(), &Source::Text("# Heading".to_string()));
    }

    #[test]
    fn multiple_stale_badges_collapse_to_one() {
        let nb = notebook(json!([
            {"cell_type": "markdown", "metadata": {}, "source": [DEMO_BADGE]},
            code("x"),
            {"cell_type": "markdown", "metadata": {}, "source": ["<a href=\"x\"><img src=\"https://colab.research.google.com/assets/colab-badge.svg\"/></a>"]}
        ]));
        let out = update(nb, &demo_target());
        assert_eq!(out.cells.len(), 2);
        assert_eq!(badge_cells(&out), vec![0]);
    }

    #[test]
    fn top_level_fields_pass_through() {
        let nb = notebook(json!([code("x")]));
        let fields = nb.fields.clone();
        let out = update(nb, &demo_target());
        assert_eq!(out.fields, fields);
    }

    #[test]
    fn badge_cell_gets_stable_id_on_nbformat_4_5() {
        let nb = Notebook::from_value(json!({
            "cells": [code("x")], "metadata": {}, "nbformat": 4, "nbformat_minor": 5
        }))
        .unwrap();

        let once = update(nb, &demo_target());
        let id = once.cells[0].id().map(str::to_string);
        assert_eq!(id.as_deref().map(str::len), Some(8));

        let twice = update(once.clone(), &demo_target());
        assert_eq!(twice.cells[0].id().map(str::to_string), id);
        assert_eq!(once, twice);
    }

    #[test]
    fn badge_cell_has_no_id_before_nbformat_4_5() {
        let out = update(notebook(json!([])), &demo_target());
        assert_eq!(out.cells[0].id(), None);
    }
}
