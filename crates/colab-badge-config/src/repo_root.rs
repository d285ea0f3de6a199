//! Repository root discovery and repository-relative notebook paths.
//!
//! Badge URLs need each notebook's path as seen from the repository root,
//! while the CLI receives paths relative to the working directory.

use std::path::{Component, Path, PathBuf};

/// Walk up the directory tree from `start` looking for a `.git` directory
/// (or `.git` file, as used by worktrees and submodules).
///
/// Returns the repository root directory, or `None` if the filesystem root
/// is reached without finding one. This is a purely filesystem-based search;
/// `git` is never invoked.
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Returns `file` relative to `root` if it lies underneath it.
///
/// `root` and the directory holding `file` are canonicalized, so both must
/// exist. The file name itself is kept as given: a symlinked notebook keeps
/// its own name rather than resolving to its target.
pub fn relative_to_root(root: &Path, file: &Path) -> Option<PathBuf> {
    let root = root.canonicalize().ok()?;
    let name = file.file_name()?;
    let parent = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file = parent.canonicalize().ok()?.join(name);
    file.strip_prefix(&root).ok().map(Path::to_path_buf)
}

/// Renders a path with `/` separators for use in a URL.
///
/// `.` components and any root/prefix are dropped; `..` is kept.
pub fn to_url_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
