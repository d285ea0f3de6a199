//! Terminal styling for colab-badge output.
//!
//! Provides color detection and Ayu-themed status rendering for the
//! per-file report lines.

pub mod styles;
pub mod terminal;
