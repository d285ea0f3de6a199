//! Core types for the colab-badge tool.
//!
//! This crate owns the notebook document model, badge construction and
//! detection, the idempotent [`badge::update`] transformation, and the file
//! I/O that reads and rewrites `.ipynb` files in place.

pub mod badge;
pub mod error;
pub mod io;
pub mod notebook;

pub use badge::{BadgeStyle, BadgeTarget, update};
pub use error::{FormatError, NotebookError};
pub use notebook::{Cell, Notebook, Source};
