//! Configuration management for colab-badge.
//!
//! This crate loads the optional `.colab-badge.yaml` file, discovers it by
//! walking up the directory tree, and locates the enclosing git repository
//! root that notebook paths are made relative to.

pub mod config;
pub mod repo_root;
