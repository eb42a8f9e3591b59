//! CLI commands

pub mod context;
pub mod merge;
