//! Command implementations

pub mod check;
pub mod completions;
pub mod fields;
pub mod import;
pub mod template;
