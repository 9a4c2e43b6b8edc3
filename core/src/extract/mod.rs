//! Unit extraction from Java sources and feature files.

pub mod braces;
pub mod feature;
pub mod java;
