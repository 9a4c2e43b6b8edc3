//! TypeScript skeleton generation.
//!
//! Generators only lay out structure. Every convertible unit is emitted as a
//! [`Placeholder`](crate::rewrite::Placeholder) line that the rewriter fills in.

pub mod page;
pub mod steps;
pub mod ts;

pub use page::page_skeleton;
pub use steps::steps_skeleton;

/// Indentation used in generated TypeScript.
pub(crate) const INDENT: &str = "  ";

/// Generated text plus the methods whose source body was cut off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Skeleton {
    pub text: String,
    /// `(line, description)`; lines are 1-based in `text`.
    pub truncated: Vec<(usize, String)>,
}
