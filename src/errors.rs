//! Error types for parsing and comparing trees.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which input collection a tree came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Errors that can occur when reading a Newick string.
///
/// Positions are byte offsets into the input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The input holds no tree at all
    #[error("The tree description is empty.")]
    Empty,
    /// Some `(` is never closed
    #[error("{0} unclosed parenthesis(es) at end of tree.")]
    UnclosedParenthesis(usize),
    /// A `)` with no matching `(`
    #[error("Unmatched closing parenthesis at byte {0}.")]
    UnmatchedParenthesis(usize),
    /// A branch length that is not a finite, non-negative number
    #[error("Could not parse branch length '{value}' at byte {position}.")]
    InvalidBranchLength { value: String, position: usize },
    /// A `[` comment that never ends
    #[error("Unclosed comment starting at byte {0}.")]
    UnclosedComment(usize),
    /// A quoted label that never ends
    #[error("Unclosed quoted label starting at byte {0}.")]
    UnclosedQuote(usize),
    /// A leaf without a label
    #[error("Leaf without a label at byte {0}.")]
    MissingLabel(usize),
    /// A character that cannot appear at this point of the tree
    #[error("Unexpected '{found}' at byte {position}.")]
    UnexpectedToken { found: char, position: usize },
    /// Non-whitespace content after the terminating `;`
    #[error("Unexpected content after the end of the tree at byte {0}.")]
    TrailingContent(usize),
}

/// Errors raised while building, comparing and batching trees.
#[derive(Error, Debug)]
pub enum TreeDistError {
    /// The Newick text is malformed
    #[error("Could not parse tree: {0}")]
    Parse(#[from] ParseError),
    /// The same leaf label appears twice in one tree
    #[error("Leaf label '{0}' appears more than once in the tree.")]
    DuplicateLabel(String),
    /// A frozen namespace was asked for a label it has never seen
    #[error("Label '{0}' is not part of the frozen taxon namespace.")]
    LabelCollision(String),
    /// The two trees of a pair do not share the same taxa
    #[error("The trees have different taxa (only in left: {only_left:?}, only in right: {only_right:?}).")]
    TaxonMismatch {
        only_left: Vec<String>,
        only_right: Vec<String>,
    },
    /// An id only present in one of the two collections
    #[error("No {side} tree found for '{id}'.")]
    MissingPair { id: String, side: Side },
    /// An id present more than once in one collection
    #[error("Id '{id}' appears more than once in the {side} collection.")]
    DuplicateId { id: String, side: Side },
    /// Problem reading a tree or a directory
    #[error("Could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The worker pool could not be started
    #[error("Could not build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl TreeDistError {
    /// Attach a path to an [`std::io::Error`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TreeDistError::Io {
            path: path.into(),
            source,
        }
    }
}
