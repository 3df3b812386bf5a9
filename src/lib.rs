//! Crate root: lightweight module orchestration and public re-exports.
//!
//! Modules:
//! - `taxa`: per-comparison label to index namespace.
//! - `newick`: iterative Newick parser producing arena trees.
//! - `tree`: arena tree representation.
//! - `bitset`: compact bitset representation for tree partitions.
//! - `splits`: canonical split sets with branch lengths.
//! - `distances`: RF, normalized RF, weighted RF and branch score.
//! - `batch`: parallel comparison of tree pairs matched by id.
//! - `io`: tree file discovery, reading and results output.
//! - `errors`: error types shared by all of the above.
//! - `api`: Python bindings via `pyo3` (gated behind "python" feature).

pub mod batch;
pub mod bitset;
pub mod distances;
pub mod errors;
pub mod io;
pub mod newick;
pub mod splits;
pub mod taxa;
pub mod tree;

#[cfg(feature = "python")]
pub mod api;

// Re-export frequently used types & functions
pub use batch::{BatchOptions, BatchReport, ComparisonResult, TreePair, TreeSource, run_batch};
pub use bitset::Bitset;
pub use distances::{Comparison, compare_trees};
pub use errors::{ParseError, Side, TreeDistError};
pub use io::{discover_trees, write_results};
pub use newick::parse_newick;
pub use splits::SplitSet;
pub use taxa::TaxonNamespace;
pub use tree::Tree;
