//! Python binding layer for tree pair distances.
//!
//! Provides Python functions for comparing two Newick strings, or two
//! directories of tree files matched by file id.

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::batch::{BatchOptions, run_batch};
use crate::distances;
use crate::errors::TreeDistError;
use crate::io::{DEFAULT_EXTENSIONS, discover_trees};

impl From<TreeDistError> for PyErr {
    fn from(err: TreeDistError) -> PyErr {
        match err {
            TreeDistError::Io { .. } => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

type Row = (String, usize, f64, f64, f64);

/// Compare two trees given as Newick strings.
///
/// Args:
///     left: Newick string of the first tree
///     right: Newick string of the second tree, over the same taxa
///
/// Returns:
///     A tuple (rf, norm_rf, weighted_rf, branch_score)
///
/// Raises:
///     ValueError: If a tree cannot be parsed or the taxa differ
#[pyfunction]
fn compare_trees(left: &str, right: &str) -> PyResult<(usize, f64, f64, f64)> {
    let cmp = distances::compare_trees(left, right)?;
    Ok((cmp.rf, cmp.norm_rf, cmp.weighted_rf, cmp.branch_score))
}

/// Compare the trees of two directories pairwise by file id.
///
/// The id of a file is its name up to the first dot, so `gene1.nwk` in the
/// left directory is compared with `gene1.raxml.tre.gz` in the right one.
///
/// Args:
///     left: Directory with the reference trees
///     right: Directory with the trees to compare against them
///     threads: Number of worker threads (default: all cores)
///
/// Returns:
///     A tuple of (rows, errors) where:
///     - rows is a list of (id, rf, norm_rf, weighted_rf, branch_score), sorted by id
///     - errors is a list of (id, message) for ids that could not be compared
///
/// Raises:
///     IOError: If a directory cannot be read
///     ValueError: If the thread pool cannot be built
#[pyfunction]
#[pyo3(signature = (left, right, threads=None))]
fn compare_directories(
    left: &str,
    right: &str,
    threads: Option<usize>,
) -> PyResult<(Vec<Row>, Vec<(String, String)>)> {
    let extensions: Vec<String> = DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect();
    let left = discover_trees(left, &extensions)?;
    let right = discover_trees(right, &extensions)?;

    let options = BatchOptions {
        threads,
        progress: false,
    };
    let report = run_batch(left, right, options)?;

    let rows = report
        .rows
        .into_iter()
        .map(|r| (r.id, r.rf, r.norm_rf, r.weighted_rf, r.branch_score))
        .collect();
    let errors = report
        .errors
        .into_iter()
        .map(|(id, err)| (id, err.to_string()))
        .collect();
    Ok((rows, errors))
}

/// Python module definition
#[pymodule]
fn tree_pair_distances(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compare_trees, m)?)?;
    m.add_function(wrap_pyfunction!(compare_directories, m)?)?;
    Ok(())
}
