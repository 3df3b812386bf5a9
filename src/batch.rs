//! Batch comparison of tree pairs matched by id.
//!
//! Every pair is an independent unit of work with its own taxon namespace,
//! so pairs are compared in parallel with `rayon` and gathered afterwards.
//! Errors stay local to their id and are returned next to the result rows.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{debug, warn};
use rayon::prelude::*;

use crate::distances::{Comparison, compare_trees};
use crate::errors::{Side, TreeDistError};
use crate::io::read_tree_file;

/// Something that can produce the Newick text of one tree.
pub trait TreeSource {
    fn load(&self) -> Result<String, TreeDistError>;
}

impl TreeSource for String {
    fn load(&self) -> Result<String, TreeDistError> {
        Ok(self.clone())
    }
}

impl TreeSource for &str {
    fn load(&self) -> Result<String, TreeDistError> {
        Ok((*self).to_string())
    }
}

impl TreeSource for PathBuf {
    fn load(&self) -> Result<String, TreeDistError> {
        read_tree_file(self)
    }
}

/// Two sources sharing an id.
#[derive(Debug, Clone, PartialEq)]
pub struct TreePair<S> {
    pub id: String,
    pub left: S,
    pub right: S,
}

/// One row of the output table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub id: String,
    pub rf: usize,
    pub norm_rf: f64,
    pub weighted_rf: f64,
    pub branch_score: f64,
}

impl ComparisonResult {
    fn new(id: String, cmp: Comparison) -> Self {
        Self {
            id,
            rf: cmp.rf,
            norm_rf: cmp.norm_rf,
            weighted_rf: cmp.weighted_rf,
            branch_score: cmp.branch_score,
        }
    }
}

/// Rows for every compared pair plus the errors of every other id.
///
/// Both lists are sorted by id.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub rows: Vec<ComparisonResult>,
    pub errors: Vec<(String, TreeDistError)>,
}

/// Settings of a batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Worker threads, `None` uses the global rayon pool
    pub threads: Option<usize>,
    /// Show a progress bar on stderr
    pub progress: bool,
}

/// Match left and right sources by id.
///
/// An id found on one side only yields [`TreeDistError::MissingPair`]; an id
/// repeated within a side yields one [`TreeDistError::DuplicateId`] per
/// offending side and is not compared at all.
pub fn pair_sources<S>(
    left: impl IntoIterator<Item = (String, S)>,
    right: impl IntoIterator<Item = (String, S)>,
) -> (Vec<TreePair<S>>, Vec<(String, TreeDistError)>) {
    let mut sides: BTreeMap<String, (Vec<S>, Vec<S>)> = BTreeMap::new();
    for (id, source) in left {
        sides.entry(id).or_default().0.push(source);
    }
    for (id, source) in right {
        sides.entry(id).or_default().1.push(source);
    }

    let mut pairs = Vec::with_capacity(sides.len());
    let mut errors = Vec::new();
    for (id, (mut lefts, mut rights)) in sides {
        match (lefts.len(), rights.len()) {
            (1, 1) => {
                if let (Some(left), Some(right)) = (lefts.pop(), rights.pop()) {
                    pairs.push(TreePair { id, left, right });
                }
            }
            (l, r) if l > 1 || r > 1 => {
                for (count, side) in [(l, Side::Left), (r, Side::Right)] {
                    if count > 1 {
                        errors.push((id.clone(), TreeDistError::DuplicateId { id: id.clone(), side }));
                    }
                }
            }
            (0, _) => errors.push((id.clone(), TreeDistError::MissingPair { id, side: Side::Left })),
            _ => errors.push((id.clone(), TreeDistError::MissingPair { id, side: Side::Right })),
        }
    }

    (pairs, errors)
}

/// Load and compare the two trees of one pair.
pub fn compare_pair<S: TreeSource>(pair: &TreePair<S>) -> Result<ComparisonResult, TreeDistError> {
    let start = Instant::now();
    let left = pair.left.load()?;
    let right = pair.right.load()?;
    let cmp = compare_trees(&left, &right)?;
    debug!("Compared {} in {:.3}ms", pair.id, start.elapsed().as_secs_f64() * 1e3);
    Ok(ComparisonResult::new(pair.id.clone(), cmp))
}

/// Compare already paired sources in parallel.
///
/// # Errors
/// Only fails if the requested thread pool cannot be built; per-pair errors
/// end up in [`BatchReport::errors`].
pub fn compare_pairs<S: TreeSource + Sync>(
    pairs: &[TreePair<S>],
    options: BatchOptions,
) -> Result<BatchReport, TreeDistError> {
    let bar = if options.progress {
        ProgressBar::new(pairs.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let work = || {
        pairs
            .par_iter()
            .progress_with(bar.clone())
            .map(|pair| (pair.id.clone(), compare_pair(pair)))
            .collect::<Vec<_>>()
    };
    let outcomes = match options.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?
            .install(work),
        None => work(),
    };
    bar.finish_and_clear();

    let mut report = BatchReport::default();
    for (id, outcome) in outcomes {
        match outcome {
            Ok(row) => report.rows.push(row),
            Err(err) => report.errors.push((id, err)),
        }
    }
    report.rows.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(report)
}

/// Pair two collections by id and compare every complete pair.
///
/// Ids missing a partner or repeated on one side are reported in
/// [`BatchReport::errors`] next to parse and taxon errors; they never stop
/// the rest of the batch.
///
/// # Example
/// ```
/// use tree_pair_distances::batch::{run_batch, BatchOptions};
///
/// let left = vec![
///     ("t1".to_string(), "((A,B),(C,D));"),
///     ("t2".to_string(), "((A,B),C);"),
/// ];
/// let right = vec![("t1".to_string(), "((A,C),(B,D));")];
///
/// let report = run_batch(left, right, BatchOptions::default()).unwrap();
/// assert_eq!(report.rows.len(), 1);
/// assert_eq!(report.rows[0].rf, 2);
/// assert_eq!(report.errors.len(), 1);
/// ```
pub fn run_batch<S: TreeSource + Sync>(
    left: impl IntoIterator<Item = (String, S)>,
    right: impl IntoIterator<Item = (String, S)>,
    options: BatchOptions,
) -> Result<BatchReport, TreeDistError> {
    let (pairs, mut errors) = pair_sources(left, right);
    let mut report = compare_pairs(&pairs, options)?;

    errors.append(&mut report.errors);
    errors.sort_by(|a, b| a.0.cmp(&b.0));
    for (id, err) in &errors {
        warn!("{id}: {err}");
    }
    report.errors = errors;
    Ok(report)
}
