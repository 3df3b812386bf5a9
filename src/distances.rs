//! Tree distance metrics over canonical split sets.
//!
//! This module implements the Robinson-Foulds family of distances:
//!
//! 1. **Robinson-Foulds (RF)**: Counts the splits present in exactly one of
//!    the two trees. Range: [0, 2n-6] where n is the number of taxa.
//!
//! 2. **Normalized RF**: RF divided by its maximum 2(n-3), in [0, 1].
//!
//! 3. **Weighted Robinson-Foulds**: Like RF but considers branch lengths.
//!    For shared splits, adds |length_a - length_b|.
//!    For unique splits, adds the full branch length.
//!
//! 4. **Kuhner-Felsenstein (Branch Score)**: Similar to weighted RF but uses
//!    squared differences: sqrt(Σ(length_a - length_b)²)
//!
//! The single-metric functions assume both split sets were encoded over the
//! same namespace and taxa; [`compare`] checks that first.

use itertools::{EitherOrBoth, Itertools};

use crate::errors::TreeDistError;
use crate::newick::parse_newick;
use crate::splits::SplitSet;
use crate::taxa::TaxonNamespace;

/// All metrics for one pair of trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// Robinson Foulds metric
    pub rf: usize,
    /// Normalized Robinson Foulds
    pub norm_rf: f64,
    /// Weighted Robinson Foulds
    pub weighted_rf: f64,
    /// Kuhner Felsenstein branch score
    pub branch_score: f64,
}

/// Parse two Newick strings against one fresh namespace and compare them.
///
/// The namespace is frozen after the left tree, so a right tree with an
/// unseen label is reported as a taxon mismatch.
///
/// # Example
/// ```
/// use tree_pair_distances::distances::compare_trees;
///
/// let cmp = compare_trees("((A,B),(C,D));", "((A,C),(B,D));").unwrap();
/// assert_eq!(cmp.rf, 2);
/// assert_eq!(cmp.norm_rf, 1.0);
/// ```
///
/// # Errors
/// Parse errors of either tree, or [`TreeDistError::TaxonMismatch`].
pub fn compare_trees(left: &str, right: &str) -> Result<Comparison, TreeDistError> {
    let mut taxa = TaxonNamespace::new();
    let left_tree = parse_newick(left, &mut taxa)?;
    taxa.freeze();
    let right_tree = parse_newick(right, &mut taxa).map_err(|err| match err {
        TreeDistError::LabelCollision(label) => TreeDistError::TaxonMismatch {
            only_left: Vec::new(),
            only_right: vec![label],
        },
        other => other,
    })?;

    let a = SplitSet::from_tree(&left_tree, taxa.size());
    let b = SplitSet::from_tree(&right_tree, taxa.size());
    compare(&a, &b, &taxa)
}

/// Check that two split sets cover exactly the same taxa.
///
/// # Errors
/// [`TreeDistError::TaxonMismatch`] listing the labels found on one side only.
pub fn check_taxa(a: &SplitSet, b: &SplitSet, taxa: &TaxonNamespace) -> Result<(), TreeDistError> {
    if a.num_taxa() == b.num_taxa() && a.taxa() == b.taxa() {
        return Ok(());
    }
    Err(TreeDistError::TaxonMismatch {
        only_left: taxa.labels_of(&a.taxa().difference(b.taxa())),
        only_right: taxa.labels_of(&b.taxa().difference(a.taxa())),
    })
}

/// Compute every metric in one pass after checking the taxa match.
///
/// # Errors
/// [`TreeDistError::TaxonMismatch`] if the two trees do not share their taxa.
pub fn compare(a: &SplitSet, b: &SplitSet, taxa: &TaxonNamespace) -> Result<Comparison, TreeDistError> {
    check_taxa(a, b, taxa)?;

    let (diffs, shared) = length_differences(a, b);
    let weighted_rf = diffs.iter().fold(0.0, |sum, diff| sum + diff);
    let sum_squared = diffs.iter().fold(0.0, |sum, diff| sum + diff * diff);

    let rf = a.len() + b.len() - 2 * shared;
    Ok(Comparison {
        rf,
        norm_rf: normalize(rf, a),
        weighted_rf,
        branch_score: sum_squared.sqrt(),
    })
}

/// Largest possible RF for `num_taxa` taxa: each binary unrooted tree has
/// n-3 non-trivial splits.
pub fn max_robinson_foulds(num_taxa: usize) -> usize {
    if num_taxa < 3 { 0 } else { 2 * (num_taxa - 3) }
}

/// Absolute length differences over every split found in either set, in
/// ascending order, and the number of splits both sets share.
///
/// A split missing from one side counts as length 0 there. Sums over the
/// sorted differences do not depend on argument order or on how the
/// namespace numbered the taxa.
fn length_differences(a: &SplitSet, b: &SplitSet) -> (Vec<f64>, usize) {
    let mut shared = 0;
    let mut diffs: Vec<f64> = a
        .iter()
        .merge_join_by(b.iter(), |(x, _), (y, _)| x.cmp(y))
        .map(|pair| match pair {
            EitherOrBoth::Both((_, length_a), (_, length_b)) => {
                shared += 1;
                (length_a - length_b).abs()
            }
            EitherOrBoth::Left((_, length)) | EitherOrBoth::Right((_, length)) => length,
        })
        .collect();
    diffs.sort_by(f64::total_cmp);
    (diffs, shared)
}

fn normalize(rf: usize, a: &SplitSet) -> f64 {
    let max = max_robinson_foulds(a.num_taxa());
    if rf == 0 || max == 0 {
        0.0
    } else {
        rf as f64 / max as f64
    }
}

/// Compute Robinson-Foulds distance from two split sets.
///
/// # Algorithm
/// RF = |A| + |B| - 2|A ∩ B|
///
/// # Example
/// ```text
/// Tree 1:  ((A,B),(C,D),E)     Splits: {A,B}, {C,D}
/// Tree 2:  ((A,C),(B,D),E)     Splits: {A,C}, {B,D}
///
/// Intersection: 0 splits match
/// RF = 2 + 2 - 2*0 = 4
/// ```
pub fn robinson_foulds(a: &SplitSet, b: &SplitSet) -> usize {
    let shared = a.iter().filter(|(split, _)| b.contains(split)).count();
    a.len() + b.len() - 2 * shared
}

/// Compute RF scaled into [0, 1] by [`max_robinson_foulds`].
///
/// Zero when there are fewer than 3 taxa or both trees are unresolved.
pub fn normalized_robinson_foulds(a: &SplitSet, b: &SplitSet) -> f64 {
    normalize(robinson_foulds(a, b), a)
}

/// Compute Weighted RF distance from two split sets.
///
/// # Algorithm
/// For each split:
/// - If in both trees: add |length_a - length_b|
/// - If only in A: add length_a
/// - If only in B: add length_b
pub fn weighted_robinson_foulds(a: &SplitSet, b: &SplitSet) -> f64 {
    let (diffs, _) = length_differences(a, b);
    diffs.iter().fold(0.0, |sum, diff| sum + diff)
}

/// Compute Kuhner-Felsenstein distance from two split sets.
///
/// Like Weighted RF but accumulates squared differences, then takes the
/// square root of the sum.
pub fn kuhner_felsenstein(a: &SplitSet, b: &SplitSet) -> f64 {
    let (diffs, _) = length_differences(a, b);
    diffs.iter().fold(0.0, |sum, diff| sum + diff * diff).sqrt()
}
