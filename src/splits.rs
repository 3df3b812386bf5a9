//! Extract canonical split sets from parsed trees.
//!
//! # Overview
//! A [`SplitSet`] captures all non-trivial bipartitions (splits) of a tree
//! along with their branch lengths. It is immutable once built and can be
//! compared with another split set over the same
//! [`TaxonNamespace`](crate::taxa::TaxonNamespace).
//!
//! # What is a split?
//! Removing an edge divides the taxa into two groups:
//! ```text
//!      root
//!     /    \
//!   {A,B}  {C,D}  ← this edge creates the split {A,B}|{C,D}
//! ```
//!
//! Edges leading to a single leaf give trivial splits ({A}|{B,C,D}) and are
//! skipped, as is the edge whose subtree holds all taxa but one.
//!
//! # Canonicalization
//! Each split can be written two ways: {A,B}|{C,D} or {C,D}|{A,B}. We always
//! store the side that does NOT contain taxon 0, so the same split read from
//! two differently rooted or ordered trees has the same bitset.

use std::collections::BTreeMap;

use crate::bitset::Bitset;
use crate::tree::{NodeKind, Tree};

/// The non-trivial splits of one tree, keyed by canonical bitset.
///
/// # Degree-2 nodes
/// When two edges of a tree induce the same split (a node with a single
/// child, or a root with two children), they form one edge of the unrooted
/// tree and the stored length is the sum of both lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSet {
    splits: BTreeMap<Bitset, f64>,
    num_taxa: usize,
    taxa: Bitset,
}

impl SplitSet {
    /// Encode the splits of `tree` over a namespace of `num_taxa` taxa.
    ///
    /// # Algorithm
    /// 1. Post-order traversal (explicit stack) so children come before parents
    /// 2. A leaf's set is its own bit; an internal node ORs its children's sets
    /// 3. Every non-root node with 2..=n-2 taxa below it yields a split
    /// 4. Canonicalize (side without taxon 0) and record the edge length,
    ///    missing lengths count as 0
    ///
    /// # Example
    /// ```
    /// use tree_pair_distances::newick::parse_newick;
    /// use tree_pair_distances::splits::SplitSet;
    /// use tree_pair_distances::taxa::TaxonNamespace;
    ///
    /// let mut taxa = TaxonNamespace::new();
    /// let tree = parse_newick("((A,B):0.5,(C,D):0.25,E);", &mut taxa).unwrap();
    /// let splits = SplitSet::from_tree(&tree, taxa.size());
    ///
    /// assert_eq!(splits.len(), 2);
    /// ```
    pub fn from_tree(tree: &Tree, num_taxa: usize) -> Self {
        let words = Bitset::words_for(num_taxa);
        let mut below: Vec<Bitset> = vec![Bitset::zeros(words); tree.size()];
        let mut splits: BTreeMap<Bitset, f64> = BTreeMap::new();

        for id in tree.postorder() {
            let node = &tree.nodes()[id];
            let mut set = Bitset::zeros(words);
            match &node.kind {
                NodeKind::Leaf(taxon) => set.set(*taxon),
                NodeKind::Internal(children) => {
                    for &child in children {
                        set.or_assign(&below[child]);
                    }
                }
            }

            if node.parent.is_some() {
                let count = set.count_ones();
                if count > 1 && count + 1 < num_taxa {
                    let length = node.branch_length.unwrap_or(0.0);
                    *splits.entry(set.clone().canonical(num_taxa)).or_insert(0.0) += length;
                }
            }
            below[id] = set;
        }

        let taxa = below
            .get(tree.root())
            .cloned()
            .unwrap_or_else(|| Bitset::zeros(words));

        SplitSet {
            splits,
            num_taxa,
            taxa,
        }
    }

    /// Number of distinct splits.
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Size of the namespace the splits were encoded over.
    pub fn num_taxa(&self) -> usize {
        self.num_taxa
    }

    /// Taxa present in the tree.
    pub fn taxa(&self) -> &Bitset {
        &self.taxa
    }

    pub fn contains(&self, split: &Bitset) -> bool {
        self.splits.contains_key(split)
    }

    /// Branch length recorded for `split`.
    pub fn length(&self, split: &Bitset) -> Option<f64> {
        self.splits.get(split).copied()
    }

    /// All canonical splits with their lengths, ordered by bitset.
    pub fn iter(&self) -> impl Iterator<Item = (&Bitset, f64)> + '_ {
        self.splits.iter().map(|(split, &length)| (split, length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newick::parse_newick;
    use crate::taxa::TaxonNamespace;

    fn split_of(taxa: &TaxonNamespace, labels: &[&str]) -> Bitset {
        let mut set = Bitset::for_taxa(taxa.size());
        for label in labels {
            set.set(taxa.get(label).unwrap());
        }
        set.canonical(taxa.size())
    }

    fn encode(text: &str) -> (SplitSet, TaxonNamespace) {
        let mut taxa = TaxonNamespace::new();
        let tree = parse_newick(text, &mut taxa).unwrap();
        (SplitSet::from_tree(&tree, taxa.size()), taxa)
    }

    /// ```text
    ///              root
    ///             /    \
    ///         node1     E
    ///         /   \
    ///     node2    D
    ///     /   \
    ///    A    node3
    ///         /   \
    ///        B     C
    /// ```
    ///
    /// Taxa: A=0, B=1, C=2, D=3, E=4
    ///
    /// | Node  | Taxa below | Kept?               | Canonical |
    /// |-------|------------|---------------------|-----------|
    /// | node3 | {B,C}      | yes                 | {B,C}     |
    /// | node2 | {A,B,C}    | yes                 | {D,E}     |
    /// | node1 | {A,B,C,D}  | no, n-1 taxa        | -         |
    #[test]
    fn asymmetric_tree_splits() {
        let (splits, taxa) = encode("(((A,(B,C):0.3):0.2,D):0.1,E);");

        assert_eq!(splits.len(), 2);
        assert_eq!(splits.length(&split_of(&taxa, &["B", "C"])), Some(0.3));
        assert_eq!(splits.length(&split_of(&taxa, &["D", "E"])), Some(0.2));
        assert_eq!(split_of(&taxa, &["D", "E"]).0[0], 0b11000);
    }

    #[test]
    fn trivial_splits_are_skipped() {
        let (splits, _) = encode("(A:1,B:2,C:3);");
        assert!(splits.is_empty());

        let (splits, _) = encode("((A,B),(C,D),E);");
        assert_eq!(splits.len(), 2);
    }

    /// A two-child root joins two edges into one unrooted edge.
    #[test]
    fn degree_two_root_sums_lengths() {
        let (splits, taxa) = encode("((A,B):1.5,(C,D):2.5);");

        assert_eq!(splits.len(), 1);
        assert_eq!(splits.length(&split_of(&taxa, &["C", "D"])), Some(4.0));
    }

    #[test]
    fn unary_node_sums_lengths() {
        let (splits, taxa) = encode("((((A,B):1):2,C),D,E);");

        assert_eq!(splits.len(), 2);
        assert_eq!(splits.length(&split_of(&taxa, &["A", "B"])), Some(3.0));
    }

    #[test]
    fn missing_lengths_count_as_zero() {
        let (splits, taxa) = encode("((A,B),(C,D),E);");
        assert_eq!(splits.length(&split_of(&taxa, &["A", "B"])), Some(0.0));
        assert_eq!(splits.length(&split_of(&taxa, &["C", "D"])), Some(0.0));
    }

    #[test]
    fn zero_length_branches_are_kept() {
        let (splits, taxa) = encode("((A,B):0,(C,D):0,E);");
        assert_eq!(splits.len(), 2);
        assert!(splits.contains(&split_of(&taxa, &["A", "B"])));
    }

    /// Child order and rooting must not change the encoded splits.
    #[test]
    fn canonicalization_invariance() {
        let mut taxa = TaxonNamespace::new();
        let texts = [
            "((A:1,B:1):0.5,(C:1,D:1):0.7,(E:1,F:1):0.9);",
            "((F:1,E:1):0.9,(D:1,C:1):0.7,(B:1,A:1):0.5);",
            "((C:1,D:1):0.7,((E:1,F:1):0.9,(A:1,B:1):0.5):0);",
        ];
        let sets: Vec<SplitSet> = texts
            .iter()
            .map(|text| parse_newick(text, &mut taxa).unwrap())
            .collect::<Vec<_>>()
            .iter()
            .map(|tree| SplitSet::from_tree(tree, 6))
            .collect();

        assert_eq!(taxa.size(), 6);
        assert_eq!(sets[0], sets[1]);
        assert_eq!(sets[0], sets[2]);
    }

    #[test]
    fn reparsing_is_deterministic() {
        let text = "((A:0.1,(B:0.2,C:0.3):0.4):0.5,(D:0.6,E:0.7):0.8,F:0.9);";
        let mut taxa = TaxonNamespace::new();
        let first = parse_newick(text, &mut taxa).unwrap();
        let second = parse_newick(text, &mut taxa).unwrap();
        assert_eq!(
            SplitSet::from_tree(&first, taxa.size()),
            SplitSet::from_tree(&second, taxa.size())
        );
    }

    #[test]
    fn records_tree_taxa() {
        let mut taxa = TaxonNamespace::new();
        parse_newick("(A,B,C,D);", &mut taxa).unwrap();
        let tree = parse_newick("(B,(C,D));", &mut taxa).unwrap();
        let splits = SplitSet::from_tree(&tree, taxa.size());

        assert_eq!(splits.num_taxa(), 4);
        assert_eq!(splits.taxa().ones().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn wide_namespace() {
        // 130 taxa in a caterpillar: n-3 = 127 splits over 3 words.
        let n = 130;
        let mut text = String::new();
        for _ in 0..n - 1 {
            text.push('(');
        }
        text.push_str("t0");
        for i in 1..n {
            text.push_str(&format!(",t{i})"));
        }
        text.push(';');

        let (splits, taxa) = encode(&text);
        assert_eq!(taxa.size(), n);
        assert_eq!(splits.len(), n - 3);
        assert!(splits.iter().all(|(split, _)| !split.contains(0)));
        assert!(splits.iter().all(|(split, _)| split.0.len() == 3));
    }
}
