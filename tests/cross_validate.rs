//! Property-based integration tests for tree pair distances.
//!
//! Random unrooted binary trees are compared with this crate and with the
//! `phylotree` crate, and the cross-cutting metric invariants are checked.

use phylotree::tree::Tree as PhyloTree;
use proptest::collection::vec;
use proptest::prelude::*;
use tree_pair_distances::compare_trees;

// ─── Random trees ───

/// A random tree grown by stepwise taxon addition onto a three-leaf star.
///
/// The root keeps its three children, so the tree is unrooted in the
/// `phylotree` sense and has exactly n-3 non-trivial splits.
#[derive(Debug, Clone)]
struct RandomTree {
    children: Vec<Vec<usize>>,
    parent: Vec<usize>,
    taxon: Vec<Option<usize>>,
    lengths: Vec<f64>,
}

impl RandomTree {
    fn build(n: usize, picks: &[u32], lengths: &[u16]) -> Self {
        let mut tree = RandomTree {
            children: vec![Vec::new()],
            parent: vec![0],
            taxon: vec![None],
            lengths: Vec::new(),
        };
        for t in 0..3 {
            tree.push(0, Some(t));
        }

        for (t, pick) in (3..n).zip(picks) {
            // Attach taxon t in the middle of the edge above `below`
            let below = 1 + (*pick as usize) % (tree.children.len() - 1);
            let above = tree.parent[below];
            let middle = tree.children.len();
            tree.children.push(vec![below]);
            tree.parent.push(above);
            tree.taxon.push(None);
            if let Some(slot) = tree.children[above].iter_mut().find(|c| **c == below) {
                *slot = middle;
            }
            tree.parent[below] = middle;
            tree.push(middle, Some(t));
        }

        tree.lengths = (0..tree.children.len())
            .map(|i| f64::from(lengths[i % lengths.len()]) / 7919.0)
            .collect();
        tree
    }

    fn push(&mut self, parent: usize, taxon: Option<usize>) -> usize {
        let id = self.children.len();
        self.children.push(Vec::new());
        self.parent.push(parent);
        self.taxon.push(taxon);
        self.children[parent].push(id);
        id
    }

    fn newick(&self, reversed: bool) -> String {
        let mut out = String::new();
        self.write(0, reversed, &mut out);
        out.push(';');
        out
    }

    fn write(&self, id: usize, reversed: bool, out: &mut String) {
        if let Some(t) = self.taxon[id] {
            out.push_str(&format!("t{t}"));
        } else {
            let mut kids = self.children[id].clone();
            if reversed {
                kids.reverse();
            }
            out.push('(');
            for (k, child) in kids.iter().enumerate() {
                if k > 0 {
                    out.push(',');
                }
                self.write(*child, reversed, out);
            }
            out.push(')');
        }
        if id != 0 {
            out.push_str(&format!(":{}", self.lengths[id]));
        }
    }
}

fn random_tree(n: usize) -> impl Strategy<Value = RandomTree> {
    (vec(any::<u32>(), n - 3), vec(0u16..=20000, 1..8))
        .prop_map(move |(picks, lengths)| RandomTree::build(n, &picks, &lengths))
}

fn tree_pair() -> impl Strategy<Value = (usize, RandomTree, RandomTree)> {
    (4usize..40).prop_flat_map(|n| (Just(n), random_tree(n), random_tree(n)))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
}

// ─── Fixed cross-checks ───

#[test]
fn matches_phylotree_on_fixed_trees() {
    let pairs = [
        (
            "((A:0.1,B:0.2):0.5,(C:0.3,D:0.4):0.6,E:0.7);",
            "((A:0.1,C:0.2):0.5,(B:0.3,D:0.4):0.6,E:0.7);",
        ),
        (
            "(A:1,B:1,(C:1,(D:1,(E:1,F:1):2):3):4);",
            "(A:1,B:1,(D:1,(C:1,(E:1,F:1):1):1):1);",
        ),
        (
            "(A:1,B:2,(C:3,D:4):5);",
            "(A:1,D:2,(C:3,B:4):5);",
        ),
    ];

    for (left, right) in pairs {
        let ours = compare_trees(left, right).unwrap();
        let a = PhyloTree::from_newick(left).unwrap();
        let b = PhyloTree::from_newick(right).unwrap();

        assert_eq!(ours.rf, a.robinson_foulds(&b).unwrap(), "{left} vs {right}");
        assert!(close(ours.weighted_rf, a.weighted_robinson_foulds(&b).unwrap()));
        assert!(close(ours.branch_score, a.khuner_felsenstein(&b).unwrap()));
    }
}

// ─── Properties ───

proptest! {
    #[test]
    fn rf_matches_phylotree((_n, a, b) in tree_pair()) {
        let (left, right) = (a.newick(false), b.newick(false));
        let ours = compare_trees(&left, &right).unwrap();

        let pa = PhyloTree::from_newick(&left).unwrap();
        let pb = PhyloTree::from_newick(&right).unwrap();
        prop_assert_eq!(ours.rf, pa.robinson_foulds(&pb).unwrap());
        prop_assert!(close(ours.weighted_rf, pa.weighted_robinson_foulds(&pb).unwrap()));
        prop_assert!(close(ours.branch_score, pa.khuner_felsenstein(&pb).unwrap()));
    }

    #[test]
    fn identical_trees_are_exactly_zero((_n, a, _b) in tree_pair()) {
        let text = a.newick(false);
        let cmp = compare_trees(&text, &text).unwrap();
        prop_assert_eq!(cmp.rf, 0);
        prop_assert_eq!(cmp.norm_rf, 0.0);
        prop_assert_eq!(cmp.weighted_rf, 0.0);
        prop_assert_eq!(cmp.branch_score, 0.0);
    }

    #[test]
    fn child_order_does_not_matter((_n, a, _b) in tree_pair()) {
        let cmp = compare_trees(&a.newick(false), &a.newick(true)).unwrap();
        prop_assert_eq!(cmp.rf, 0);
        prop_assert_eq!(cmp.weighted_rf, 0.0);
    }

    #[test]
    fn metrics_are_symmetric((_n, a, b) in tree_pair()) {
        let (left, right) = (a.newick(false), b.newick(true));
        let ab = compare_trees(&left, &right).unwrap();
        let ba = compare_trees(&right, &left).unwrap();
        prop_assert_eq!(ab.rf, ba.rf);
        prop_assert_eq!(ab.norm_rf, ba.norm_rf);
        prop_assert_eq!(ab.weighted_rf.to_bits(), ba.weighted_rf.to_bits());
        prop_assert_eq!(ab.branch_score.to_bits(), ba.branch_score.to_bits());
    }

    #[test]
    fn rf_is_bounded((n, a, b) in tree_pair()) {
        let cmp = compare_trees(&a.newick(false), &b.newick(false)).unwrap();
        prop_assert!(cmp.rf <= 2 * (n - 3));
        prop_assert_eq!(cmp.rf % 2, 0);
        prop_assert!((0.0..=1.0).contains(&cmp.norm_rf));
        prop_assert!(cmp.weighted_rf >= 0.0);
        prop_assert!(cmp.branch_score <= cmp.weighted_rf + 1e-9);
    }
}
