//! Per-comparison registry of taxon labels.
//!
//! Both trees of a pair are parsed against the same [`TaxonNamespace`], so a
//! taxon gets the same bit position in either tree and their splits can be
//! compared by value. Each comparison builds its own namespace; nothing is
//! shared between pairs.

use std::collections::HashMap;

use crate::bitset::Bitset;
use crate::errors::TreeDistError;

/// Maps leaf labels to stable indices `0..n`, in order of first insertion.
///
/// # Example
/// ```
/// use tree_pair_distances::taxa::TaxonNamespace;
///
/// let mut taxa = TaxonNamespace::new();
/// assert_eq!(taxa.index_of("A").unwrap(), 0);
/// assert_eq!(taxa.index_of("B").unwrap(), 1);
/// assert_eq!(taxa.index_of("A").unwrap(), 0);
///
/// taxa.freeze();
/// assert!(taxa.index_of("C").is_err());
/// assert_eq!(taxa.size(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaxonNamespace {
    labels: Vec<String>,
    index: HashMap<String, usize>,
    frozen: bool,
}

impl TaxonNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `label`, registering it if unseen.
    ///
    /// # Errors
    /// Returns [`TreeDistError::LabelCollision`] if the namespace is frozen
    /// and `label` was never registered.
    pub fn index_of(&mut self, label: &str) -> Result<usize, TreeDistError> {
        if let Some(&idx) = self.index.get(label) {
            return Ok(idx);
        }
        if self.frozen {
            return Err(TreeDistError::LabelCollision(label.to_string()));
        }

        let idx = self.labels.len();
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), idx);
        Ok(idx)
    }

    /// Index of an already registered label.
    pub fn get(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Label registered at `index`.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// All labels, ordered by index.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of registered taxa.
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Close the namespace: from now on unseen labels are rejected.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Labels of the taxa set in `set`.
    pub fn labels_of(&self, set: &Bitset) -> Vec<String> {
        set.ones()
            .filter_map(|idx| self.label(idx))
            .map(str::to_string)
            .collect()
    }
}
