//! Compact bitset representation for taxon sets.
//!
//! # Overview
//! A bitset records which taxa lie on one side of a split.
//! Each bit position corresponds to a taxon index from a
//! [`TaxonNamespace`](crate::taxa::TaxonNamespace).
//!
//! # Example
//! For a namespace [A, B, C, D] mapped to indices [0, 1, 2, 3]:
//! - Side {A, C} → bitset `0b0101` (bits 0 and 2 set)
//! - Side {B, C, D} → bitset `0b1110` (bits 1, 2, 3 set)

/// A fixed-width bitset over taxon indices.
///
/// Internally stores bits in `Vec<u64>` words to support arbitrarily large trees.
/// Each u64 word holds 64 taxon indices. Bits at or beyond the namespace size
/// are always 0, so two bitsets built for the same namespace compare by value.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Bitset(pub Vec<u64>);

impl Bitset {
    /// Creates a new bitset with all bits set to 0.
    ///
    /// # Parameters
    /// - `words`: Number of u64 words needed, see [`Bitset::words_for`].
    ///
    /// # Example
    /// ```
    /// # use tree_pair_distances::bitset::Bitset;
    /// // For a namespace of 100 taxa, need 2 words (128 bits)
    /// let bs = Bitset::zeros(2);
    /// assert_eq!(bs.0.len(), 2);
    /// ```
    pub fn zeros(words: usize) -> Self {
        Bitset(vec![0u64; words])
    }

    /// Number of words needed to hold `num_taxa` bits.
    #[inline]
    pub fn words_for(num_taxa: usize) -> usize {
        num_taxa.div_ceil(64)
    }

    /// Creates an empty bitset sized for a namespace of `num_taxa` taxa.
    pub fn for_taxa(num_taxa: usize) -> Self {
        Self::zeros(Self::words_for(num_taxa))
    }

    /// Sets the bit at the given index to 1.
    ///
    /// # Example
    /// ```
    /// # use tree_pair_distances::bitset::Bitset;
    /// let mut bs = Bitset::zeros(1);
    /// bs.set(0);
    /// bs.set(5);
    /// assert_eq!(bs.0[0], 0b00100001);
    /// ```
    #[inline]
    pub fn set(&mut self, idx: usize) {
        let word = idx >> 6; // idx / 64
        let bit = idx & 63; // idx % 64
        self.0[word] |= 1u64 << bit;
    }

    /// Returns whether the bit at `idx` is set. Out-of-range indices are unset.
    #[inline]
    pub fn contains(&self, idx: usize) -> bool {
        self.0
            .get(idx >> 6)
            .is_some_and(|word| word & (1u64 << (idx & 63)) != 0)
    }

    /// Performs bitwise OR with another bitset (union operation).
    ///
    /// # Example
    /// ```
    /// # use tree_pair_distances::bitset::Bitset;
    /// let mut left = Bitset::zeros(1);
    /// left.set(0);
    ///
    /// let mut right = Bitset::zeros(1);
    /// right.set(1);
    ///
    /// left.or_assign(&right);
    /// assert_eq!(left.0[0], 0b11);
    /// ```
    #[inline]
    pub fn or_assign(&mut self, other: &Bitset) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a |= *b;
        }
    }

    /// Bits set in `self` but not in `other`.
    ///
    /// Words missing from `other` are treated as 0.
    pub fn difference(&self, other: &Bitset) -> Bitset {
        Bitset(
            self.0
                .iter()
                .enumerate()
                .map(|(i, word)| word & !other.0.get(i).copied().unwrap_or(0))
                .collect(),
        )
    }

    /// Counts the number of set bits (population count).
    ///
    /// # Example
    /// ```
    /// # use tree_pair_distances::bitset::Bitset;
    /// let mut bs = Bitset::zeros(1);
    /// bs.set(0);
    /// bs.set(2);
    /// bs.set(5);
    /// assert_eq!(bs.count_ones(), 3);
    /// ```
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Complement with respect to a namespace of `num_taxa` taxa.
    ///
    /// Flips every word, then clears the padding bits of the last word.
    ///
    /// # Example
    /// ```
    /// # use tree_pair_distances::bitset::Bitset;
    /// let mut bs = Bitset::for_taxa(4);
    /// bs.set(0);
    /// bs.set(1);
    /// assert_eq!(bs.complement(4).0[0], 0b1100);
    /// ```
    pub fn complement(&self, num_taxa: usize) -> Bitset {
        let mut flipped = Bitset(self.0.iter().map(|w| !w).collect());
        let tail = num_taxa & 63;
        if tail != 0 {
            if let Some(last) = flipped.0.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
        flipped
    }

    /// Canonical orientation of the split this bitset describes.
    ///
    /// Of the two complementary sides, the one without taxon 0 is kept.
    ///
    /// # Example
    /// Taxa: A=0, B=1, C=2, D=3
    /// - {A,B} = `0b0011` has A → flipped to {C,D} = `0b1100`
    /// - {C,D} = `0b1100` has no A → kept as `0b1100`
    pub fn canonical(self, num_taxa: usize) -> Bitset {
        if self.contains(0) {
            self.complement(num_taxa)
        } else {
            self
        }
    }

    /// Iterates over the indices of set bits in increasing order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().flat_map(|(w, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let offset = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some((w << 6) + offset)
            })
        })
    }
}
