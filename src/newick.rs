//! Newick parser.
//!
//! # Format
//! * `tree ::= node [';']`
//! * `node ::= leaf | '(' node (',' node)* ')' [label]`, each followed by an
//!   optional `':' length`
//! * `leaf ::= label`
//!
//! Furthermore:
//! * Labels are either unquoted (no whitespace or `(),:;[]`), single-quoted
//!   (`''` escapes a quote) or double-quoted.
//! * Whitespace, newlines and `[...]` comments may appear between any two
//!   tokens. BEAST style annotations (`[&rate=0.1]`) are comments too.
//! * Internal node labels are accepted and ignored.
//! * Branch lengths must be finite and non-negative.
//!
//! The parser works on bytes with an explicit stack of open subtrees, so the
//! nesting depth is only bounded by memory.

use std::collections::HashSet;

use crate::errors::{ParseError, TreeDistError};
use crate::taxa::TaxonNamespace;
use crate::tree::{NodeId, Tree};

/// Parses one Newick tree, registering its leaf labels in `taxa`.
///
/// # Example
/// ```
/// use tree_pair_distances::newick::parse_newick;
/// use tree_pair_distances::taxa::TaxonNamespace;
///
/// let mut taxa = TaxonNamespace::new();
/// let tree = parse_newick("(A:0.1,B:0.2,(C:0.3,D:0.4)E:0.5)F;", &mut taxa).unwrap();
///
/// assert_eq!(tree.n_leaves(), 4);
/// assert_eq!(tree.size(), 6);
/// assert_eq!(taxa.labels(), ["A", "B", "C", "D"]);
/// ```
///
/// # Errors
/// * [`TreeDistError::Parse`] if the text is not a valid tree
/// * [`TreeDistError::DuplicateLabel`] if a leaf label repeats
/// * [`TreeDistError::LabelCollision`] if `taxa` is frozen and a label is new
pub fn parse_newick(text: &str, taxa: &mut TaxonNamespace) -> Result<Tree, TreeDistError> {
    NewickParser::new(text).parse(taxa)
}

/// The node most recently completed, still open to a label or a length.
struct Pending {
    id: NodeId,
    labelled: bool,
    has_length: bool,
}

struct NewickParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

#[inline]
fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b'(' | b')' | b',' | b':' | b';' | b'[' | b']') || byte.is_ascii_whitespace()
}

impl<'a> NewickParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn parse(mut self, taxa: &mut TaxonNamespace) -> Result<Tree, TreeDistError> {
        let mut tree = Tree::new();
        let mut open: Vec<NodeId> = Vec::new();
        let mut current: Option<Pending> = None;
        let mut seen: HashSet<usize> = HashSet::new();
        let mut terminated = false;

        loop {
            self.skip_trivia()?;
            let Some(&byte) = self.bytes.get(self.pos) else {
                break;
            };
            let position = self.pos;

            match byte {
                b'(' => {
                    if current.is_some() {
                        return Err(self.unexpected().into());
                    }
                    let id = tree.add_internal(open.last().copied());
                    open.push(id);
                    self.pos += 1;
                }
                b',' => {
                    if open.is_empty() {
                        return Err(self.unexpected().into());
                    }
                    if current.take().is_none() {
                        return Err(ParseError::MissingLabel(position).into());
                    }
                    self.pos += 1;
                }
                b')' => {
                    let Some(id) = open.pop() else {
                        return Err(ParseError::UnmatchedParenthesis(position).into());
                    };
                    if current.is_none() {
                        return Err(ParseError::MissingLabel(position).into());
                    }
                    current = Some(Pending {
                        id,
                        labelled: false,
                        has_length: false,
                    });
                    self.pos += 1;
                }
                b':' => {
                    let Some(node) = current.as_mut() else {
                        return Err(ParseError::MissingLabel(position).into());
                    };
                    if node.has_length {
                        return Err(self.unexpected().into());
                    }
                    self.pos += 1;
                    self.skip_trivia()?;
                    let length = self.read_branch_length()?;
                    tree.set_branch_length(node.id, length);
                    node.has_length = true;
                }
                b';' => {
                    if !open.is_empty() {
                        return Err(ParseError::UnclosedParenthesis(open.len()).into());
                    }
                    self.pos += 1;
                    terminated = true;
                    break;
                }
                _ => {
                    let label = self.read_label()?;
                    if let Some(node) = current.as_mut() {
                        if node.labelled || node.has_length {
                            self.pos = position;
                            return Err(self.unexpected().into());
                        }
                        // Internal labels carry no topology.
                        node.labelled = true;
                    } else {
                        if label.is_empty() {
                            return Err(ParseError::MissingLabel(position).into());
                        }
                        let taxon = taxa.index_of(&label)?;
                        if !seen.insert(taxon) {
                            return Err(TreeDistError::DuplicateLabel(label));
                        }
                        let id = tree.add_leaf(open.last().copied(), taxon);
                        current = Some(Pending {
                            id,
                            labelled: true,
                            has_length: false,
                        });
                    }
                }
            }
        }

        if !open.is_empty() {
            return Err(ParseError::UnclosedParenthesis(open.len()).into());
        }
        if current.is_none() {
            return Err(if tree.size() == 0 {
                ParseError::Empty
            } else {
                ParseError::MissingLabel(self.pos)
            }
            .into());
        }
        if terminated {
            self.skip_trivia()?;
            if self.pos < self.bytes.len() {
                return Err(ParseError::TrailingContent(self.pos).into());
            }
        }

        Ok(tree)
    }

    /// Skips whitespace and `[...]` comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        while let Some(&byte) = self.bytes.get(self.pos) {
            if byte.is_ascii_whitespace() {
                self.pos += 1;
            } else if byte == b'[' {
                let start = self.pos;
                match self.bytes[start..].iter().position(|&b| b == b']') {
                    Some(offset) => self.pos = start + offset + 1,
                    None => return Err(ParseError::UnclosedComment(start)),
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn read_branch_length(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(|&b| !is_delimiter(b)) {
            self.pos += 1;
        }
        let value = &self.text[start..self.pos];

        match value.parse::<f64>() {
            Ok(length) if length.is_finite() && length >= 0.0 => Ok(length),
            _ => Err(ParseError::InvalidBranchLength {
                value: value.to_string(),
                position: start,
            }),
        }
    }

    fn read_label(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.bytes[start] {
            b'\'' => self.read_quoted(b'\'', true),
            b'"' => self.read_quoted(b'"', false),
            _ => {
                while self.bytes.get(self.pos).is_some_and(|&b| !is_delimiter(b)) {
                    self.pos += 1;
                }
                if self.pos == start {
                    // A stray ']' is the only way to get here.
                    return Err(self.unexpected());
                }
                Ok(self.text[start..self.pos].to_string())
            }
        }
    }

    fn read_quoted(&mut self, quote: u8, doubled_escape: bool) -> Result<String, ParseError> {
        let start = self.pos;
        let mut label = String::new();
        let mut chunk_start = start + 1;
        let mut i = chunk_start;

        while i < self.bytes.len() {
            if self.bytes[i] != quote {
                i += 1;
                continue;
            }
            label.push_str(&self.text[chunk_start..i]);
            if doubled_escape && self.bytes.get(i + 1) == Some(&quote) {
                label.push(quote as char);
                i += 2;
                chunk_start = i;
                continue;
            }
            self.pos = i + 1;
            return Ok(label);
        }

        Err(ParseError::UnclosedQuote(start))
    }

    fn unexpected(&self) -> ParseError {
        let found = self.text[self.pos..].chars().next().unwrap_or(' ');
        ParseError::UnexpectedToken {
            found,
            position: self.pos,
        }
    }
}
