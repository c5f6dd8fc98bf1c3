use std::fmt;
use std::ops::Index;

/// Token used for schema positions that carry no residue in a given sequence.
pub const WILDCARD: char = 'X';

/// An amino-acid sequence aligned to the positions of a [`Schema`](super::schema::Schema).
///
/// Instances are produced by an annotator and are only mutated one position at a
/// time by the humanization engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionalSequence {
    residues: Vec<char>,
}

impl PositionalSequence {
    pub fn new(residues: Vec<char>) -> Self {
        Self { residues }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn residues(&self) -> &[char] {
        &self.residues
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.residues.get(index).copied()
    }

    /// Replaces the residue at `index` and returns the previous one.
    pub(crate) fn set(&mut self, index: usize, residue: char) -> char {
        std::mem::replace(&mut self.residues[index], residue)
    }

    /// Returns a copy with a single position replaced.
    pub(crate) fn with_residue(&self, index: usize, residue: char) -> Self {
        let mut copy = self.clone();
        copy.residues[index] = residue;
        copy
    }

    /// Indices at which `self` and `other` hold different residues.
    pub fn diff_positions(&self, other: &PositionalSequence) -> Vec<usize> {
        self.residues
            .iter()
            .zip(other.residues.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Flattens the sequence back to a plain residue string, dropping wildcard tokens.
    pub fn to_linear_string(&self) -> String {
        self.residues.iter().filter(|&&c| c != WILDCARD).collect()
    }

    /// Renders every position, wildcards included.
    pub fn to_aligned_string(&self) -> String {
        self.residues.iter().collect()
    }
}

impl Index<usize> for PositionalSequence {
    type Output = char;

    fn index(&self, index: usize) -> &Self::Output {
        &self.residues[index]
    }
}

impl From<&str> for PositionalSequence {
    fn from(value: &str) -> Self {
        Self::new(value.chars().collect())
    }
}

impl fmt::Display for PositionalSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_aligned_string())
    }
}
