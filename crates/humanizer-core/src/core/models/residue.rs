use super::sequence::WILDCARD;
use phf::{Map, phf_map};

/// Score assigned to substitutions involving a residue outside the standard alphabet.
pub const UNKNOWN_SUBSTITUTION_SCORE: i32 = -4;

// Row/column order of BLOSUM62.
static AMINO_ACID_INDEX: Map<char, usize> = phf_map! {
    'A' => 0, 'R' => 1, 'N' => 2, 'D' => 3, 'C' => 4,
    'Q' => 5, 'E' => 6, 'G' => 7, 'H' => 8, 'I' => 9,
    'L' => 10, 'K' => 11, 'M' => 12, 'F' => 13, 'P' => 14,
    'S' => 15, 'T' => 16, 'W' => 17, 'Y' => 18, 'V' => 19,
};

#[rustfmt::skip]
const BLOSUM62: [[i8; 20]; 20] = [
    //A   R   N   D   C   Q   E   G   H   I   L   K   M   F   P   S   T   W   Y   V
    [ 4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0], // A
    [-1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3], // R
    [-2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3], // N
    [-2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3], // D
    [ 0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1], // C
    [-1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2], // Q
    [-1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2], // E
    [ 0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3], // G
    [-2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3], // H
    [-1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3], // I
    [-1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1], // L
    [-1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2], // K
    [-1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1], // M
    [-2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1], // F
    [-1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2], // P
    [ 1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2], // S
    [ 0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0], // T
    [-3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3], // W
    [-2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1], // Y
    [ 0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4], // V
];

pub fn is_standard_amino_acid(residue: char) -> bool {
    AMINO_ACID_INDEX.contains_key(&residue.to_ascii_uppercase())
}

/// Residues accepted in an aligned sequence: the standard alphabet plus the wildcard.
pub fn is_valid_residue(residue: char) -> bool {
    residue == WILDCARD || is_standard_amino_acid(residue)
}

/// BLOSUM62 substitution score between two residues.
pub fn substitution_score(from: char, to: char) -> i32 {
    let from_idx = AMINO_ACID_INDEX.get(&from.to_ascii_uppercase());
    let to_idx = AMINO_ACID_INDEX.get(&to.to_ascii_uppercase());
    match (from_idx, to_idx) {
        (Some(&i), Some(&j)) => BLOSUM62[i][j] as i32,
        _ => UNKNOWN_SUBSTITUTION_SCORE,
    }
}
