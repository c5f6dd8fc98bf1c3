use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Label used by reference datasets for rows that do not come from a human donor.
pub const NOT_HUMAN_LABEL: &str = "NOT_HUMAN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainKind {
    Heavy,
    Kappa,
    Lambda,
}

impl ChainKind {
    pub fn letter(&self) -> char {
        match self {
            ChainKind::Heavy => 'H',
            ChainKind::Kappa => 'K',
            ChainKind::Lambda => 'L',
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'H' => Some(ChainKind::Heavy),
            'K' => Some(ChainKind::Kappa),
            'L' => Some(ChainKind::Lambda),
            _ => None,
        }
    }
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ChainKind::Heavy => "Heavy",
                ChainKind::Kappa => "Kappa",
                ChainKind::Lambda => "Lambda",
            }
        )
    }
}

/// A specific V-gene family of an antibody chain, e.g. heavy family 3 (`HV3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainType {
    pub kind: ChainKind,
    pub v_family: u8,
}

impl ChainType {
    pub fn new(kind: ChainKind, v_family: u8) -> Self {
        Self { kind, v_family }
    }

    /// Short form used in model metadata, e.g. `HV3`.
    pub fn full_type(&self) -> String {
        format!("{}V{}", self.kind.letter(), self.v_family)
    }

    /// Reference dataset label, e.g. `IGHV3`.
    pub fn label(&self) -> String {
        format!("IG{}", self.full_type())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid chain type string: '{0}' (expected e.g. 'HV1' or 'IGKV3')")]
pub struct ParseChainTypeError(pub String);

impl FromStr for ChainType {
    type Err = ParseChainTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseChainTypeError(s.to_string());
        let trimmed = s.trim().to_ascii_uppercase();
        let body = trimmed.strip_prefix("IG").unwrap_or(&trimmed);

        let mut chars = body.chars();
        let kind = chars.next().and_then(ChainKind::from_letter).ok_or_else(err)?;
        let rest = chars.as_str();
        let digits = rest.strip_prefix('V').unwrap_or(rest);
        let v_family = digits.parse::<u8>().map_err(|_| err())?;
        if v_family == 0 {
            return Err(err());
        }
        Ok(ChainType { kind, v_family })
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_type())
    }
}
