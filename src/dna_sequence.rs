use crate::error::InvalidNucleotide;
use crate::nucleotide;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated DNA sequence over {A,T,G,C}, stored uppercase.
///
/// Construction is the single validation point: every symbol is
/// case-normalized and checked against the alphabet, so all derived strands
/// are infallible.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DnaSequence(String);

impl DnaSequence {
    pub fn new(raw: &str) -> Result<Self, InvalidNucleotide> {
        let mut sequence = String::with_capacity(raw.len());
        for (position, symbol) in raw.chars().enumerate() {
            if !symbol.is_ascii() || !nucleotide::is_valid_base(symbol as u8) {
                return Err(InvalidNucleotide { symbol, position });
            }
            sequence.push(symbol.to_ascii_uppercase());
        }
        Ok(Self(sequence))
    }

    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Complementary strand, position by position. Recomputed on every call;
    /// never cached, so it cannot go stale.
    pub fn complementary_strand(&self) -> String {
        self.0
            .bytes()
            .map(nucleotide::complement_base_validated)
            .map(char::from)
            .collect()
    }

    pub fn reverse_complement(&self) -> String {
        self.complementary_strand().chars().rev().collect()
    }

    /// A palindromic duplex: the sequence reads the same as its own reverse
    /// complement.
    pub fn is_self_complementary(&self) -> bool {
        self.0 == self.reverse_complement()
    }

    pub fn gc_fraction(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let gc = self
            .0
            .bytes()
            .filter(|base| matches!(base, b'G' | b'C'))
            .count();
        gc as f64 / self.len() as f64
    }
}

impl fmt::Display for DnaSequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DnaSequence {
    type Error = InvalidNucleotide;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl From<DnaSequence> for String {
    fn from(sequence: DnaSequence) -> Self {
        sequence.0
    }
}
