//! Canonical in-memory model produced by the plasmid file decoders.

use crate::dna_sequence::DnaSequence;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    #[default]
    Linear,
    Circular,
}

/// Inclusive 1-based range over the sequence. `complement` marks a feature
/// read on the reverse strand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpan {
    pub start: usize,
    pub end: usize,
    pub complement: bool,
}

/// An annotated region of interest.
///
/// `name` is the disambiguated feature key. The synthetic `LOCUS` entry
/// carries the file header as a note and has no span; it is not a sequence
/// feature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    name: String,
    span: Option<FeatureSpan>,
    qualifiers: IndexMap<String, String>,
}

impl Feature {
    pub fn new(
        name: String,
        span: Option<FeatureSpan>,
        qualifiers: IndexMap<String, String>,
    ) -> Self {
        Self {
            name,
            span,
            qualifiers,
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn span(&self) -> Option<FeatureSpan> {
        self.span
    }

    #[inline(always)]
    pub fn qualifiers(&self) -> &IndexMap<String, String> {
        &self.qualifiers
    }

    pub fn qualifier(&self, name: &str) -> Option<&str> {
        self.qualifiers.get(name).map(String::as_str)
    }

    /// Genuine annotations have a span; header pseudo-features do not.
    #[inline(always)]
    pub fn is_sequence_feature(&self) -> bool {
        self.span.is_some()
    }
}

/// Aggregate of sequence, features (insertion order = source order) and
/// topology. Immutable once produced by a decoder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPlasmid {
    sequence: DnaSequence,
    features: IndexMap<String, Feature>,
    topology: Topology,
}

impl ParsedPlasmid {
    pub fn new(
        sequence: DnaSequence,
        features: IndexMap<String, Feature>,
        topology: Topology,
    ) -> Self {
        Self {
            sequence,
            features,
            topology,
        }
    }

    #[inline(always)]
    pub fn sequence(&self) -> &DnaSequence {
        &self.sequence
    }

    #[inline(always)]
    pub fn features(&self) -> &IndexMap<String, Feature> {
        &self.features
    }

    pub fn feature(&self, key: &str) -> Option<&Feature> {
        self.features.get(key)
    }

    #[inline(always)]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn is_circular(&self) -> bool {
        self.topology == Topology::Circular
    }

    /// Complementary strand of the plasmid sequence, recomputed on demand.
    pub fn complementary_strand(&self) -> String {
        self.sequence.complementary_strand()
    }
}
