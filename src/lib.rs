//! Decode annotated plasmid files and compute primer melting temperatures.
//!
//! Two decoders produce the same canonical [`ParsedPlasmid`] model: a
//! GenBank-style flat text decoder ([`decode_flat_text`]) and a
//! SnapGene-style binary decoder ([`decode_snapgene`]). The
//! [`melting_temperature`] engine implements SantaLucia (1998)
//! nearest-neighbor thermodynamics with selectable salt and solvent
//! corrections, plus a GC%-empirical shortcut model.
//!
//! Everything here is a pure function of its inputs; decode and Tm calls can
//! run concurrently without coordination.

pub mod dna_sequence;
pub mod error;
pub mod genbank;
pub mod melting_temperature;
pub mod nucleotide;
pub mod plasmid;
pub mod snapgene;

pub use dna_sequence::DnaSequence;
pub use error::{DecodeError, InvalidNucleotide, TmError};
pub use genbank::{decode_flat_text, decode_flat_text_file};
pub use melting_temperature::{
    ABSOLUTE_ZERO_CELSIUS, SaltCorrection, TmAlgorithm, melting_temperature,
};
pub use nucleotide::{complement, reverse_complement};
pub use plasmid::{Feature, FeatureSpan, ParsedPlasmid, Topology};
pub use snapgene::{decode_snapgene, decode_snapgene_file};
