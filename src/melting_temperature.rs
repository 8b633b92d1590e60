//! Duplex melting temperature engine.
//!
//! The primary model is nearest-neighbor thermodynamics after SantaLucia
//! (1998), with selectable salt correction equations and a DMSO correction.
//! A GC%-empirical shortcut model is also selectable; it assumes standard
//! buffer conditions and takes no corrections.

use crate::dna_sequence::DnaSequence;
use crate::error::TmError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Universal gas constant, cal mol^-1 K^-1.
const GAS_CONSTANT: f64 = 1.987;

/// Physical floor for any returned temperature, degrees Celsius.
pub const ABSOLUTE_ZERO_CELSIUS: f64 = -273.15;

// SantaLucia (1998) unified parameters, fully expanded to all 16 ordered
// pairs; complementary pairs carry identical values by symmetry. Indexed by
// pair_index(). Enthalpy in cal mol^-1, entropy in cal K^-1 mol^-1.
const STACKING_ENTHALPY: [f64; 16] = [
    -7900.0, -8400.0, -7800.0, -7200.0, // AA AC AG AT
    -8500.0, -8000.0, -10600.0, -7800.0, // CA CC CG CT
    -8200.0, -9800.0, -8000.0, -8400.0, // GA GC GG GT
    -7200.0, -8200.0, -8500.0, -7900.0, // TA TC TG TT
];
const STACKING_ENTROPY: [f64; 16] = [
    -22.2, -22.4, -21.0, -20.4, // AA AC AG AT
    -22.7, -19.9, -27.2, -21.0, // CA CC CG CT
    -22.2, -24.4, -19.9, -22.4, // GA GC GG GT
    -21.3, -22.2, -22.7, -22.2, // TA TC TG TT
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TmAlgorithm {
    #[default]
    NearestNeighbor,
    GcEmpirical,
}

impl FromStr for TmAlgorithm {
    type Err = TmError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "nearest-neighbor" | "nnSantaLucia" => Ok(Self::NearestNeighbor),
            "gc-empirical" | "oligoCalc" => Ok(Self::GcEmpirical),
            _ => Err(TmError::UnknownAlgorithm(name.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaltCorrection {
    #[default]
    SchildkrautLifson,
    Owczarzy,
}

impl FromStr for SaltCorrection {
    type Err = TmError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "schildkraut-lifson" | "SchildkrautLifson" => Ok(Self::SchildkrautLifson),
            "owczarzy" | "Owczarzy" => Ok(Self::Owczarzy),
            _ => Err(TmError::UnknownSaltCorrection(name.to_string())),
        }
    }
}

/// Melting temperature of `sequence` in degrees Celsius.
///
/// Concentrations are explicit value parameters: primer concentration in
/// molar units, salt concentration in molar units, DMSO concentration in
/// v/v percent. An absent, zero or NaN salt/DMSO concentration skips that
/// correction. Corrections apply to the nearest-neighbor result only.
pub fn melting_temperature(
    sequence: &str,
    primer_conc_molar: f64,
    salt_conc_molar: Option<f64>,
    dmso_conc_percent: Option<f64>,
    algorithm: TmAlgorithm,
    salt_correction: SaltCorrection,
) -> Result<f64, TmError> {
    let sequence = DnaSequence::new(sequence)?;
    let tm = match algorithm {
        TmAlgorithm::NearestNeighbor => {
            let mut tm = nearest_neighbor(&sequence, primer_conc_molar);
            if let Some(salt) = effective_concentration(salt_conc_molar) {
                tm = apply_salt_correction(salt_correction, tm, &sequence, salt);
            }
            if let Some(dmso) = effective_concentration(dmso_conc_percent) {
                tm -= 0.6 * dmso;
            }
            tm
        }
        TmAlgorithm::GcEmpirical => gc_empirical(&sequence),
    };
    Ok(tm.max(ABSOLUTE_ZERO_CELSIUS))
}

#[inline(always)]
fn effective_concentration(concentration: Option<f64>) -> Option<f64> {
    concentration.filter(|value| *value != 0.0 && !value.is_nan())
}

fn nearest_neighbor(sequence: &DnaSequence, primer_conc_molar: f64) -> f64 {
    let mut enthalpy = 0.0; // cal mol^-1
    let mut entropy = 0.0; // cal K^-1 mol^-1

    // A self-complementary duplex has a single strand species, which changes
    // the equilibrium expression: entropy correction and divisor 1 instead
    // of 4.
    let symmetry_divisor = if sequence.is_self_complementary() {
        entropy += -1.4;
        1.0
    } else {
        4.0
    };

    // Nucleation term. Annealing starts at a G-C pair whenever one exists
    // anywhere in the primer.
    if sequence.as_str().contains(['G', 'C']) {
        enthalpy += 100.0;
        entropy += -2.8;
    } else {
        enthalpy += 2300.0;
        entropy += 4.1;
    }

    for pair in sequence.as_str().as_bytes().windows(2) {
        let index = pair_index(pair[0], pair[1]);
        enthalpy += STACKING_ENTHALPY[index];
        entropy += STACKING_ENTROPY[index];
    }

    let kelvin =
        enthalpy / (entropy + GAS_CONSTANT * (primer_conc_molar / symmetry_divisor).ln());
    kelvin + ABSOLUTE_ZERO_CELSIUS
}

fn gc_empirical(sequence: &DnaSequence) -> f64 {
    if sequence.is_empty() {
        return ABSOLUTE_ZERO_CELSIUS;
    }
    let gc = sequence
        .as_str()
        .bytes()
        .filter(|base| matches!(base, b'G' | b'C'))
        .count() as f64;
    64.9 + 41.0 * ((gc - 16.4) / sequence.len() as f64)
}

fn apply_salt_correction(
    equation: SaltCorrection,
    tm: f64,
    sequence: &DnaSequence,
    salt_conc_molar: f64,
) -> f64 {
    match equation {
        SaltCorrection::SchildkrautLifson => tm + 16.6 * salt_conc_molar.ln(),
        SaltCorrection::Owczarzy => {
            let ln_salt = salt_conc_molar.ln();
            let reciprocal = 1.0 / tm
                + (4.29 * sequence.gc_fraction() - 3.95) * 1e-5 * ln_salt
                + 9.4e-6 * ln_salt * ln_salt;
            1.0 / reciprocal
        }
    }
}

#[inline(always)]
fn pair_index(first: u8, second: u8) -> usize {
    base_index(first) * 4 + base_index(second)
}

#[inline(always)]
fn base_index(base: u8) -> usize {
    match base {
        b'A' => 0,
        b'C' => 1,
        b'G' => 2,
        b'T' => 3,
        _ => unreachable!("DnaSequence guarantees the {{A,C,G,T}} alphabet"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nucleotide;

    const PRIMER_CONC: f64 = 2.5e-7;

    fn nearest_neighbor_tm(sequence: &str) -> f64 {
        melting_temperature(
            sequence,
            PRIMER_CONC,
            None,
            None,
            TmAlgorithm::NearestNeighbor,
            SaltCorrection::SchildkrautLifson,
        )
        .unwrap()
    }

    #[test]
    fn test_nearest_neighbor_golden_value() {
        // Reference value computed analytically from the stated tables:
        // ACGT is self-complementary, GC nucleation, pairs AC+CG+GT.
        let tm = nearest_neighbor_tm("ACGT");
        assert!((tm - -16.585487699081398).abs() < 1e-6, "tm = {tm}");
    }

    #[test]
    fn test_nearest_neighbor_monotonic_in_primer_concentration() {
        let low = melting_temperature(
            "ATGCAAGTCC",
            2.5e-7,
            None,
            None,
            TmAlgorithm::NearestNeighbor,
            SaltCorrection::SchildkrautLifson,
        )
        .unwrap();
        let high = melting_temperature(
            "ATGCAAGTCC",
            1e-6,
            None,
            None,
            TmAlgorithm::NearestNeighbor,
            SaltCorrection::SchildkrautLifson,
        )
        .unwrap();
        assert!(high > low, "expected {high} > {low}");
    }

    #[test]
    fn test_symmetry_divisor_changes_result() {
        // Same length and base composition; only one is its own reverse
        // complement.
        let symmetric = nearest_neighbor_tm("ACGCGT");
        let asymmetric = nearest_neighbor_tm("CAGCGT");
        assert!((symmetric - asymmetric).abs() > 1.0);
    }

    #[test]
    fn test_gc_empirical_empty_sequence_is_absolute_zero() {
        let tm = melting_temperature(
            "",
            PRIMER_CONC,
            Some(0.05),
            Some(5.0),
            TmAlgorithm::GcEmpirical,
            SaltCorrection::SchildkrautLifson,
        )
        .unwrap();
        assert_eq!(tm, ABSOLUTE_ZERO_CELSIUS);
    }

    #[test]
    fn test_gc_empirical_ignores_corrections() {
        let plain = melting_temperature(
            "ACGT",
            PRIMER_CONC,
            None,
            None,
            TmAlgorithm::GcEmpirical,
            SaltCorrection::SchildkrautLifson,
        )
        .unwrap();
        let with_corrections = melting_temperature(
            "ACGT",
            PRIMER_CONC,
            Some(0.05),
            Some(5.0),
            TmAlgorithm::GcEmpirical,
            SaltCorrection::Owczarzy,
        )
        .unwrap();
        assert!((plain - -82.7).abs() < 1e-9);
        assert_eq!(plain, with_corrections);
    }

    #[test]
    fn test_schildkraut_lifson_salt_correction() {
        let base = nearest_neighbor_tm("ATGCAAGTCC");
        let corrected = melting_temperature(
            "ATGCAAGTCC",
            PRIMER_CONC,
            Some(0.05),
            None,
            TmAlgorithm::NearestNeighbor,
            SaltCorrection::SchildkrautLifson,
        )
        .unwrap();
        assert!((corrected - (base + 16.6 * 0.05_f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn test_owczarzy_salt_correction() {
        let corrected = melting_temperature(
            "ATGCAAGTCC",
            PRIMER_CONC,
            Some(0.05),
            None,
            TmAlgorithm::NearestNeighbor,
            SaltCorrection::Owczarzy,
        )
        .unwrap();
        assert!((corrected - 44.133380532371696).abs() < 1e-6, "tm = {corrected}");
    }

    #[test]
    fn test_zero_and_nan_salt_concentration_skip_correction() {
        let base = nearest_neighbor_tm("ATGCAAGTCC");
        for salt in [Some(0.0), Some(f64::NAN), None] {
            let tm = melting_temperature(
                "ATGCAAGTCC",
                PRIMER_CONC,
                salt,
                None,
                TmAlgorithm::NearestNeighbor,
                SaltCorrection::SchildkrautLifson,
            )
            .unwrap();
            assert_eq!(tm, base);
        }
    }

    #[test]
    fn test_dmso_correction() {
        let base = nearest_neighbor_tm("ATGCAAGTCC");
        let corrected = melting_temperature(
            "ATGCAAGTCC",
            PRIMER_CONC,
            None,
            Some(5.0),
            TmAlgorithm::NearestNeighbor,
            SaltCorrection::SchildkrautLifson,
        )
        .unwrap();
        assert!((corrected - (base - 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_result_is_floored_at_absolute_zero() {
        let tm = melting_temperature(
            "ATGCAAGTCC",
            PRIMER_CONC,
            None,
            Some(1000.0),
            TmAlgorithm::NearestNeighbor,
            SaltCorrection::SchildkrautLifson,
        )
        .unwrap();
        assert_eq!(tm, ABSOLUTE_ZERO_CELSIUS);
    }

    #[test]
    fn test_invalid_nucleotide_is_rejected() {
        let err = melting_temperature(
            "ACGU",
            PRIMER_CONC,
            None,
            None,
            TmAlgorithm::NearestNeighbor,
            SaltCorrection::SchildkrautLifson,
        )
        .unwrap_err();
        assert!(matches!(err, TmError::InvalidNucleotide(_)));
    }

    #[test]
    fn test_stacking_tables_are_symmetric_under_reverse_complement() {
        let bases = [b'A', b'C', b'G', b'T'];
        for &first in &bases {
            for &second in &bases {
                let pair = pair_index(first, second);
                let reverse_complement = pair_index(
                    nucleotide::complement_base(second).unwrap(),
                    nucleotide::complement_base(first).unwrap(),
                );
                assert_eq!(
                    STACKING_ENTHALPY[pair], STACKING_ENTHALPY[reverse_complement],
                    "enthalpy mismatch for pair {}{}",
                    first as char, second as char
                );
                assert_eq!(
                    STACKING_ENTROPY[pair], STACKING_ENTROPY[reverse_complement],
                    "entropy mismatch for pair {}{}",
                    first as char, second as char
                );
            }
        }
    }

    #[test]
    fn test_algorithm_selection_by_name() {
        assert_eq!(
            "nearest-neighbor".parse::<TmAlgorithm>().unwrap(),
            TmAlgorithm::NearestNeighbor
        );
        assert_eq!(
            "gc-empirical".parse::<TmAlgorithm>().unwrap(),
            TmAlgorithm::GcEmpirical
        );
        assert_eq!(
            "owczarzy".parse::<SaltCorrection>().unwrap(),
            SaltCorrection::Owczarzy
        );
        assert!(matches!(
            "wallace".parse::<TmAlgorithm>(),
            Err(TmError::UnknownAlgorithm(_))
        ));
        assert!(matches!(
            "wallace".parse::<SaltCorrection>(),
            Err(TmError::UnknownSaltCorrection(_))
        ));
    }
}
