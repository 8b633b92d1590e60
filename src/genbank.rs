//! GenBank-style flat text decoder.
//!
//! Feature records are segmented by span lines: any line containing `..`
//! starts a new record, and the following lines up to the next span line are
//! that record's qualifier lines. GenBank emits exactly one span line per
//! feature, so this groups a feature with its indented qualifiers.

use crate::dna_sequence::DnaSequence;
use crate::error::DecodeError;
use crate::plasmid::{Feature, FeatureSpan, ParsedPlasmid, Topology};
use indexmap::IndexMap;

const LOCUS_PREFIX: &str = "LOCUS";
const FEATURES_MARKER: &str = "FEATURES";
const ORIGIN_MARKER: &str = "ORIGIN";
const SPAN_DELIMITER: &str = "..";

/// Decode a GenBank-style flat text file into a [`ParsedPlasmid`].
pub fn decode_flat_text(text: &str) -> Result<ParsedPlasmid, DecodeError> {
    let sequence = extract_sequence(text)?;
    let features = extract_features(text)?;
    let topology = detect_topology(text);
    Ok(ParsedPlasmid::new(sequence, features, topology))
}

/// Read `filename` and decode it as GenBank-style flat text.
pub fn decode_flat_text_file(filename: &str) -> Result<ParsedPlasmid, DecodeError> {
    let text = std::fs::read_to_string(filename)?;
    decode_flat_text(&text)
}

fn extract_sequence(text: &str) -> Result<DnaSequence, DecodeError> {
    let Some(marker) = text.find(ORIGIN_MARKER) else {
        return Err(DecodeError::MissingSequence);
    };
    let tail = text[marker + ORIGIN_MARKER.len()..].replace("//", "");
    // Tokens with digits are GenBank line-position numbers.
    let sequence: String = tail
        .split_whitespace()
        .filter(|token| !token.chars().any(|c| c.is_ascii_digit()))
        .collect();
    Ok(DnaSequence::new(&sequence)?)
}

fn extract_features(text: &str) -> Result<IndexMap<String, Feature>, DecodeError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut features = IndexMap::new();
    let Some(&first_line) = lines.first() else {
        return Ok(features);
    };

    // The header line becomes a synthetic LOCUS entry with no span.
    let locus_note = first_line
        .strip_prefix(LOCUS_PREFIX)
        .map(str::trim_start)
        .unwrap_or(first_line)
        .to_string();
    let mut locus_qualifiers = IndexMap::new();
    locus_qualifiers.insert("note".to_string(), locus_note);
    features.insert(
        LOCUS_PREFIX.to_string(),
        Feature::new(LOCUS_PREFIX.to_string(), None, locus_qualifiers),
    );

    // No FEATURES block is fine; the LOCUS entry alone remains.
    let Some(marker) = lines.iter().position(|line| line.contains(FEATURES_MARKER)) else {
        return Ok(features);
    };

    for record in collect_records(&lines[marker + 1..]) {
        let span_line = record[0];
        let base_name = span_line
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        let span_text = match span_line.find("complement") {
            Some(index) => &span_line[index..],
            None => span_line[base_name.len()..].trim(),
        };
        let span = parse_span(span_text)?;

        let mut qualifiers = IndexMap::new();
        for line in &record[1..] {
            let Some((raw_name, raw_value)) = line.split_once('=') else {
                continue;
            };
            let name = raw_name
                .trim()
                .trim_start_matches('/')
                .trim_matches('"')
                .to_string();
            let value = raw_value.replace('"', "").trim().to_string();
            qualifiers.insert(name, value);
        }

        let key = unique_feature_key(&features, &base_name);
        features.insert(
            key.clone(),
            Feature::new(key, Some(span), qualifiers),
        );
    }
    Ok(features)
}

fn collect_records<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut records: Vec<Vec<&'a str>> = vec![];
    for &line in lines {
        if line.starts_with(ORIGIN_MARKER) {
            break;
        }
        if line.contains(SPAN_DELIMITER) {
            records.push(vec![line]);
        } else if let Some(current) = records.last_mut() {
            current.push(line);
        }
    }
    records
}

// Collision policy: try the base name, then base name + 0, 1, 2, ... until an
// unused key is found. No feature is ever discarded.
fn unique_feature_key(existing: &IndexMap<String, Feature>, base_name: &str) -> String {
    if !existing.contains_key(base_name) {
        return base_name.to_string();
    }
    let mut suffix = 0usize;
    loop {
        let candidate = format!("{base_name}{suffix}");
        if !existing.contains_key(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn parse_span(text: &str) -> Result<FeatureSpan, DecodeError> {
    let complement = text.contains("complement");
    let Some(delimiter) = text.find(SPAN_DELIMITER) else {
        return Err(DecodeError::MalformedSpan(text.to_string()));
    };
    let start = trailing_number(&text[..delimiter]);
    let end = leading_number(&text[delimiter + SPAN_DELIMITER.len()..]);
    match (start, end) {
        (Some(start), Some(end)) => Ok(FeatureSpan {
            start,
            end,
            complement,
        }),
        _ => Err(DecodeError::MalformedSpan(text.to_string())),
    }
}

// The digit run immediately before the span delimiter, e.g. the 10 in
// "complement(10".
fn trailing_number(text: &str) -> Option<usize> {
    let digits: Vec<char> = text
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.iter().rev().collect::<String>().parse().ok()
}

// The first digit run after the span delimiter, skipping partial-range
// markers such as '>' in "..>100".
fn leading_number(text: &str) -> Option<usize> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn detect_topology(text: &str) -> Topology {
    let is_circular = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.to_ascii_lowercase().contains("circular"))
        .unwrap_or(false);
    if is_circular {
        Topology::Circular
    } else {
        Topology::Linear
    }
}
