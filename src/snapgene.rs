//! SnapGene-style binary/XML hybrid decoder.
//!
//! The sequence lives in a binary block between a fixed-size header and a
//! three-byte end marker; the annotations live in an embedded `<Features>`
//! XML fragment. The two blocks are located and decoded independently.

use crate::dna_sequence::DnaSequence;
use crate::error::DecodeError;
use crate::plasmid::{Feature, FeatureSpan, ParsedPlasmid, Topology};
use indexmap::IndexMap;
use serde::Deserialize;

const SEQUENCE_HEADER_LEN: usize = 25;
const SEQUENCE_END_MARKER: [u8; 3] = [0x02, 0x00, 0x00];
const FEATURES_OPEN: &[u8] = b"<Features";
const FEATURES_CLOSE: &[u8] = b"</Feature></Features>";
const FEATURES_CLOSE_EMPTY: &[u8] = b"</Features>";

/// Decode SnapGene-style raw file content into a [`ParsedPlasmid`].
///
/// The format carries no topology information here; the result is always
/// linear.
pub fn decode_snapgene(bytes: &[u8]) -> Result<ParsedPlasmid, DecodeError> {
    let sequence = extract_sequence(bytes)?;
    let features = extract_features(bytes)?;
    Ok(ParsedPlasmid::new(sequence, features, Topology::Linear))
}

/// Read `filename` and decode it as a SnapGene-style file.
pub fn decode_snapgene_file(filename: &str) -> Result<ParsedPlasmid, DecodeError> {
    let bytes = std::fs::read(filename)?;
    decode_snapgene(&bytes)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn extract_sequence(bytes: &[u8]) -> Result<DnaSequence, DecodeError> {
    let Some(marker) = find_subslice(bytes, &SEQUENCE_END_MARKER) else {
        return Err(DecodeError::MalformedSequenceBlock);
    };
    if marker < SEQUENCE_HEADER_LEN {
        return Err(DecodeError::MalformedSequenceBlock);
    }
    let payload = &bytes[SEQUENCE_HEADER_LEN..marker];
    let text = std::str::from_utf8(payload).map_err(|_| DecodeError::MalformedSequenceBlock)?;
    Ok(DnaSequence::new(text)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Features")]
struct FeaturesXml {
    #[serde(rename = "Feature", default)]
    features: Vec<FeatureXml>,
}

#[derive(Debug, Deserialize)]
struct FeatureXml {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "Segment", default)]
    segments: Vec<SegmentXml>,
    #[serde(rename = "Q", default)]
    qualifiers: Vec<QualifierXml>,
}

#[derive(Debug, Deserialize)]
struct SegmentXml {
    #[serde(rename = "@range")]
    range: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QualifierXml {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "V", default)]
    values: Vec<ValueXml>,
}

#[derive(Debug, Deserialize)]
struct ValueXml {
    #[serde(rename = "@int")]
    int: Option<i64>,
    #[serde(rename = "@text")]
    text: Option<String>,
}

fn extract_features(bytes: &[u8]) -> Result<IndexMap<String, Feature>, DecodeError> {
    let Some(start) = find_subslice(bytes, FEATURES_OPEN) else {
        return Err(DecodeError::MissingFeatureBlock);
    };
    let block = &bytes[start..];
    // An empty <Features></Features> pair is a valid featureless plasmid.
    let Some(end) = find_subslice(block, FEATURES_CLOSE)
        .map(|index| index + FEATURES_CLOSE.len())
        .or_else(|| {
            find_subslice(block, FEATURES_CLOSE_EMPTY)
                .map(|index| index + FEATURES_CLOSE_EMPTY.len())
        })
    else {
        return Err(DecodeError::MissingFeatureBlock);
    };
    let xml = std::str::from_utf8(&block[..end])
        .map_err(|e| DecodeError::FeatureXmlParse(e.to_string()))?;
    parse_feature_xml(xml)
}

fn parse_feature_xml(xml: &str) -> Result<IndexMap<String, Feature>, DecodeError> {
    let parsed: FeaturesXml =
        quick_xml::de::from_str(xml).map_err(|e| DecodeError::FeatureXmlParse(e.to_string()))?;

    let mut features = IndexMap::new();
    for (index, raw_feature) in parsed.features.iter().enumerate() {
        let label = raw_feature.name.clone().unwrap_or_default();
        // Keys are suffixed with the element's sibling index, unconditionally.
        let key = format!("{label}{index}");

        let span = merge_segments(&raw_feature.segments)?;

        let mut note = String::new();
        for qualifier in &raw_feature.qualifiers {
            let name = qualifier.name.as_deref().unwrap_or_default();
            let value = qualifier_value(qualifier);
            note.push_str(&format!("{name}: {value}; "));
        }

        let mut qualifiers = IndexMap::new();
        qualifiers.insert("label".to_string(), label);
        qualifiers.insert("note".to_string(), note);
        features.insert(key.clone(), Feature::new(key, span, qualifiers));
    }
    Ok(features)
}

// Segments merge into one covering range: minimum start to maximum end.
fn merge_segments(segments: &[SegmentXml]) -> Result<Option<FeatureSpan>, DecodeError> {
    let mut merged: Option<FeatureSpan> = None;
    for segment in segments {
        let range = segment.range.as_deref().unwrap_or_default();
        let (start, end) = parse_segment_range(range)?;
        merged = Some(match merged {
            Some(span) => FeatureSpan {
                start: span.start.min(start),
                end: span.end.max(end),
                complement: false,
            },
            None => FeatureSpan {
                start,
                end,
                complement: false,
            },
        });
    }
    Ok(merged)
}

fn parse_segment_range(range: &str) -> Result<(usize, usize), DecodeError> {
    let Some((raw_start, raw_end)) = range.split_once('-') else {
        return Err(DecodeError::MalformedSpan(range.to_string()));
    };
    match (raw_start.trim().parse(), raw_end.trim().parse()) {
        (Ok(start), Ok(end)) => Ok((start, end)),
        _ => Err(DecodeError::MalformedSpan(range.to_string())),
    }
}

// An integer value wins over a text value; text values may carry embedded
// markup which is reduced to its character content.
fn qualifier_value(qualifier: &QualifierXml) -> String {
    let Some(value) = qualifier.values.first() else {
        return String::new();
    };
    if let Some(int) = value.int {
        return int.to_string();
    }
    strip_markup(value.text.as_deref().unwrap_or_default())
}

fn strip_markup(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => plain.push(ch),
            _ => {}
        }
    }
    plain
}
