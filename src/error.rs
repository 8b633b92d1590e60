use thiserror::Error;

/// A sequence symbol outside the {A,T,G,C} alphabet.
///
/// `symbol` is the offending character as it appeared in the input, before
/// case normalization; `position` is its 0-based offset in the sequence.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid nucleotide '{symbol}' at position {position}")]
pub struct InvalidNucleotide {
    pub symbol: char,
    pub position: usize,
}

/// Errors surfaced by the plasmid file decoders.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not read plasmid file")]
    Io(#[from] std::io::Error),

    /// Flat text input has no `ORIGIN` marker, so there is no sequence block.
    #[error("no ORIGIN marker found, file has no sequence block")]
    MissingSequence,

    /// The binary sequence block has no end marker, or its payload is not
    /// decodable text.
    #[error("malformed sequence block")]
    MalformedSequenceBlock,

    /// Neither a feature block nor an empty feature tag pair was found.
    #[error("no feature block found")]
    MissingFeatureBlock,

    /// The embedded feature markup is structurally invalid.
    #[error("feature XML could not be parsed: {0}")]
    FeatureXmlParse(String),

    /// A feature span is not a start..end (or start-end) integer range.
    #[error("malformed feature span '{0}'")]
    MalformedSpan(String),

    #[error(transparent)]
    InvalidNucleotide(#[from] InvalidNucleotide),
}

/// Errors surfaced by the melting temperature engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TmError {
    #[error(transparent)]
    InvalidNucleotide(#[from] InvalidNucleotide),

    #[error("unknown melting temperature algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("unknown salt correction equation '{0}'")]
    UnknownSaltCorrection(String),
}
