//! Error taxonomy (§7) and the non-fatal, observable `Warning` kind.

use thiserror::Error;

/// One variant per fatal error kind in §7. `Warning` is deliberately not a
/// variant here — see the module doc and §7 "Representation".
#[derive(Debug, Error)]
pub enum Error {
    #[error("identifier or index not found: {0}")]
    NotFound(String),

    #[error("index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("malformed mzML: {0}")]
    FormatError(String),

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("codec error: {0}")]
    CodecError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("xml attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal, observable events (§7 "Warning"). Returned alongside
/// successful results and also emitted through [`log`] at the point raised
/// (§10.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Compression accession was absent; "no compression" was assumed.
    MissingCompression,
    /// Numeric-type accession was absent; 64-bit float was assumed.
    MissingNumericType,
    /// The base64 payload was empty; decode produced an empty sequence.
    EmptyPayload,
    /// Declared count (e.g. `spectrumList count="..."`) did not match the
    /// number of elements actually found while indexing.
    CountMismatch { declared: usize, found: usize },
    /// An integer attribute (e.g. `defaultArrayLength`) failed to parse and
    /// was treated as absent.
    InvalidIntegerAttribute { attribute: String, raw: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MissingCompression => {
                write!(f, "missing compression accession, defaulting to none")
            }
            Warning::MissingNumericType => {
                write!(f, "missing numeric-type accession, defaulting to 64-bit float")
            }
            Warning::EmptyPayload => write!(f, "empty binary payload"),
            Warning::CountMismatch { declared, found } => write!(
                f,
                "declared count {declared} does not match found count {found}"
            ),
            Warning::InvalidIntegerAttribute { attribute, raw } => write!(
                f,
                "invalid integer attribute {attribute}=\"{raw}\", treated as absent"
            ),
        }
    }
}

/// Emit a warning through both the returned-value channel and the log
/// facade, per §7's "Representation" note.
pub fn emit(warnings: &mut Vec<Warning>, warning: Warning) {
    log::warn!("{warning}");
    warnings.push(warning);
}
