//! Closed controlled-vocabulary accession enumerations (§9 "Closed accession
//! enumerations"). Each maps a small set of `MS:NNNNNNN` accession strings to
//! a tagged sum type with an `Other` variant carrying the raw accession, so
//! resolution is always a single match rather than dynamic lookup.

/// Numeric type of a binary data array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    Float32,
    Float64,
    Int32,
    Int64,
}

impl NumericType {
    pub const fn accession(self) -> &'static str {
        match self {
            NumericType::Float32 => "MS:1000521",
            NumericType::Float64 => "MS:1000523",
            NumericType::Int32 => "MS:1000519",
            NumericType::Int64 => "MS:1000522",
        }
    }

    pub fn from_accession(acc: &str) -> Option<Self> {
        match acc {
            "MS:1000521" => Some(NumericType::Float32),
            "MS:1000523" => Some(NumericType::Float64),
            "MS:1000519" => Some(NumericType::Int32),
            "MS:1000522" => Some(NumericType::Int64),
            _ => None,
        }
    }

    pub const fn element_size(self) -> usize {
        match self {
            NumericType::Float32 | NumericType::Int32 => 4,
            NumericType::Float64 | NumericType::Int64 => 8,
        }
    }
}

/// Numeric predictor stage of a compression pipeline (§4.B dispatch table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numpress {
    Linear,
    PositiveInteger,
    ShortLoggedFloat,
}

/// An outer byte-stream compression stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteCompression {
    None,
    Zlib,
    Zstd,
}

/// Resolved compression pipeline for a binary data array, covering every
/// accession in §6's closed compression enumeration. `Rejected` carries the
/// accessions the decoder explicitly refuses (§4.B reject list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain(ByteCompression),
    Numpress(Numpress, ByteCompression),
    /// truncation + zlib: treated as a plain reinterpret pipeline per §4.B.
    TruncationZlib,
    Rejected(RejectedCompression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectedCompression {
    ByteShuffledZstd,
    DictionaryEncodedZstd,
    TruncationLinearPredictionZlib,
    TruncationDeltaPredictionZlib,
}

impl Compression {
    pub const fn accession(self) -> &'static str {
        match self {
            Compression::Plain(ByteCompression::None) => "MS:1000576",
            Compression::Plain(ByteCompression::Zlib) => "MS:1000574",
            Compression::Plain(ByteCompression::Zstd) => "MS:1003780",
            Compression::Numpress(Numpress::Linear, ByteCompression::None) => "MS:1002312",
            Compression::Numpress(Numpress::PositiveInteger, ByteCompression::None) => {
                "MS:1002313"
            }
            Compression::Numpress(Numpress::ShortLoggedFloat, ByteCompression::None) => {
                "MS:1002314"
            }
            Compression::Numpress(Numpress::Linear, ByteCompression::Zlib) => "MS:1002746",
            Compression::Numpress(Numpress::PositiveInteger, ByteCompression::Zlib) => {
                "MS:1002747"
            }
            Compression::Numpress(Numpress::ShortLoggedFloat, ByteCompression::Zlib) => {
                "MS:1002748"
            }
            Compression::Numpress(Numpress::Linear, ByteCompression::Zstd) => "MS:1003783",
            Compression::Numpress(Numpress::PositiveInteger, ByteCompression::Zstd) => {
                "MS:1003784"
            }
            Compression::Numpress(Numpress::ShortLoggedFloat, ByteCompression::Zstd) => {
                "MS:1003785"
            }
            Compression::TruncationZlib => "MS:1003088",
            Compression::Rejected(RejectedCompression::TruncationLinearPredictionZlib) => {
                "MS:1003090"
            }
            Compression::Rejected(RejectedCompression::TruncationDeltaPredictionZlib) => {
                "MS:1003089"
            }
            Compression::Rejected(RejectedCompression::ByteShuffledZstd) => "MS:1003781",
            Compression::Rejected(RejectedCompression::DictionaryEncodedZstd) => "MS:1003782",
        }
    }

    pub fn from_accession(acc: &str) -> Option<Self> {
        use ByteCompression::*;
        use Numpress::*;
        Some(match acc {
            "MS:1000576" => Compression::Plain(None),
            "MS:1000574" => Compression::Plain(Zlib),
            "MS:1003780" => Compression::Plain(Zstd),
            "MS:1002312" => Compression::Numpress(Linear, None),
            "MS:1002313" => Compression::Numpress(PositiveInteger, None),
            "MS:1002314" => Compression::Numpress(ShortLoggedFloat, None),
            "MS:1002746" => Compression::Numpress(Linear, Zlib),
            "MS:1002747" => Compression::Numpress(PositiveInteger, Zlib),
            "MS:1002748" => Compression::Numpress(ShortLoggedFloat, Zlib),
            "MS:1003783" => Compression::Numpress(Linear, Zstd),
            "MS:1003784" => Compression::Numpress(PositiveInteger, Zstd),
            "MS:1003785" => Compression::Numpress(ShortLoggedFloat, Zstd),
            "MS:1003088" => Compression::TruncationZlib,
            "MS:1003090" => {
                Compression::Rejected(RejectedCompression::TruncationLinearPredictionZlib)
            }
            "MS:1003089" => {
                Compression::Rejected(RejectedCompression::TruncationDeltaPredictionZlib)
            }
            "MS:1003781" => Compression::Rejected(RejectedCompression::ByteShuffledZstd),
            "MS:1003782" => Compression::Rejected(RejectedCompression::DictionaryEncodedZstd),
            _ => return None,
        })
    }
}

/// Semantic array type (§3 "Binary data array"), a closed enumeration with
/// an `Other` escape hatch for the long tail of ion-mobility/noise variants
/// listed in §6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticArrayType {
    Mz,
    Intensity,
    Time,
    Other(String),
}

impl SemanticArrayType {
    pub fn from_accession(acc: &str) -> Self {
        match acc {
            "MS:1000514" => SemanticArrayType::Mz,
            "MS:1000515" => SemanticArrayType::Intensity,
            "MS:1000595" => SemanticArrayType::Time,
            other => SemanticArrayType::Other(other.to_string()),
        }
    }

    pub fn accession(&self) -> &str {
        match self {
            SemanticArrayType::Mz => "MS:1000514",
            SemanticArrayType::Intensity => "MS:1000515",
            SemanticArrayType::Time => "MS:1000595",
            SemanticArrayType::Other(a) => a,
        }
    }
}

/// Spectrum representation type (profile vs centroided), resolved from the
/// two closed accessions in §8 scenario 2 (`spectrum_type == "centroid"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumRepresentation {
    Centroid,
    Profile,
}

impl SpectrumRepresentation {
    pub const fn accession(self) -> &'static str {
        match self {
            SpectrumRepresentation::Centroid => "MS:1000127",
            SpectrumRepresentation::Profile => "MS:1000128",
        }
    }

    pub fn from_accession(acc: &str) -> Option<Self> {
        match acc {
            "MS:1000127" => Some(SpectrumRepresentation::Centroid),
            "MS:1000128" => Some(SpectrumRepresentation::Profile),
            _ => None,
        }
    }
}

pub const ACC_MS_LEVEL: &str = "MS:1000511";
pub const ACC_TOTAL_ION_CURRENT: &str = "MS:1000285";
pub const ACC_SCAN_START_TIME: &str = "MS:1000016";
pub const ACC_SCAN_WINDOW_LOWER_LIMIT: &str = "MS:1000501";
pub const ACC_SCAN_WINDOW_UPPER_LIMIT: &str = "MS:1000500";
pub const ACC_ISOLATION_WINDOW_TARGET_MZ: &str = "MS:1000827";
pub const ACC_ISOLATION_WINDOW_LOWER_OFFSET: &str = "MS:1000828";
pub const ACC_ISOLATION_WINDOW_UPPER_OFFSET: &str = "MS:1000829";
pub const ACC_SELECTED_ION_MZ: &str = "MS:1000744";
pub const ACC_PEAK_INTENSITY: &str = "MS:1000042";
pub const ACC_CHARGE_STATE: &str = "MS:1000041";
pub const ACC_COLLISION_ENERGY: &str = "MS:1000045";
pub const ACC_COLLISION_INDUCED_DISSOCIATION: &str = "MS:1000133";
