//! Element wrapper layer (§4.F): thin read-only projections over already
//! captured subtrees. Grounded on the teacher's CV-param accession lookup
//! idiom (`utilities/parse_mzml.rs`'s `has_acc`), generalized here into a
//! by-accession-or-name param-group lookup plus the small set of typed
//! projections §3's "Supplementary wrapper records" names.

use crate::cv::{ByteCompression, Compression, NumericType, SemanticArrayType};
use crate::error::{Error, Result};
use crate::model::*;

/// Find the first `<cvParam>` in `params` whose accession matches `acc`.
pub fn cv_param_by_accession<'a>(params: &'a [CvParam], acc: &str) -> Option<&'a CvParam> {
    params.iter().find(|p| p.accession.as_deref() == Some(acc))
}

/// Find the first `<cvParam>` in `params` whose name matches `name`, for
/// callers that do not know the accession (§4.F).
pub fn cv_param_by_name<'a>(params: &'a [CvParam], name: &str) -> Option<&'a CvParam> {
    params.iter().find(|p| p.name == name)
}

/// Find the first `<userParam>` in `params` whose name matches `name`.
pub fn user_param_by_name<'a>(params: &'a [UserParam], name: &str) -> Option<&'a UserParam> {
    params.iter().find(|p| p.name == name)
}

/// Resolve a binary data array's declared semantic type (m/z, intensity,
/// time, or the long tail), taking the first cvParam whose accession falls
/// in the semantic enumeration (§3 "Binary data array").
pub fn semantic_array_type(array: &BinaryDataArray) -> Option<SemanticArrayType> {
    array
        .cv_params
        .iter()
        .filter_map(|p| p.accession.as_deref())
        .find(|acc| {
            matches!(
                *acc,
                "MS:1000514" | "MS:1000515" | "MS:1000595"
            ) || acc.starts_with("MS:10006") // ion-mobility/noise long tail
        })
        .map(SemanticArrayType::from_accession)
}

/// Find the first binary data array in `list` whose semantic accession
/// equals `acc` (typically m/z, intensity, or time; §4.F "Binary data
/// array list").
pub fn find_array_by_semantic_accession<'a>(
    list: &'a BinaryDataArrayList,
    acc: &str,
) -> Option<&'a BinaryDataArray> {
    list.binary_data_arrays
        .iter()
        .find(|a| cv_param_by_accession(&a.cv_params, acc).is_some())
}

/// Find the first binary data array in `list` whose semantic name equals
/// `name` (for callers that do not know the accession).
pub fn find_array_by_semantic_name<'a>(
    list: &'a BinaryDataArrayList,
    name: &str,
) -> Option<&'a BinaryDataArray> {
    list.binary_data_arrays
        .iter()
        .find(|a| cv_param_by_name(&a.cv_params, name).is_some())
}

/// Resolve the compression CV param attached to `array`, if present.
pub fn resolved_compression(array: &BinaryDataArray) -> Option<Compression> {
    array
        .cv_params
        .iter()
        .filter_map(|p| p.accession.as_deref())
        .find_map(Compression::from_accession)
}

/// Resolve the numeric-type CV param attached to `array`, if present.
pub fn resolved_numeric_type(array: &BinaryDataArray) -> Option<NumericType> {
    array
        .cv_params
        .iter()
        .filter_map(|p| p.accession.as_deref())
        .find_map(NumericType::from_accession)
}

impl Compression {
    /// Whether this pipeline reinterprets raw bytes directly (no numpress
    /// predictor stage).
    pub fn is_raw_reinterpret(self) -> bool {
        matches!(self, Compression::Plain(_) | Compression::TruncationZlib)
    }
}

impl ByteCompression {
    pub fn is_compressed(self) -> bool {
        !matches!(self, ByteCompression::None)
    }
}

/// Thin projection of `<sample>` (§3 "Supplementary wrapper records").
#[derive(Debug, Clone)]
pub struct SampleView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub cv_params: &'a [CvParam],
    pub user_params: &'a [UserParam],
}

impl Sample {
    pub fn view(&self) -> SampleView<'_> {
        SampleView {
            id: &self.id,
            name: &self.name,
            cv_params: &self.cv_params,
            user_params: &self.user_params,
        }
    }
}

/// Thin projection of `<software>`.
#[derive(Debug, Clone)]
pub struct SoftwareView<'a> {
    pub id: &'a str,
    pub version: Option<&'a str>,
    pub cv_params: &'a [CvParam],
}

impl Software {
    pub fn view(&self) -> SoftwareView<'_> {
        SoftwareView {
            id: &self.id,
            version: self.version.as_deref(),
            cv_params: &self.cv_params,
        }
    }
}

/// Thin projection of `<scanSettings>`.
#[derive(Debug, Clone)]
pub struct ScanSettingsView<'a> {
    pub id: &'a str,
    pub cv_params: &'a [CvParam],
    pub source_file_refs: Vec<&'a str>,
    pub targets: &'a [Target],
}

impl ScanSettings {
    pub fn view(&self) -> ScanSettingsView<'_> {
        ScanSettingsView {
            id: &self.id,
            cv_params: &self.cv_params,
            source_file_refs: self
                .source_file_ref_list
                .as_ref()
                .map(|l| l.source_file_refs.iter().map(|r| r.r#ref.as_str()).collect())
                .unwrap_or_default(),
            targets: self
                .target_list
                .as_ref()
                .map(|l| l.targets.as_slice())
                .unwrap_or(&[]),
        }
    }
}

/// Thin projection of `<dataProcessing>`.
#[derive(Debug, Clone)]
pub struct DataProcessingView<'a> {
    pub id: &'a str,
    pub processing_methods: &'a [ProcessingMethod],
}

impl DataProcessing {
    pub fn view(&self) -> DataProcessingView<'_> {
        DataProcessingView {
            id: &self.id,
            processing_methods: &self.processing_methods,
        }
    }
}

/// Thin projection of `<run>`, additionally parsing `start_time_stamp` into
/// a structured ISO-8601 timestamp when present (§3 "Run descriptor").
#[derive(Debug, Clone)]
pub struct RunView<'a> {
    pub id: &'a str,
    pub default_instrument_configuration_ref: Option<&'a str>,
    pub default_source_file_ref: Option<&'a str>,
    pub sample_ref: Option<&'a str>,
    pub start_time_stamp_raw: Option<&'a str>,
    pub start_time_stamp: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl Run {
    pub fn view(&self) -> Result<RunView<'_>> {
        let start_time_stamp = match &self.start_time_stamp {
            Some(raw) => Some(
                chrono::DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| Error::FormatError(format!("invalid run startTimeStamp: {e}")))?,
            ),
            None => None,
        };
        Ok(RunView {
            id: &self.id,
            default_instrument_configuration_ref: self
                .default_instrument_configuration_ref
                .as_deref(),
            default_source_file_ref: self.default_source_file_ref.as_deref(),
            sample_ref: self.sample_ref.as_deref(),
            start_time_stamp_raw: self.start_time_stamp.as_deref(),
            start_time_stamp,
        })
    }
}
