//! Byte-offset indexer (§4.C): locates every `<spectrum>`/`<chromatogram>`
//! start tag's byte offset, either by reading the embedded `<indexList>`
//! footer (fast path) or by scanning the whole file (fallback). Grounded on
//! `original_source/src/mzmlpy/file_classes/standardMzml.py`'s
//! `_find_index_offset`/`_parse_index_section`/`_build_index_from_scratch`.

use std::io::{Read, Seek, SeekFrom};

use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::error::{emit, Error, Result, Warning};

const FOOTER_SEARCH_WINDOW: usize = 10 * 1024;
const SCAN_CHUNK_SIZE: usize = 8 * 1024;
const SCAN_LOOKBACK: usize = 100;

static INDEX_LIST_OFFSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<indexListOffset>(?P<offset>[0-9]+)</indexListOffset>").unwrap());
static INDEX_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<index name="([^"]*)">"#).unwrap());
static OFFSET_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<offset idRef="([^"]*)"[^>]*>(\d+)</offset>"#).unwrap());
static INDEX_LIST_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</indexList>").unwrap());

static SPECTRUM_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<\s*spectrum[^>]*id="([^"]*)""#).unwrap());
static SPECTRUM_LIST_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<\s*spectrumList\s*count="([^"]*)""#).unwrap());
static CHROMATOGRAM_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<\s*chromatogram[^>]*id="([^"]*)""#).unwrap());
static CHROMATOGRAM_LIST_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<\s*chromatogramList\s*count="([^"]*)""#).unwrap());

/// Ordered native-id → byte-offset table for one element kind.
#[derive(Debug, Clone, Default)]
pub struct OffsetTable {
    ids: Vec<String>,
    offsets: std::collections::HashMap<String, u64>,
}

impl OffsetTable {
    fn insert(&mut self, id: String, offset: u64) -> Result<()> {
        if self.offsets.contains_key(&id) {
            return Err(Error::FormatError(format!("duplicate native id {id} in index")));
        }
        self.offsets.insert(id.clone(), offset);
        self.ids.push(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn offset_by_id(&self, id: &str) -> Option<u64> {
        self.offsets.get(id).copied()
    }

    pub fn offset_by_index(&self, index: usize) -> Option<u64> {
        self.ids.get(index).and_then(|id| self.offsets.get(id)).copied()
    }

    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(|s| s.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(|s| s.as_str())
    }
}

/// Both offset tables plus the warnings raised while building them.
#[derive(Debug, Default)]
pub struct Index {
    pub spectra: OffsetTable,
    pub chromatograms: OffsetTable,
}

/// Build the index for a seekable source, preferring the embedded
/// `<indexList>` footer unless `force_scratch` is set or no footer is found.
pub fn build<R: Read + Seek>(
    reader: &mut R,
    force_scratch: bool,
    warnings: &mut Vec<Warning>,
) -> Result<Index> {
    if !force_scratch {
        if let Some(offset) = find_index_list_offset(reader)? {
            match parse_index_section(reader, offset) {
                Ok(index) => {
                    validate(&index)?;
                    return Ok(index);
                }
                Err(_) => {
                    log::warn!("failed to parse embedded index at offset {offset}, scanning from scratch");
                }
            }
        }
    }

    let index = build_from_scratch(reader, warnings)?;
    validate(&index)?;
    Ok(index)
}

/// Scan the last [`FOOTER_SEARCH_WINDOW`] bytes of the file for an
/// `<indexListOffset>` element (§4.C fast path).
fn find_index_list_offset<R: Read + Seek>(reader: &mut R) -> Result<Option<u64>> {
    let file_size = reader.seek(SeekFrom::End(0))?;
    let window = FOOTER_SEARCH_WINDOW.min(file_size as usize);
    reader.seek(SeekFrom::Start(file_size - window as u64))?;
    let mut footer = vec![0u8; window];
    reader.read_exact(&mut footer)?;

    Ok(INDEX_LIST_OFFSET
        .captures(&footer)
        .and_then(|caps| std::str::from_utf8(&caps["offset"]).ok()?.parse::<u64>().ok()))
}

fn parse_index_section<R: Read + Seek>(reader: &mut R, index_offset: u64) -> Result<Index> {
    reader.seek(SeekFrom::Start(index_offset))?;
    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;

    let end = INDEX_LIST_CLOSE
        .find(&body)
        .map(|m| m.start())
        .unwrap_or(body.len());
    let body = &body[..end];

    let mut index = Index::default();
    let mut current: Option<String> = None;

    for line in body.split(|&b| b == b'\n') {
        if let Some(caps) = INDEX_NAME.captures(line) {
            current = std::str::from_utf8(&caps[1]).ok().map(|s| s.to_string());
            continue;
        }
        if let (Some(caps), Some(kind)) = (OFFSET_ENTRY.captures(line), current.as_deref()) {
            let id = std::str::from_utf8(&caps[1]).unwrap_or_default().to_string();
            let offset: u64 = std::str::from_utf8(&caps[2])
                .unwrap_or_default()
                .parse()
                .map_err(|_| Error::FormatError("non-numeric offset in index".into()))?;
            match kind {
                "spectrum" => index.spectra.insert(id, offset)?,
                "chromatogram" => index.chromatograms.insert(id, offset)?,
                _ => {}
            }
        }
    }

    Ok(index)
}

/// Whole-file chunked regex scan (§4.C fallback), used when no embedded
/// index is present or `force_scratch` was requested.
fn build_from_scratch<R: Read + Seek>(reader: &mut R, warnings: &mut Vec<Warning>) -> Result<Index> {
    reader.seek(SeekFrom::Start(0))?;

    let mut index = Index::default();
    let mut declared_spectrum_count: Option<usize> = None;
    let mut declared_chromatogram_count: Option<usize> = None;

    // Each window is re-read with a lookback prefix so a tag split across
    // a chunk boundary is still matched whole; offsets already seen in the
    // prefix are skipped via `ids_insert_if_new`.
    let file_size = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let mut pos: u64 = 0;
    let mut read_buf = vec![0u8; SCAN_CHUNK_SIZE];
    while pos < file_size {
        let window_start = pos.saturating_sub(SCAN_LOOKBACK as u64);
        reader.seek(SeekFrom::Start(window_start))?;
        let to_read = (SCAN_CHUNK_SIZE + SCAN_LOOKBACK).min((file_size - window_start) as usize);
        if read_buf.len() < to_read {
            read_buf.resize(to_read, 0);
        }
        reader.read_exact(&mut read_buf[..to_read])?;
        let window = &read_buf[..to_read];

        for caps in SPECTRUM_OPEN.captures_iter(window) {
            let m = caps.get(0).unwrap();
            let id = std::str::from_utf8(&caps[1]).unwrap_or_default().to_string();
            let abs_offset = window_start + m.start() as u64;
            index.spectra.ids_insert_if_new(id, abs_offset)?;
        }
        for caps in CHROMATOGRAM_OPEN.captures_iter(window) {
            let m = caps.get(0).unwrap();
            let id = std::str::from_utf8(&caps[1]).unwrap_or_default().to_string();
            let abs_offset = window_start + m.start() as u64;
            index.chromatograms.ids_insert_if_new(id, abs_offset)?;
        }
        if let Some(caps) = SPECTRUM_LIST_COUNT.captures(window) {
            declared_spectrum_count = std::str::from_utf8(&caps[1]).ok().and_then(|s| s.parse().ok());
        }
        if let Some(caps) = CHROMATOGRAM_LIST_COUNT.captures(window) {
            declared_chromatogram_count =
                std::str::from_utf8(&caps[1]).ok().and_then(|s| s.parse().ok());
        }

        pos += SCAN_CHUNK_SIZE as u64;
    }

    if let Some(declared) = declared_spectrum_count {
        if declared != index.spectra.len() {
            emit(
                warnings,
                Warning::CountMismatch {
                    declared,
                    found: index.spectra.len(),
                },
            );
        }
    }
    if let Some(declared) = declared_chromatogram_count {
        if declared != index.chromatograms.len() {
            emit(
                warnings,
                Warning::CountMismatch {
                    declared,
                    found: index.chromatograms.len(),
                },
            );
        }
    }

    Ok(index)
}

/// I1/I2: no duplicate offsets within a table, none shared between tables.
fn validate(index: &Index) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for &offset in index.spectra.offsets.values() {
        if !seen.insert(offset) {
            return Err(Error::FormatError(format!(
                "duplicate offset {offset} within spectrum index"
            )));
        }
    }
    for &offset in index.chromatograms.offsets.values() {
        if !seen.insert(offset) {
            return Err(Error::FormatError(format!(
                "offset {offset} shared between spectrum and chromatogram indices"
            )));
        }
    }
    Ok(())
}

impl OffsetTable {
    fn ids_insert_if_new(&mut self, id: String, offset: u64) -> Result<()> {
        // A scratch scan re-observes the same id whenever it falls inside
        // the overlap window of two adjacent chunks; keep the first sighting.
        if self.offsets.contains_key(&id) {
            return Ok(());
        }
        self.insert(id, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_mzml() -> Vec<u8> {
        concat!(
            "<mzML>\n",
            "<run>\n",
            "<spectrumList count=\"2\">\n",
            "<spectrum id=\"scan=1\" index=\"0\"></spectrum>\n",
            "<spectrum id=\"scan=2\" index=\"1\"></spectrum>\n",
            "</spectrumList>\n",
            "<chromatogramList count=\"1\">\n",
            "<chromatogram id=\"tic\" index=\"0\"></chromatogram>\n",
            "</chromatogramList>\n",
            "</run>\n",
            "</mzML>\n"
        )
        .as_bytes()
        .to_vec()
    }

    #[test]
    fn build_from_scratch_finds_all_elements() {
        let data = sample_mzml();
        let mut cursor = Cursor::new(data);
        let mut warnings = Vec::new();
        let index = build(&mut cursor, true, &mut warnings).unwrap();
        assert_eq!(index.spectra.len(), 2);
        assert_eq!(index.chromatograms.len(), 1);
        assert!(index.spectra.offset_by_id("scan=1").is_some());
        assert!(index.chromatograms.offset_by_id("tic").is_some());
        assert!(warnings.is_empty());
    }

    #[test]
    fn count_mismatch_is_warned_not_errored() {
        let mut data = sample_mzml();
        let text = String::from_utf8(data).unwrap().replace(
            "<spectrumList count=\"2\">",
            "<spectrumList count=\"5\">",
        );
        data = text.into_bytes();
        let mut cursor = Cursor::new(data);
        let mut warnings = Vec::new();
        let index = build(&mut cursor, true, &mut warnings).unwrap();
        assert_eq!(index.spectra.len(), 2);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::CountMismatch { declared: 5, found: 2 })));
    }

    #[test]
    fn fast_path_reads_embedded_index_list() {
        let mut data = b"<mzML><run><spectrum id=\"scan=1\"></spectrum></run>".to_vec();
        let index_offset = data.len() as u64;
        data.extend_from_slice(
            concat!(
                "<indexList count=\"1\">",
                "<index name=\"spectrum\">",
                "<offset idRef=\"scan=1\">12</offset>",
                "</index>",
                "</indexList>",
                "<indexListOffset>",
            )
            .as_bytes(),
        );
        data.extend_from_slice(index_offset.to_string().as_bytes());
        data.extend_from_slice(b"</indexListOffset></mzML>");

        let mut cursor = Cursor::new(data);
        let mut warnings = Vec::new();
        let index = build(&mut cursor, false, &mut warnings).unwrap();
        assert_eq!(index.spectra.offset_by_id("scan=1"), Some(12));
    }
}
