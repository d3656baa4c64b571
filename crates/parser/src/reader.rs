//! Top-level public API (§6 "Public API surface"): opens a document through
//! the file-format multiplexer, streams the header, builds (or defers) the
//! byte-offset index, and exposes id/index/slice lookups plus metadata
//! accessors. Grounded on the teacher's `utilities/parse_mzml.rs::parse_mzml`
//! entry point, restructured per §9's "capability with two generic type
//! parameters" design note into a locator-keyed lookup shared by spectra and
//! chromatograms.

use std::io::Cursor;
use std::path::Path;

use crate::error::{Error, Result, Warning};
use crate::extract::{self, Subtree};
use crate::header;
use crate::index::{self, Index, OffsetTable};
use crate::model::*;
use crate::options::ReaderOptions;
use crate::source::Source;
use crate::wrapper::{
    DataProcessingView, RunView, SampleView, ScanSettingsView, SoftwareView,
};

/// Which offset table a lookup consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Spectrum,
    Chromatogram,
}

impl ElementKind {
    fn table(self, index: &Index) -> &OffsetTable {
        match self {
            ElementKind::Spectrum => &index.spectra,
            ElementKind::Chromatogram => &index.chromatograms,
        }
    }
}

/// An opened mzML document (§4.G + §6). Owns the multiplexed source, the
/// streamed header, and (when the source supports random access) the
/// byte-offset index built at construction time.
pub struct Reader {
    source: Source,
    header: MzMLHeader,
    index: Option<Index>,
    warnings: Vec<Warning>,
}

impl Reader {
    /// Open `path` with the given options (§6 `open`).
    pub fn open(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Reader> {
        let path = path.as_ref();
        let source = Source::open(path, options.extract_gzip, options.in_memory)?;

        let mut header = {
            let text = source.text_reader()?;
            let mut xml = quick_xml::Reader::from_reader(text);
            xml.config_mut().trim_text(true);
            header::parse_header(&mut xml)?
        };
        header.encoding = source.encoding().to_string();

        let mut warnings = Vec::new();
        let index = if source.supports_random_access() {
            let mut cursor = source.binary_cursor()?;
            Some(index::build(&mut cursor, options.build_index_from_scratch, &mut warnings)?)
        } else {
            None
        };

        Ok(Reader {
            source,
            header,
            index,
            warnings,
        })
    }

    /// Release the underlying file handles, deleting any gzip-extraction
    /// temp file (§5 "Shared resources").
    pub fn close(self) {
        self.source.close();
    }

    /// Warnings raised while building the offset index at construction
    /// time; empty for gzip-streamed sources, which rebuild (and re-log,
    /// per §10.1) their index on every lookup instead of caching one.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// §9 "Gzip streaming vs random access": whether lookups are served
    /// from a cached offset table or require a fresh forward scan.
    pub fn supports_random_access(&self) -> bool {
        self.source.supports_random_access()
    }

    // -- metadata accessors (§6) --------------------------------------

    pub fn id(&self) -> &str {
        &self.header.id
    }

    pub fn version(&self) -> Option<&str> {
        self.header.version.as_deref()
    }

    pub fn encoding(&self) -> &str {
        &self.header.encoding
    }

    pub fn cv_list(&self) -> Option<&CvList> {
        self.header.cv_list.as_ref()
    }

    pub fn file_description(&self) -> &FileDescription {
        &self.header.file_description
    }

    pub fn instrument_configurations(&self) -> &[Instrument] {
        self.header
            .instrument_list
            .as_ref()
            .map(|l| l.instrument.as_slice())
            .unwrap_or(&[])
    }

    pub fn samples(&self) -> Vec<SampleView<'_>> {
        self.header
            .sample_list
            .as_ref()
            .map(|l| l.samples.iter().map(Sample::view).collect())
            .unwrap_or_default()
    }

    pub fn softwares(&self) -> Vec<SoftwareView<'_>> {
        self.header
            .software_list
            .as_ref()
            .map(|l| l.software.iter().map(Software::view).collect())
            .unwrap_or_default()
    }

    pub fn scan_settings(&self) -> Vec<ScanSettingsView<'_>> {
        self.header
            .scan_settings_list
            .as_ref()
            .map(|l| l.scan_settings.iter().map(ScanSettings::view).collect())
            .unwrap_or_default()
    }

    pub fn data_processes(&self) -> Vec<DataProcessingView<'_>> {
        self.header
            .data_processing_list
            .as_ref()
            .map(|l| l.data_processing.iter().map(DataProcessing::view).collect())
            .unwrap_or_default()
    }

    pub fn run(&self) -> Result<RunView<'_>> {
        self.header.run.view()
    }

    // -- counts and ordered ids -----------------------------------------

    /// `None` when the count is unknown (gzip-streamed, no cached index;
    /// §6 "Slice semantics").
    pub fn spectrum_count(&self) -> Option<usize> {
        self.index.as_ref().map(|i| i.spectra.len())
    }

    pub fn chromatogram_count(&self) -> Option<usize> {
        self.index.as_ref().map(|i| i.chromatograms.len())
    }

    /// Native ids in document order (§5 "Ordering guarantees"); `None` when
    /// the index has not been cached (gzip-streamed).
    pub fn spectrum_ids(&self) -> Option<Vec<String>> {
        self.index
            .as_ref()
            .map(|i| i.spectra.ids().map(|s| s.to_string()).collect())
    }

    pub fn chromatogram_ids(&self) -> Option<Vec<String>> {
        self.index
            .as_ref()
            .map(|i| i.chromatograms.ids().map(|s| s.to_string()).collect())
    }

    // -- spectrum lookups -------------------------------------------------

    pub fn spectrum_by_id(&self, id: &str) -> Result<Spectrum> {
        expect_spectrum(self.lookup_by_id(ElementKind::Spectrum, id)?)
    }

    pub fn spectrum_by_index(&self, index: usize) -> Result<Spectrum> {
        expect_spectrum(self.lookup_by_index(ElementKind::Spectrum, index)?)
    }

    pub fn spectra_slice(&self, start: usize, stop: usize) -> Result<Vec<Spectrum>> {
        self.lookup_slice(ElementKind::Spectrum, start, stop)?
            .into_iter()
            .map(expect_spectrum)
            .collect()
    }

    // -- chromatogram lookups ---------------------------------------------

    pub fn chromatogram_by_id(&self, id: &str) -> Result<Chromatogram> {
        expect_chromatogram(self.lookup_by_id(ElementKind::Chromatogram, id)?)
    }

    pub fn chromatogram_by_index(&self, index: usize) -> Result<Chromatogram> {
        expect_chromatogram(self.lookup_by_index(ElementKind::Chromatogram, index)?)
    }

    pub fn chromatograms_slice(&self, start: usize, stop: usize) -> Result<Vec<Chromatogram>> {
        self.lookup_slice(ElementKind::Chromatogram, start, stop)?
            .into_iter()
            .map(expect_chromatogram)
            .collect()
    }

    /// The chromatogram whose id is the literal string `"TIC"`, or `None`
    /// if absent (§6 "Resolved naming note" — exact, case-sensitive match,
    /// no semantic CV-based fallback).
    pub fn tic(&self) -> Result<Option<Chromatogram>> {
        match self.chromatogram_by_id("TIC") {
            Ok(c) => Ok(Some(c)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // -- shared lookup machinery ------------------------------------------

    fn lookup_by_id(&self, kind: ElementKind, id: &str) -> Result<Subtree> {
        if let Some(index) = &self.index {
            let offset = kind
                .table(index)
                .offset_by_id(id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            let mut cursor = self.source.binary_cursor()?;
            extract::extract(&mut cursor, offset)
        } else {
            let (index, bytes) = self.materialize()?;
            let offset = kind
                .table(&index)
                .offset_by_id(id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            let mut cursor = Cursor::new(bytes);
            extract::extract(&mut cursor, offset)
        }
    }

    fn lookup_by_index(&self, kind: ElementKind, position: usize) -> Result<Subtree> {
        if let Some(index) = &self.index {
            let table = kind.table(index);
            let offset = table.offset_by_index(position).ok_or(Error::OutOfRange {
                index: position,
                len: table.len(),
            })?;
            let mut cursor = self.source.binary_cursor()?;
            extract::extract(&mut cursor, offset)
        } else {
            let (index, bytes) = self.materialize()?;
            let table = kind.table(&index);
            let offset = table.offset_by_index(position).ok_or(Error::OutOfRange {
                index: position,
                len: table.len(),
            })?;
            let mut cursor = Cursor::new(bytes);
            extract::extract(&mut cursor, offset)
        }
    }

    /// Half-open `[start, stop)` slice (§6 "Slice semantics"). `stop` is
    /// clamped to the table length; `start` is clamped to `stop`.
    fn lookup_slice(&self, kind: ElementKind, start: usize, stop: usize) -> Result<Vec<Subtree>> {
        if let Some(index) = &self.index {
            let table = kind.table(index);
            let (start, stop) = clamp_range(start, stop, table.len());
            let mut cursor = self.source.binary_cursor()?;
            (start..stop)
                .map(|i| {
                    let offset = table
                        .offset_by_index(i)
                        .ok_or(Error::OutOfRange { index: i, len: table.len() })?;
                    extract::extract(&mut cursor, offset)
                })
                .collect()
        } else {
            let (index, bytes) = self.materialize()?;
            let table = kind.table(&index);
            let (start, stop) = clamp_range(start, stop, table.len());
            let mut cursor = Cursor::new(bytes);
            (start..stop)
                .map(|i| {
                    let offset = table
                        .offset_by_index(i)
                        .ok_or(Error::OutOfRange { index: i, len: table.len() })?;
                    extract::extract(&mut cursor, offset)
                })
                .collect()
        }
    }

    /// Full forward scan for a gzip-streamed source (§4.G item 3, §9 "Gzip
    /// streaming vs random access"): decompress once, build the offset
    /// index from scratch, and hand back both for this call's lookups.
    fn materialize(&self) -> Result<(Index, Vec<u8>)> {
        let bytes = self.source.raw_bytes()?;
        let mut warnings = Vec::new();
        let index = {
            let mut cursor = Cursor::new(&bytes[..]);
            index::build(&mut cursor, true, &mut warnings)?
        };
        Ok((index, bytes))
    }
}

fn clamp_range(start: usize, stop: usize, len: usize) -> (usize, usize) {
    let stop = stop.min(len);
    let start = start.min(stop);
    (start, stop)
}

fn expect_spectrum(subtree: Subtree) -> Result<Spectrum> {
    match subtree {
        Subtree::Spectrum(s) => Ok(s),
        Subtree::Chromatogram(_) => Err(Error::FormatError(
            "spectrum index pointed at a chromatogram".into(),
        )),
    }
}

fn expect_chromatogram(subtree: Subtree) -> Result<Chromatogram> {
    match subtree {
        Subtree::Chromatogram(c) => Ok(c),
        Subtree::Spectrum(_) => Err(Error::FormatError(
            "chromatogram index pointed at a spectrum".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_mzml() -> &'static str {
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<mzML id=\"doc\" version=\"1.1.0\">\n",
            "<run id=\"run1\">\n",
            "<spectrumList count=\"2\">\n",
            "<spectrum id=\"scan=1\" index=\"0\" defaultArrayLength=\"0\"></spectrum>\n",
            "<spectrum id=\"scan=2\" index=\"1\" defaultArrayLength=\"0\"></spectrum>\n",
            "</spectrumList>\n",
            "<chromatogramList count=\"1\">\n",
            "<chromatogram id=\"TIC\" index=\"0\" defaultArrayLength=\"0\"></chromatogram>\n",
            "</chromatogramList>\n",
            "</run>\n",
            "</mzML>\n",
        )
    }

    fn write_bytes(path: &std::path::Path, bytes: &[u8]) {
        std::fs::File::create(path).unwrap().write_all(bytes).unwrap();
    }

    fn write_temp(name: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        write_bytes(&path, sample_mzml().as_bytes());
        path
    }

    #[test]
    fn opens_plain_file_and_resolves_lookups() {
        let path = write_temp("mzreader_reader_test_plain.mzML");
        let reader = Reader::open(&path, ReaderOptions::default()).unwrap();
        assert_eq!(reader.id(), "doc");
        assert_eq!(reader.spectrum_count(), Some(2));
        assert_eq!(reader.chromatogram_count(), Some(1));
        assert_eq!(reader.spectrum_by_id("scan=2").unwrap().id, "scan=2");
        assert_eq!(reader.spectrum_by_index(0).unwrap().id, "scan=1");
        assert_eq!(reader.spectra_slice(0, 2).unwrap().len(), 2);
        assert_eq!(reader.tic().unwrap().unwrap().id, "TIC");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_tic_returns_none() {
        let path = write_temp("mzreader_reader_test_notic.mzML");
        let no_tic = sample_mzml().replace("id=\"TIC\"", "id=\"tic\"");
        write_bytes(&path, no_tic.as_bytes());
        let reader = Reader::open(&path, ReaderOptions::default()).unwrap();
        assert!(reader.tic().unwrap().is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let path = write_temp("mzreader_reader_test_oob.mzML");
        let reader = Reader::open(&path, ReaderOptions::default()).unwrap();
        assert!(matches!(
            reader.spectrum_by_index(99),
            Err(Error::OutOfRange { index: 99, len: 2 })
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn gzip_streamed_lookup_matches_plain_mode_by_index() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let plain_path = write_temp("mzreader_reader_test_gz_plain.mzML");
        let gz_path = std::env::temp_dir().join("mzreader_reader_test.mzML.gz");
        let mut encoder = GzEncoder::new(std::fs::File::create(&gz_path).unwrap(), Compression::default());
        encoder.write_all(sample_mzml().as_bytes()).unwrap();
        encoder.finish().unwrap();

        let plain = Reader::open(&plain_path, ReaderOptions::default()).unwrap();
        let gzip = Reader::open(
            &gz_path,
            ReaderOptions {
                build_index_from_scratch: false,
                extract_gzip: false,
                in_memory: false,
            },
        )
        .unwrap();

        assert!(!gzip.supports_random_access());
        assert_eq!(
            plain.spectrum_by_index(1).unwrap().id,
            gzip.spectrum_by_index(1).unwrap().id
        );

        let _ = std::fs::remove_file(&plain_path);
        let _ = std::fs::remove_file(&gz_path);
    }
}
