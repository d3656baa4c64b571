use std::io::Write;
use std::path::{Path, PathBuf};

use mzreader::codec;
use mzreader::cv::NumericType;
use mzreader::wrapper::{cv_param_by_accession, find_array_by_semantic_accession};
use mzreader::{Error, Reader, ReaderOptions};

fn array_xml(name: &str, accession: &str, values: &[f64]) -> String {
    let bytes = codec::narrow(values, NumericType::Float64);
    let encoded = codec::base64::encode(&bytes);
    format!(
        concat!(
            "<binaryDataArray arrayLength=\"{len}\" encodedLength=\"{enc_len}\">\n",
            "<cvParam cvRef=\"MS\" accession=\"{accession}\" name=\"{name}\"/>\n",
            "<cvParam cvRef=\"MS\" accession=\"MS:1000523\" name=\"64-bit float\"/>\n",
            "<cvParam cvRef=\"MS\" accession=\"MS:1000576\" name=\"no compression\"/>\n",
            "<binary>{encoded}</binary>\n",
            "</binaryDataArray>\n",
        ),
        len = values.len(),
        enc_len = encoded.len(),
        accession = accession,
        name = name,
        encoded = encoded,
    )
}

fn spectrum_0() -> String {
    let mz: Vec<f64> = (0..15).map(|i| 400.0 + i as f64 * 100.0).collect();
    let intensity: Vec<f64> = (0..15).map(|i| 1000.0 + i as f64).collect();

    format!(
        concat!(
            "<spectrum id=\"scan=19\" index=\"0\" defaultArrayLength=\"15\">\n",
            "<cvParam cvRef=\"MS\" accession=\"MS:1000511\" name=\"ms level\" value=\"1\"/>\n",
            "<cvParam cvRef=\"MS\" accession=\"MS:1000127\" name=\"centroid spectrum\"/>\n",
            "<cvParam cvRef=\"MS\" accession=\"MS:1000285\" name=\"total ion current\" value=\"16675500.0\"/>\n",
            "<scanList count=\"1\">\n",
            "<scan>\n",
            "<cvParam cvRef=\"MS\" accession=\"MS:1000016\" name=\"scan start time\" value=\"5.8905\" unitAccession=\"UO:0000031\" unitName=\"minute\"/>\n",
            "<scanWindowList count=\"1\">\n",
            "<scanWindow>\n",
            "<cvParam cvRef=\"MS\" accession=\"MS:1000501\" name=\"scan window lower limit\" value=\"400.0\"/>\n",
            "<cvParam cvRef=\"MS\" accession=\"MS:1000500\" name=\"scan window upper limit\" value=\"1800.0\"/>\n",
            "</scanWindow>\n",
            "</scanWindowList>\n",
            "</scan>\n",
            "</scanList>\n",
            "<binaryDataArrayList count=\"2\">\n",
            "{mz_array}",
            "{intensity_array}",
            "</binaryDataArrayList>\n",
            "</spectrum>\n",
        ),
        mz_array = array_xml("m/z array", "MS:1000514", &mz),
        intensity_array = array_xml("intensity array", "MS:1000515", &intensity),
    )
}

fn spectrum_1() -> String {
    concat!(
        "<spectrum id=\"scan=20\" index=\"1\" defaultArrayLength=\"0\">\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000511\" name=\"ms level\" value=\"2\"/>\n",
        "<precursorList count=\"1\">\n",
        "<precursor spectrumRef=\"scan=19\">\n",
        "<isolationWindow>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000827\" name=\"isolation window target m/z\" value=\"445.3\"/>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000828\" name=\"isolation window lower offset\" value=\"0.5\"/>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000829\" name=\"isolation window upper offset\" value=\"0.5\"/>\n",
        "</isolationWindow>\n",
        "<selectedIonList count=\"1\">\n",
        "<selectedIon>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000744\" name=\"selected ion m/z\" value=\"445.34\"/>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000042\" name=\"peak intensity\" value=\"120053.0\"/>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000041\" name=\"charge state\" value=\"2\"/>\n",
        "</selectedIon>\n",
        "</selectedIonList>\n",
        "<activation>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000045\" name=\"collision energy\" value=\"35.0\"/>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000133\" name=\"collision-induced dissociation\"/>\n",
        "</activation>\n",
        "</precursor>\n",
        "</precursorList>\n",
        "</spectrum>\n",
    )
    .to_string()
}

fn spectrum_2() -> String {
    concat!(
        "<spectrum id=\"scan=21\" index=\"2\" defaultArrayLength=\"0\">\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000511\" name=\"ms level\" value=\"1\"/>\n",
        "<binaryDataArrayList count=\"2\">\n",
        "<binaryDataArray arrayLength=\"0\">\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000514\" name=\"m/z array\"/>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000523\" name=\"64-bit float\"/>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000576\" name=\"no compression\"/>\n",
        "<binary></binary>\n",
        "</binaryDataArray>\n",
        "<binaryDataArray arrayLength=\"0\">\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000515\" name=\"intensity array\"/>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000523\" name=\"64-bit float\"/>\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000576\" name=\"no compression\"/>\n",
        "<binary></binary>\n",
        "</binaryDataArray>\n",
        "</binaryDataArrayList>\n",
        "</spectrum>\n",
    )
    .to_string()
}

fn spectrum_3() -> String {
    concat!(
        "<spectrum id=\"scan=22\" index=\"3\" defaultArrayLength=\"0\">\n",
        "<cvParam cvRef=\"MS\" accession=\"MS:1000511\" name=\"ms level\" value=\"1\"/>\n",
        "</spectrum>\n",
    )
    .to_string()
}

fn chromatogram_tic() -> String {
    let time: Vec<f64> = (0..15).map(|i| i as f64 * 1.2).collect();
    let intensity: Vec<f64> = (0..15).map(|i| 500.0 + i as f64 * 10.0).collect();

    format!(
        concat!(
            "<chromatogram id=\"tic\" index=\"0\" defaultArrayLength=\"15\">\n",
            "<cvParam cvRef=\"MS\" accession=\"MS:1000235\" name=\"total ion current chromatogram\"/>\n",
            "<binaryDataArrayList count=\"2\">\n",
            "{time_array}",
            "{intensity_array}",
            "</binaryDataArrayList>\n",
            "</chromatogram>\n",
        ),
        time_array = array_xml("time array", "MS:1000595", &time),
        intensity_array = array_xml("intensity array", "MS:1000515", &intensity),
    )
}

fn chromatogram_sic() -> String {
    let time: Vec<f64> = (0..5).map(|i| i as f64 * 2.0).collect();
    let intensity: Vec<f64> = (0..5).map(|i| 100.0 + i as f64).collect();

    format!(
        concat!(
            "<chromatogram id=\"sic\" index=\"1\" defaultArrayLength=\"5\">\n",
            "<cvParam cvRef=\"MS\" accession=\"MS:1000627\" name=\"selected ion current chromatogram\"/>\n",
            "<binaryDataArrayList count=\"2\">\n",
            "{time_array}",
            "{intensity_array}",
            "</binaryDataArrayList>\n",
            "</chromatogram>\n",
        ),
        time_array = array_xml("time array", "MS:1000595", &time),
        intensity_array = array_xml("intensity array", "MS:1000515", &intensity),
    )
}

fn document() -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<mzML id=\"example\" version=\"1.1.0\">\n",
            "<run id=\"run1\">\n",
            "<spectrumList count=\"4\">\n",
            "{s0}{s1}{s2}{s3}",
            "</spectrumList>\n",
            "<chromatogramList count=\"2\">\n",
            "{c0}{c1}",
            "</chromatogramList>\n",
            "</run>\n",
            "</mzML>\n",
        ),
        s0 = spectrum_0(),
        s1 = spectrum_1(),
        s2 = spectrum_2(),
        s3 = spectrum_3(),
        c0 = chromatogram_tic(),
        c1 = chromatogram_sic(),
    )
}

fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    std::fs::File::create(&path).unwrap().write_all(bytes).unwrap();
    path
}

fn gzip_temp(name: &str, bytes: &[u8]) -> PathBuf {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let path = std::env::temp_dir().join(name);
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap();
    path
}

fn open_plain(path: &Path) -> Reader {
    Reader::open(path, ReaderOptions::default()).unwrap()
}

#[test]
fn scenario_1_indexed_file_counts_and_chromatogram_lookups() {
    let path = write_temp("mzreader_scn1.mzML", document().as_bytes());
    let reader = open_plain(&path);

    assert_eq!(reader.spectrum_count(), Some(4));
    assert_eq!(reader.chromatogram_count(), Some(2));

    let tic = reader.chromatogram_by_id("tic").unwrap();
    assert_eq!(tic.id, "tic");
    let time_array = find_array_by_semantic_accession(
        tic.binary_data_array_list.as_ref().unwrap(),
        "MS:1000595",
    )
    .unwrap();
    let mut warnings = Vec::new();
    let time = mzreader::binary::decode(time_array, &mut warnings).unwrap();
    assert_eq!(time.len(), 15);

    let by_index = reader.chromatogram_by_index(1).unwrap();
    assert_eq!(by_index.id, "sic");

    // Exact-match "TIC" convenience does not match the lowercase "tic" id.
    assert!(reader.tic().unwrap().is_none());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn scenario_2_spectrum_0_details() {
    let path = write_temp("mzreader_scn2.mzML", document().as_bytes());
    let reader = open_plain(&path);

    let s = reader.spectrum_by_index(0).unwrap();
    assert_eq!(s.id, "scan=19");
    assert_eq!(
        cv_param_by_accession(&s.cv_params, "MS:1000511").unwrap().value.as_deref(),
        Some("1")
    );
    assert!(cv_param_by_accession(&s.cv_params, "MS:1000127").is_some());
    assert_eq!(
        cv_param_by_accession(&s.cv_params, "MS:1000285").unwrap().value.as_deref(),
        Some("16675500.0")
    );

    let scan_list = s.scan_list.as_ref().unwrap();
    assert_eq!(scan_list.scans.len(), 1);
    let scan = &scan_list.scans[0];
    let start_time = cv_param_by_accession(&scan.cv_params, "MS:1000016").unwrap();
    assert_eq!(start_time.value.as_deref(), Some("5.8905"));
    assert_eq!(start_time.unit_name.as_deref(), Some("minute"));

    let windows = &scan.scan_window_list.as_ref().unwrap().scan_windows;
    assert_eq!(windows.len(), 1);
    assert_eq!(
        cv_param_by_accession(&windows[0].cv_params, "MS:1000501").unwrap().value.as_deref(),
        Some("400.0")
    );
    assert_eq!(
        cv_param_by_accession(&windows[0].cv_params, "MS:1000500").unwrap().value.as_deref(),
        Some("1800.0")
    );

    let arrays = s.binary_data_array_list.as_ref().unwrap();
    let mz = find_array_by_semantic_accession(arrays, "MS:1000514").unwrap();
    let intensity = find_array_by_semantic_accession(arrays, "MS:1000515").unwrap();
    let mut warnings = Vec::new();
    assert_eq!(mzreader::binary::decode(mz, &mut warnings).unwrap().len(), 15);
    assert_eq!(mzreader::binary::decode(intensity, &mut warnings).unwrap().len(), 15);
    assert!(warnings.is_empty());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn scenario_3_spectrum_1_precursor_details() {
    let path = write_temp("mzreader_scn3.mzML", document().as_bytes());
    let reader = open_plain(&path);

    let s = reader.spectrum_by_index(1).unwrap();
    assert_eq!(s.id, "scan=20");
    assert_eq!(
        cv_param_by_accession(&s.cv_params, "MS:1000511").unwrap().value.as_deref(),
        Some("2")
    );

    let precursor = &s.precursor_list.as_ref().unwrap().precursors[0];
    assert_eq!(precursor.spectrum_ref.as_deref(), Some("scan=19"));

    let window = precursor.isolation_window.as_ref().unwrap();
    assert_eq!(
        cv_param_by_accession(&window.cv_params, "MS:1000827").unwrap().value.as_deref(),
        Some("445.3")
    );
    assert_eq!(
        cv_param_by_accession(&window.cv_params, "MS:1000828").unwrap().value.as_deref(),
        Some("0.5")
    );
    assert_eq!(
        cv_param_by_accession(&window.cv_params, "MS:1000829").unwrap().value.as_deref(),
        Some("0.5")
    );

    let ion = &precursor.selected_ion_list.as_ref().unwrap().selected_ions[0];
    assert_eq!(
        cv_param_by_accession(&ion.cv_params, "MS:1000744").unwrap().value.as_deref(),
        Some("445.34")
    );
    assert_eq!(
        cv_param_by_accession(&ion.cv_params, "MS:1000042").unwrap().value.as_deref(),
        Some("120053.0")
    );
    assert_eq!(
        cv_param_by_accession(&ion.cv_params, "MS:1000041").unwrap().value.as_deref(),
        Some("2")
    );

    let activation = precursor.activation.as_ref().unwrap();
    assert_eq!(
        cv_param_by_accession(&activation.cv_params, "MS:1000045").unwrap().value.as_deref(),
        Some("35.0")
    );
    assert!(cv_param_by_accession(&activation.cv_params, "MS:1000133").is_some());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn scenario_4_spectrum_2_empty_arrays_warn_without_erroring() {
    let path = write_temp("mzreader_scn4.mzML", document().as_bytes());
    let reader = open_plain(&path);

    let s = reader.spectrum_by_index(2).unwrap();
    assert_eq!(s.default_array_length, Some(0));

    let arrays = s.binary_data_array_list.as_ref().unwrap();
    let mz = find_array_by_semantic_accession(arrays, "MS:1000514").unwrap();
    let mut warnings = Vec::new();
    let values = mzreader::binary::decode(mz, &mut warnings).unwrap();
    assert!(values.is_empty());
    assert_eq!(warnings, vec![mzreader::Warning::EmptyPayload]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn scenario_5_gzipped_document_matches_plain_properties() {
    let gz_path = gzip_temp("mzreader_scn5.mzML.gz", document().as_bytes());

    let reader = Reader::open(
        &gz_path,
        ReaderOptions {
            build_index_from_scratch: false,
            extract_gzip: true,
            in_memory: false,
        },
    )
    .unwrap();

    assert!(reader.supports_random_access());
    assert_eq!(reader.spectrum_count(), Some(4));
    assert_eq!(reader.chromatogram_count(), Some(2));
    assert_eq!(reader.spectrum_by_index(0).unwrap().id, "scan=19");
    assert_eq!(reader.chromatogram_by_index(1).unwrap().id, "sic");

    let _ = std::fs::remove_file(&gz_path);
}

#[test]
fn scenario_6_duplicate_offset_in_embedded_index_is_format_error() {
    let mut data = document();
    let list_off = data.len();
    data.push_str(&format!(
        concat!(
            "<indexList count=\"1\">\n",
            "<index name=\"spectrum\">\n",
            "<offset idRef=\"scan=19\">{off}</offset>\n",
            "<offset idRef=\"scan=20\">{off}</offset>\n",
            "</index>\n",
            "</indexList>\n",
            "<indexListOffset>{list_off}</indexListOffset>\n",
        ),
        off = 10,
        list_off = list_off,
    ));

    let path = write_temp("mzreader_scn6.mzML", data.as_bytes());
    let result = Reader::open(&path, ReaderOptions::default());
    assert!(matches!(result, Err(Error::FormatError(_))));

    let _ = std::fs::remove_file(&path);
}
