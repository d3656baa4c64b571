//! Subtree extractor (§4.D): given a byte offset for a `<spectrum>` or
//! `<chromatogram>` start tag, reads forward to the matching close tag,
//! then parses the standalone fragment into the root element. Grounded on
//! `original_source/src/mzmlpy/file_classes/standardMzml.py`'s
//! `_read_to_spec_end`/`_read_until_tag_end` for the byte-range search, and
//! on the teacher's `utilities/parse_mzml.rs` spectrum/chromatogram parse
//! functions for the XML-to-struct shape.

use std::io::{Read, Seek, SeekFrom};

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::bytes::Regex;

use crate::error::{Error, Result};
use crate::model::*;
use crate::xml::*;

const CHUNK_SIZE: usize = 4096;
const MAX_TAG_BOUNDARY_LOOKAHEAD: usize = 12;

static SPECTRUM_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</spectrum>").unwrap());
static CHROMATOGRAM_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</chromatogram>").unwrap());

/// A parsed root element returned by [`extract`].
#[derive(Debug, Clone)]
pub enum Subtree {
    Spectrum(Spectrum),
    Chromatogram(Chromatogram),
}

/// Seek to `offset`, read forward to the matching close tag, and parse the
/// fragment into its root element.
pub fn extract<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Subtree> {
    let fragment = extract_fragment(reader, offset)?;
    let trimmed = fragment.trim_start();
    if trimmed.starts_with("<spectrum") {
        Ok(Subtree::Spectrum(parse_spectrum_fragment(&fragment)?))
    } else if trimmed.starts_with("<chromatogram") {
        Ok(Subtree::Chromatogram(parse_chromatogram_fragment(&fragment)?))
    } else {
        Err(Error::FormatError(format!(
            "fragment at offset {offset} is neither a spectrum nor a chromatogram"
        )))
    }
}

/// Read the fragment starting at `offset` up to and including its closing
/// `</spectrum>` or `</chromatogram>` tag, whichever is found first.
fn extract_fragment<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<String> {
    reader.seek(SeekFrom::Start(offset))?;

    let mut data = Vec::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut end: Option<usize> = None;

    loop {
        let read = reader.read(&mut buf)?;
        data.extend_from_slice(&buf[..read]);

        if read < CHUNK_SIZE {
            if end.is_none() {
                end = find_close(&data);
            }
            break;
        }

        if let Some(pos) = find_close(&data) {
            end = Some(pos);
            break;
        }

        // The close tag may straddle the next chunk boundary; nudge the
        // cursor forward byte-by-byte until a tag boundary is crossed so
        // the following read starts cleanly.
        extend_to_tag_boundary(reader, &mut data)?;
        if let Some(pos) = find_close(&data) {
            end = Some(pos);
            break;
        }
    }

    let end = end.ok_or_else(|| {
        Error::FormatError(format!(
            "could not find closing </spectrum> or </chromatogram> after offset {offset}"
        ))
    })?;

    String::from_utf8(data[..end].to_vec())
        .map_err(|e| Error::FormatError(format!("extracted subtree is not valid UTF-8: {e}")))
}

fn find_close(data: &[u8]) -> Option<usize> {
    let spectrum = SPECTRUM_CLOSE.find(data).map(|m| m.end());
    let chromatogram = CHROMATOGRAM_CLOSE.find(data).map(|m| m.end());
    match (spectrum, chromatogram) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Read up to [`MAX_TAG_BOUNDARY_LOOKAHEAD`] extra bytes, stopping as soon
/// as a `<`, `>`, or space is seen, so chunk boundaries never split a tag.
fn extend_to_tag_boundary<R: Read>(reader: &mut R, data: &mut Vec<u8>) -> Result<()> {
    let mut count = 0;
    let mut byte = [0u8; 1];
    loop {
        if count >= MAX_TAG_BOUNDARY_LOOKAHEAD {
            break;
        }
        let read = reader.read(&mut byte)?;
        if read == 0 {
            break;
        }
        data.push(byte[0]);
        count += 1;
        if matches!(byte[0], b'<' | b'>' | b' ') {
            break;
        }
    }
    Ok(())
}

pub fn parse_spectrum_fragment(fragment: &str) -> Result<Spectrum> {
    let mut reader = Reader::from_str(fragment);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::with_capacity(1024);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"spectrum" => {
                return parse_spectrum(&mut reader, &e.to_owned())
            }
            Event::Eof => {
                return Err(Error::FormatError("fragment has no <spectrum> root".into()))
            }
            _ => {}
        }
        buf.clear();
    }
}

pub fn parse_chromatogram_fragment(fragment: &str) -> Result<Chromatogram> {
    let mut reader = Reader::from_str(fragment);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::with_capacity(1024);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"chromatogram" => {
                return parse_chromatogram(&mut reader, &e.to_owned())
            }
            Event::Eof => {
                return Err(Error::FormatError(
                    "fragment has no <chromatogram> root".into(),
                ))
            }
            _ => {}
        }
        buf.clear();
    }
}

fn parse_spectrum<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<Spectrum> {
    let mut s = Spectrum {
        id: get_attr(start, b"id").unwrap_or_default(),
        index: get_attr_u32(start, b"index"),
        default_array_length: get_attr_usize(start, b"defaultArrayLength"),
        data_processing_ref: get_attr(start, b"dataProcessingRef"),
        source_file_ref: get_attr(start, b"sourceFileRef"),
        spot_id: get_attr(start, b"spotID"),
        ..Default::default()
    };

    let mut buf = Vec::with_capacity(1024);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(
                    &e,
                    &mut s.referenceable_param_group_refs,
                    &mut s.cv_params,
                    &mut s.user_params,
                );
            }
            Event::Start(e) => {
                if !push_params_start(
                    reader,
                    &e,
                    &mut s.referenceable_param_group_refs,
                    &mut s.cv_params,
                    &mut s.user_params,
                )? {
                    match local_name(e.name().as_ref()) {
                        b"scanList" => s.scan_list = Some(parse_scan_list(reader, &e)?),
                        b"precursorList" => {
                            s.precursor_list = Some(parse_precursor_list(reader, &e)?)
                        }
                        b"productList" => s.product_list = Some(parse_product_list(reader, &e)?),
                        b"binaryDataArrayList" => {
                            s.binary_data_array_list =
                                Some(parse_binary_data_array_list(reader, &e)?)
                        }
                        _ => skip_element(reader, e.name().as_ref())?,
                    }
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"spectrum" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(s)
}

fn parse_scan_list<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<ScanList> {
    let mut list = ScanList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut Vec::new(), &mut list.cv_params, &mut Vec::new());
            }
            Event::Start(e) => {
                if local_name(e.name().as_ref()) == b"scan" {
                    list.scans.push(parse_scan(reader, &e)?);
                } else if !push_params_start(reader, &e, &mut Vec::new(), &mut list.cv_params, &mut Vec::new())? {
                    skip_element(reader, e.name().as_ref())?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"scanList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_scan<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<Scan> {
    let mut s = Scan {
        instrument_configuration_ref: get_attr(start, b"instrumentConfigurationRef"),
        source_file_ref: get_attr(start, b"sourceFileRef"),
        spectrum_ref: get_attr(start, b"spectrumRef"),
        external_spectrum_id: get_attr(start, b"externalSpectrumID"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut s.referenceable_param_group_refs, &mut s.cv_params, &mut s.user_params);
            }
            Event::Start(e) => {
                if !push_params_start(reader, &e, &mut s.referenceable_param_group_refs, &mut s.cv_params, &mut s.user_params)? {
                    if local_name(e.name().as_ref()) == b"scanWindowList" {
                        s.scan_window_list = Some(parse_scan_window_list(reader, &e)?);
                    } else {
                        skip_element(reader, e.name().as_ref())?;
                    }
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"scan" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(s)
}

fn parse_scan_window_list<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<ScanWindowList> {
    let mut list = ScanWindowList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"scanWindow" => {
                let mut w = ScanWindow::default();
                let mut inner = Vec::with_capacity(256);
                loop {
                    match reader.read_event_into(&mut inner)? {
                        Event::Empty(ie) => {
                            push_params_empty(&ie, &mut Vec::new(), &mut w.cv_params, &mut Vec::new());
                        }
                        Event::Start(ie) => {
                            if !push_params_start(reader, &ie, &mut Vec::new(), &mut w.cv_params, &mut Vec::new())? {
                                skip_element(reader, ie.name().as_ref())?;
                            }
                        }
                        Event::End(ie) if local_name(ie.name().as_ref()) == b"scanWindow" => break,
                        Event::Eof => break,
                        _ => {}
                    }
                    inner.clear();
                }
                list.scan_windows.push(w);
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"scanWindowList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_precursor_list<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<PrecursorList> {
    let mut list = PrecursorList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"precursor" => {
                list.precursors.push(parse_precursor(reader, &e)?);
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"precursorList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_precursor<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<Precursor> {
    let mut p = Precursor {
        spectrum_ref: get_attr(start, b"spectrumRef"),
        source_file_ref: get_attr(start, b"sourceFileRef"),
        external_spectrum_id: get_attr(start, b"externalSpectrumID"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"isolationWindow" => p.isolation_window = Some(parse_isolation_window(reader, &e)?),
                b"selectedIonList" => p.selected_ion_list = Some(parse_selected_ion_list(reader, &e)?),
                b"activation" => p.activation = Some(parse_activation(reader, &e)?),
                _ => skip_element(reader, e.name().as_ref())?,
            },
            Event::End(e) if local_name(e.name().as_ref()) == b"precursor" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(p)
}

fn parse_isolation_window<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    _start: &quick_xml::events::BytesStart,
) -> Result<IsolationWindow> {
    let mut w = IsolationWindow::default();
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut Vec::new(), &mut w.cv_params, &mut Vec::new());
            }
            Event::Start(e) => {
                if !push_params_start(reader, &e, &mut Vec::new(), &mut w.cv_params, &mut Vec::new())? {
                    skip_element(reader, e.name().as_ref())?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"isolationWindow" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(w)
}

fn parse_selected_ion_list<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<SelectedIonList> {
    let mut list = SelectedIonList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"selectedIon" => {
                let mut ion = SelectedIon::default();
                let mut inner = Vec::with_capacity(256);
                loop {
                    match reader.read_event_into(&mut inner)? {
                        Event::Empty(ie) => {
                            push_params_empty(&ie, &mut Vec::new(), &mut ion.cv_params, &mut Vec::new());
                        }
                        Event::Start(ie) => {
                            if !push_params_start(reader, &ie, &mut Vec::new(), &mut ion.cv_params, &mut Vec::new())? {
                                skip_element(reader, ie.name().as_ref())?;
                            }
                        }
                        Event::End(ie) if local_name(ie.name().as_ref()) == b"selectedIon" => break,
                        Event::Eof => break,
                        _ => {}
                    }
                    inner.clear();
                }
                list.selected_ions.push(ion);
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"selectedIonList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_activation<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    _start: &quick_xml::events::BytesStart,
) -> Result<Activation> {
    let mut a = Activation::default();
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut Vec::new(), &mut a.cv_params, &mut Vec::new());
            }
            Event::Start(e) => {
                if !push_params_start(reader, &e, &mut Vec::new(), &mut a.cv_params, &mut Vec::new())? {
                    skip_element(reader, e.name().as_ref())?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"activation" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(a)
}

fn parse_product_list<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<ProductList> {
    let mut list = ProductList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"product" => {
                let mut p = Product::default();
                let mut inner = Vec::with_capacity(256);
                loop {
                    match reader.read_event_into(&mut inner)? {
                        Event::Start(ie) if local_name(ie.name().as_ref()) == b"isolationWindow" => {
                            p.isolation_window = Some(parse_isolation_window(reader, &ie)?);
                        }
                        Event::Start(ie) => skip_element(reader, ie.name().as_ref())?,
                        Event::End(ie) if local_name(ie.name().as_ref()) == b"product" => break,
                        Event::Eof => break,
                        _ => {}
                    }
                    inner.clear();
                }
                list.products.push(p);
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"productList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_binary_data_array_list<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<BinaryDataArrayList> {
    let mut list = BinaryDataArrayList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(1024);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"binaryDataArray" => {
                list.binary_data_arrays.push(parse_binary_data_array(reader, &e)?);
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"binaryDataArrayList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_binary_data_array<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<BinaryDataArray> {
    let mut a = BinaryDataArray {
        array_length: get_attr_usize(start, b"arrayLength"),
        encoded_length: get_attr_usize(start, b"encodedLength"),
        data_processing_ref: get_attr(start, b"dataProcessingRef"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(1024);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut a.referenceable_param_group_refs, &mut a.cv_params, &mut a.user_params);
            }
            Event::Start(e) => {
                if !push_params_start(reader, &e, &mut a.referenceable_param_group_refs, &mut a.cv_params, &mut a.user_params)? {
                    if local_name(e.name().as_ref()) == b"binary" {
                        a.binary = read_text_content(reader, e.name().as_ref())?;
                    } else {
                        skip_element(reader, e.name().as_ref())?;
                    }
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"binaryDataArray" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(a)
}

fn parse_chromatogram<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<Chromatogram> {
    let mut c = Chromatogram {
        id: get_attr(start, b"id").unwrap_or_default(),
        index: get_attr_u32(start, b"index"),
        default_array_length: get_attr_usize(start, b"defaultArrayLength"),
        data_processing_ref: get_attr(start, b"dataProcessingRef"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(1024);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut c.referenceable_param_group_refs, &mut c.cv_params, &mut c.user_params);
            }
            Event::Start(e) => {
                if !push_params_start(reader, &e, &mut c.referenceable_param_group_refs, &mut c.cv_params, &mut c.user_params)? {
                    match local_name(e.name().as_ref()) {
                        b"precursor" => c.precursor = Some(parse_precursor(reader, &e)?),
                        b"product" => {
                            let mut p = Product::default();
                            let mut inner = Vec::with_capacity(256);
                            loop {
                                match reader.read_event_into(&mut inner)? {
                                    Event::Start(ie) if local_name(ie.name().as_ref()) == b"isolationWindow" => {
                                        p.isolation_window = Some(parse_isolation_window(reader, &ie)?);
                                    }
                                    Event::Start(ie) => skip_element(reader, ie.name().as_ref())?,
                                    Event::End(ie) if local_name(ie.name().as_ref()) == b"product" => break,
                                    Event::Eof => break,
                                    _ => {}
                                }
                                inner.clear();
                            }
                            c.product = Some(p);
                        }
                        b"binaryDataArrayList" => {
                            c.binary_data_array_list = Some(parse_binary_data_array_list(reader, &e)?)
                        }
                        _ => skip_element(reader, e.name().as_ref())?,
                    }
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"chromatogram" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn extracts_and_parses_spectrum_subtree() {
        let data = concat!(
            "preamble<spectrum id=\"scan=1\" index=\"0\" defaultArrayLength=\"2\">",
            "<cvParam accession=\"MS:1000511\" name=\"ms level\" value=\"1\"/>",
            "<scanList count=\"1\"><scan><cvParam accession=\"MS:1000016\" name=\"scan start time\" value=\"1.0\"/></scan></scanList>",
            "</spectrum><next/>"
        );
        let mut cursor = Cursor::new(data.as_bytes().to_vec());
        let subtree = extract(&mut cursor, 8).unwrap();
        match subtree {
            Subtree::Spectrum(s) => {
                assert_eq!(s.id, "scan=1");
                assert_eq!(s.index, Some(0));
                assert_eq!(s.default_array_length, Some(2));
                assert_eq!(s.cv_params.len(), 1);
                assert!(s.scan_list.is_some());
            }
            Subtree::Chromatogram(_) => panic!("expected spectrum"),
        }
    }

    #[test]
    fn extracts_and_parses_chromatogram_subtree() {
        let data = "<chromatogram id=\"tic\" index=\"0\"><cvParam accession=\"MS:1000285\" name=\"total ion current\" value=\"16675500.0\"/></chromatogram>";
        let mut cursor = Cursor::new(data.as_bytes().to_vec());
        let subtree = extract(&mut cursor, 0).unwrap();
        match subtree {
            Subtree::Chromatogram(c) => {
                assert_eq!(c.id, "tic");
                assert_eq!(c.cv_params.len(), 1);
            }
            Subtree::Spectrum(_) => panic!("expected chromatogram"),
        }
    }

    #[test]
    fn missing_close_tag_is_format_error() {
        let data = b"<spectrum id=\"s\">no closing tag here".to_vec();
        let mut cursor = Cursor::new(data);
        assert!(matches!(extract(&mut cursor, 0), Err(Error::FormatError(_))));
    }
}
