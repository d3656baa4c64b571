//! Shared quick-xml event-parsing helpers used by the header streaming
//! parser (§4.E) and the subtree extractor (§4.D). Grounded on the
//! teacher's `utilities/parse_mzml.rs` attribute/skip/param idioms.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

use crate::error::{Error, Result};
use crate::model::{CvParam, ReferenceableParamGroupRef, UserParam};

pub fn get_attr(start: &BytesStart, name: &[u8]) -> Option<String> {
    start
        .attributes()
        .with_checks(false)
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}

pub fn get_attr_usize(start: &BytesStart, name: &[u8]) -> Option<usize> {
    get_attr(start, name).and_then(|s| s.parse().ok())
}

pub fn get_attr_u32(start: &BytesStart, name: &[u8]) -> Option<u32> {
    get_attr(start, name).and_then(|s| s.parse().ok())
}

/// Strip an XML namespace prefix (`ns:local` or `{uri}local`) down to the
/// local tag name, since the teacher's mzML producers are inconsistent
/// about prefixing.
pub fn local_name(mut raw: &[u8]) -> &[u8] {
    if raw.first() == Some(&b'{') {
        if let Some(end) = raw.iter().position(|&b| b == b'}') {
            raw = &raw[end + 1..];
        }
    }
    if let Some(colon) = raw.iter().rposition(|&b| b == b':') {
        &raw[colon + 1..]
    } else {
        raw
    }
}

pub fn parse_referenceable_param_group_ref(start: &BytesStart) -> ReferenceableParamGroupRef {
    ReferenceableParamGroupRef {
        r#ref: get_attr(start, b"ref").unwrap_or_default(),
    }
}

pub fn parse_cv_param(start: &BytesStart) -> CvParam {
    CvParam {
        cv_ref: get_attr(start, b"cvRef"),
        accession: get_attr(start, b"accession"),
        name: get_attr(start, b"name").unwrap_or_default(),
        value: get_attr(start, b"value"),
        unit_cv_ref: get_attr(start, b"unitCvRef"),
        unit_name: get_attr(start, b"unitName"),
        unit_accession: get_attr(start, b"unitAccession"),
    }
}

pub fn parse_user_param(start: &BytesStart) -> UserParam {
    UserParam {
        name: get_attr(start, b"name").unwrap_or_default(),
        r#type: get_attr(start, b"type"),
        unit_accession: get_attr(start, b"unitAccession"),
        unit_cv_ref: get_attr(start, b"unitCvRef"),
        unit_name: get_attr(start, b"unitName"),
        value: get_attr(start, b"value"),
    }
}

/// Consume and discard a whole element (any nested children), leaving the
/// reader positioned just after its matching end tag.
pub fn skip_element<R: BufRead>(reader: &mut Reader<R>, end: &[u8]) -> Result<()> {
    let mut depth = 1usize;
    let mut buf = Vec::with_capacity(256);
    while depth != 0 {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                if depth == 1 && e.name().as_ref() == end {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

/// Collect the text content of an element up to its matching end tag.
pub fn read_text_content<R: BufRead>(reader: &mut Reader<R>, end: &[u8]) -> Result<String> {
    let mut buf = Vec::with_capacity(512);
    let mut out = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(t) => out.push_str(&t.unescape()?),
            Event::CData(t) => out.push_str(&String::from_utf8_lossy(&t.into_inner())),
            Event::End(e) if e.name().as_ref() == end => break,
            Event::Eof => {
                return Err(Error::FormatError(format!(
                    "unexpected end of document while reading text of <{}>",
                    String::from_utf8_lossy(end)
                )))
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

/// Try to route a `cvParam`/`userParam`/`referenceableParamGroupRef` start
/// event into the three shared collections; returns `false` if `e` was none
/// of those, leaving the event unhandled for the caller to dispatch further.
pub fn push_params_start<R: BufRead>(
    reader: &mut Reader<R>,
    e: &BytesStart,
    refs: &mut Vec<ReferenceableParamGroupRef>,
    cv_params: &mut Vec<CvParam>,
    user_params: &mut Vec<UserParam>,
) -> Result<bool> {
    match local_name(e.name().as_ref()) {
        b"referenceableParamGroupRef" => {
            refs.push(parse_referenceable_param_group_ref(e));
            skip_element(reader, e.name().as_ref())?;
            Ok(true)
        }
        b"cvParam" => {
            cv_params.push(parse_cv_param(e));
            skip_element(reader, e.name().as_ref())?;
            Ok(true)
        }
        b"userParam" => {
            user_params.push(parse_user_param(e));
            skip_element(reader, e.name().as_ref())?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// `Empty`-event counterpart of [`push_params_start`].
pub fn push_params_empty(
    e: &BytesStart,
    refs: &mut Vec<ReferenceableParamGroupRef>,
    cv_params: &mut Vec<CvParam>,
    user_params: &mut Vec<UserParam>,
) -> bool {
    match local_name(e.name().as_ref()) {
        b"referenceableParamGroupRef" => {
            refs.push(parse_referenceable_param_group_ref(e));
            true
        }
        b"cvParam" => {
            cv_params.push(parse_cv_param(e));
            true
        }
        b"userParam" => {
            user_params.push(parse_user_param(e));
            true
        }
        _ => false,
    }
}
