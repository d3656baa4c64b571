//! Header streaming parser (§4.E): consumes `<mzML>` prolog elements up to
//! the `<run>` start event, then terminates so bulk spectrum/chromatogram
//! data is never realized. Grounded on the teacher's
//! `utilities/parse_mzml.rs` list-of-subtree parsers (`parse_cv_list`,
//! `parse_file_description`, `parse_sample_list`, `parse_instrument_list`,
//! `parse_software_list`, `parse_data_processing_list`,
//! `parse_scan_settings_list`, `parse_referenceable_param_group_list`),
//! reused near-verbatim against this crate's own `model.rs` shapes.

use std::io::BufRead;

use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::error::Result;
use crate::model::*;
use crate::xml::*;

static SCHEMA_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+\.\d+\.\d+)").unwrap());

/// Parse the `<mzML>` prolog from `reader`, stopping at the `<run>` start
/// tag. The reader is left positioned just after that start event.
pub fn parse_header<R: BufRead>(reader: &mut Reader<R>) -> Result<MzMLHeader> {
    let mut header = MzMLHeader::default();
    let mut buf = Vec::with_capacity(1024);

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                match local_name(e.name().as_ref()) {
                    b"mzML" => {
                        header.id = get_attr(&e, b"id").unwrap_or_default();
                        header.version = get_attr(&e, b"version").or_else(|| {
                            get_attr(&e, b"xsi:schemaLocation")
                                .as_deref()
                                .and_then(|loc| SCHEMA_VERSION.find(loc))
                                .map(|m| m.as_str().to_string())
                        });
                    }
                    b"cvList" => header.cv_list = Some(parse_cv_list(reader, &e)?),
                    b"fileDescription" => {
                        header.file_description = parse_file_description(reader, &e)?
                    }
                    b"referenceableParamGroupList" => {
                        header.referenceable_param_group_list =
                            Some(parse_referenceable_param_group_list(reader, &e)?)
                    }
                    b"sampleList" => header.sample_list = Some(parse_sample_list(reader, &e)?),
                    b"instrumentConfigurationList" => {
                        header.instrument_list = Some(parse_instrument_list(reader, &e)?)
                    }
                    b"softwareList" => header.software_list = Some(parse_software_list(reader, &e)?),
                    b"dataProcessingList" => {
                        header.data_processing_list = Some(parse_data_processing_list(reader, &e)?)
                    }
                    b"scanSettingsList" => {
                        header.scan_settings_list = Some(parse_scan_settings_list(reader, &e)?)
                    }
                    b"run" => {
                        header.run = Run {
                            id: get_attr(&e, b"id").unwrap_or_default(),
                            start_time_stamp: get_attr(&e, b"startTimeStamp"),
                            default_instrument_configuration_ref: get_attr(
                                &e,
                                b"defaultInstrumentConfigurationRef",
                            ),
                            default_source_file_ref: get_attr(&e, b"defaultSourceFileRef"),
                            sample_ref: get_attr(&e, b"sampleRef"),
                        };
                        return Ok(header);
                    }
                    _ => {}
                }
            }
            Event::Eof => {
                return Err(crate::error::Error::FormatError(
                    "reached end of document without finding a <run> element".into(),
                ))
            }
            _ => {}
        }
        buf.clear();
    }
}

fn parse_cv_list<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<CvList> {
    let mut list = CvList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) if local_name(e.name().as_ref()) == b"cv" => {
                list.cv.push(parse_cv_tag(&e));
            }
            Event::Start(e) if local_name(e.name().as_ref()) == b"cv" => {
                list.cv.push(parse_cv_tag(&e));
                skip_element(reader, e.name().as_ref())?;
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if local_name(e.name().as_ref()) == b"cvList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_cv_tag(start: &BytesStart) -> Cv {
    Cv {
        id: get_attr(start, b"id").unwrap_or_default(),
        full_name: get_attr(start, b"fullName"),
        version: get_attr(start, b"version"),
        uri: get_attr(start, b"URI"),
    }
}

fn parse_file_description<R: BufRead>(
    reader: &mut Reader<R>,
    _start: &BytesStart,
) -> Result<FileDescription> {
    let mut fd = FileDescription::default();
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"fileContent" => fd.file_content = parse_file_content(reader, &e)?,
                b"sourceFileList" => fd.source_file_list = parse_source_file_list(reader, &e)?,
                b"contact" => fd.contacts.push(parse_contact(reader, &e)?),
                _ => skip_element(reader, e.name().as_ref())?,
            },
            Event::Empty(e) if local_name(e.name().as_ref()) == b"contact" => {
                fd.contacts.push(Contact::default())
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"fileDescription" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(fd)
}

fn parse_file_content<R: BufRead>(
    reader: &mut Reader<R>,
    _start: &BytesStart,
) -> Result<FileContent> {
    let mut fc = FileContent::default();
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(
                    &e,
                    &mut fc.referenceable_param_group_refs,
                    &mut fc.cv_params,
                    &mut fc.user_params,
                );
            }
            Event::Start(e) => {
                if !push_params_start(
                    reader,
                    &e,
                    &mut fc.referenceable_param_group_refs,
                    &mut fc.cv_params,
                    &mut fc.user_params,
                )? {
                    skip_element(reader, e.name().as_ref())?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"fileContent" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(fc)
}

fn parse_source_file_list<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<SourceFileList> {
    let mut list = SourceFileList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"sourceFile" => {
                list.source_file.push(parse_source_file(reader, &e)?);
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"sourceFile" => {
                list.source_file.push(SourceFile {
                    id: get_attr(&e, b"id").unwrap_or_default(),
                    name: get_attr(&e, b"name").unwrap_or_default(),
                    location: get_attr(&e, b"location").unwrap_or_default(),
                    ..Default::default()
                });
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if local_name(e.name().as_ref()) == b"sourceFileList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_source_file<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<SourceFile> {
    let mut sf = SourceFile {
        id: get_attr(start, b"id").unwrap_or_default(),
        name: get_attr(start, b"name").unwrap_or_default(),
        location: get_attr(start, b"location").unwrap_or_default(),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(
                    &e,
                    &mut sf.referenceable_param_group_ref,
                    &mut sf.cv_param,
                    &mut sf.user_param,
                );
            }
            Event::Start(e) => {
                if !push_params_start(
                    reader,
                    &e,
                    &mut sf.referenceable_param_group_ref,
                    &mut sf.cv_param,
                    &mut sf.user_param,
                )? {
                    skip_element(reader, e.name().as_ref())?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"sourceFile" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(sf)
}

fn parse_contact<R: BufRead>(reader: &mut Reader<R>, _start: &BytesStart) -> Result<Contact> {
    let mut c = Contact::default();
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(
                    &e,
                    &mut c.referenceable_param_group_refs,
                    &mut c.cv_params,
                    &mut c.user_params,
                );
            }
            Event::Start(e) => {
                if !push_params_start(
                    reader,
                    &e,
                    &mut c.referenceable_param_group_refs,
                    &mut c.cv_params,
                    &mut c.user_params,
                )? {
                    skip_element(reader, e.name().as_ref())?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"contact" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(c)
}

fn parse_referenceable_param_group_list<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<ReferenceableParamGroupList> {
    let mut list = ReferenceableParamGroupList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"referenceableParamGroup" => {
                list.referenceable_param_groups
                    .push(parse_referenceable_param_group(reader, &e)?);
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"referenceableParamGroup" => {
                list.referenceable_param_groups.push(ReferenceableParamGroup {
                    id: get_attr(&e, b"id").unwrap_or_default(),
                    ..Default::default()
                });
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if local_name(e.name().as_ref()) == b"referenceableParamGroupList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_referenceable_param_group<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<ReferenceableParamGroup> {
    let mut group = ReferenceableParamGroup {
        id: get_attr(start, b"id").unwrap_or_default(),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut Vec::new(), &mut group.cv_params, &mut group.user_params);
            }
            Event::Start(e) => {
                if !push_params_start(reader, &e, &mut Vec::new(), &mut group.cv_params, &mut group.user_params)? {
                    skip_element(reader, e.name().as_ref())?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"referenceableParamGroup" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(group)
}

fn parse_sample_list<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<SampleList> {
    let mut list = SampleList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"sample" => {
                list.samples.push(parse_sample(reader, &e)?);
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"sample" => {
                list.samples.push(Sample {
                    id: get_attr(&e, b"id").unwrap_or_default(),
                    name: get_attr(&e, b"name").unwrap_or_default(),
                    ..Default::default()
                });
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if local_name(e.name().as_ref()) == b"sampleList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_sample<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Sample> {
    let mut sample = Sample {
        id: get_attr(start, b"id").unwrap_or_default(),
        name: get_attr(start, b"name").unwrap_or_default(),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut Vec::new(), &mut sample.cv_params, &mut sample.user_params);
            }
            Event::Start(e) => {
                if !push_params_start(reader, &e, &mut Vec::new(), &mut sample.cv_params, &mut sample.user_params)? {
                    skip_element(reader, e.name().as_ref())?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"sample" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(sample)
}

fn parse_instrument_list<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<InstrumentList> {
    let mut list = InstrumentList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"instrumentConfiguration" => {
                list.instrument.push(parse_instrument(reader, &e)?);
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"instrumentConfiguration" => {
                list.instrument.push(Instrument {
                    id: get_attr(&e, b"id").unwrap_or_default(),
                    scan_settings_ref: get_attr(&e, b"scanSettingsRef"),
                    ..Default::default()
                });
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if local_name(e.name().as_ref()) == b"instrumentConfigurationList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_instrument<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Instrument> {
    let mut instrument = Instrument {
        id: get_attr(start, b"id").unwrap_or_default(),
        scan_settings_ref: get_attr(start, b"scanSettingsRef"),
        software_ref: get_attr(start, b"softwareRef"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                if local_name(e.name().as_ref()) == b"componentList" {
                    instrument.component_list = Some(ComponentList {
                        count: get_attr_usize(&e, b"count"),
                        ..Default::default()
                    });
                } else {
                    push_params_empty(
                        &e,
                        &mut instrument.referenceable_param_group_ref,
                        &mut instrument.cv_param,
                        &mut instrument.user_param,
                    );
                }
            }
            Event::Start(e) => {
                if !push_params_start(
                    reader,
                    &e,
                    &mut instrument.referenceable_param_group_ref,
                    &mut instrument.cv_param,
                    &mut instrument.user_param,
                )? {
                    if local_name(e.name().as_ref()) == b"componentList" {
                        instrument.component_list = Some(parse_component_list(reader, &e)?);
                    } else {
                        skip_element(reader, e.name().as_ref())?;
                    }
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"instrumentConfiguration" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(instrument)
}

fn parse_component_list<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<ComponentList> {
    let mut list = ComponentList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = local_name(e.name().as_ref()).to_vec();
                let component = parse_component(reader, &e)?;
                match name.as_slice() {
                    b"source" => list.source.push(component),
                    b"analyzer" => list.analyzer.push(component),
                    b"detector" => list.detector.push(component),
                    _ => {}
                }
            }
            Event::Empty(e) => match local_name(e.name().as_ref()) {
                b"source" => list.source.push(Component {
                    order: get_attr_u32(&e, b"order"),
                    ..Default::default()
                }),
                b"analyzer" => list.analyzer.push(Component {
                    order: get_attr_u32(&e, b"order"),
                    ..Default::default()
                }),
                b"detector" => list.detector.push(Component {
                    order: get_attr_u32(&e, b"order"),
                    ..Default::default()
                }),
                _ => {}
            },
            Event::End(e) if local_name(e.name().as_ref()) == b"componentList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_component<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Component> {
    let mut c = Component {
        order: get_attr_u32(start, b"order"),
        ..Default::default()
    };
    let end = start.name().as_ref().to_vec();
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut c.referenceable_param_group_ref, &mut c.cv_param, &mut c.user_param);
            }
            Event::Start(e) => {
                if !push_params_start(reader, &e, &mut c.referenceable_param_group_ref, &mut c.cv_param, &mut c.user_param)? {
                    skip_element(reader, e.name().as_ref())?;
                }
            }
            Event::End(e) if e.name().as_ref() == end => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(c)
}

fn parse_software_list<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<SoftwareList> {
    let mut list = SoftwareList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"software" => {
                list.software.push(parse_software(reader, &e)?);
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"software" => {
                list.software.push(Software {
                    id: get_attr(&e, b"id").unwrap_or_default(),
                    version: get_attr(&e, b"version"),
                    ..Default::default()
                });
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if local_name(e.name().as_ref()) == b"softwareList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_software<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Software> {
    let mut s = Software {
        id: get_attr(start, b"id").unwrap_or_default(),
        version: get_attr(start, b"version"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut Vec::new(), &mut s.cv_params, &mut Vec::new());
            }
            Event::Start(e) => {
                if !push_params_start(reader, &e, &mut Vec::new(), &mut s.cv_params, &mut Vec::new())? {
                    skip_element(reader, e.name().as_ref())?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"software" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(s)
}

fn parse_data_processing_list<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<DataProcessingList> {
    let mut list = DataProcessingList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"dataProcessing" => {
                list.data_processing.push(parse_data_processing(reader, &e)?);
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"dataProcessing" => {
                list.data_processing.push(DataProcessing {
                    id: get_attr(&e, b"id").unwrap_or_default(),
                    ..Default::default()
                });
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if local_name(e.name().as_ref()) == b"dataProcessingList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_data_processing<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<DataProcessing> {
    let mut dp = DataProcessing {
        id: get_attr(start, b"id").unwrap_or_default(),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"processingMethod" => {
                dp.processing_methods.push(parse_processing_method(reader, &e)?);
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"processingMethod" => {
                dp.processing_methods.push(ProcessingMethod {
                    order: get_attr_u32(&e, b"order"),
                    software_ref: get_attr(&e, b"softwareRef"),
                    ..Default::default()
                });
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if local_name(e.name().as_ref()) == b"dataProcessing" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(dp)
}

fn parse_processing_method<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<ProcessingMethod> {
    let mut pm = ProcessingMethod {
        order: get_attr_u32(start, b"order"),
        software_ref: get_attr(start, b"softwareRef"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut Vec::new(), &mut pm.cv_params, &mut pm.user_params);
            }
            Event::Start(e) => {
                if !push_params_start(reader, &e, &mut Vec::new(), &mut pm.cv_params, &mut pm.user_params)? {
                    skip_element(reader, e.name().as_ref())?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"processingMethod" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(pm)
}

fn parse_scan_settings_list<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<ScanSettingsList> {
    let mut list = ScanSettingsList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"scanSettings" => {
                list.scan_settings.push(parse_scan_settings(reader, &e)?);
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"scanSettings" => {
                list.scan_settings.push(ScanSettings {
                    id: get_attr(&e, b"id").unwrap_or_default(),
                    instrument_configuration_ref: get_attr(&e, b"instrumentConfigurationRef"),
                    ..Default::default()
                });
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if local_name(e.name().as_ref()) == b"scanSettingsList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_scan_settings<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<ScanSettings> {
    let mut s = ScanSettings {
        id: get_attr(start, b"id").unwrap_or_default(),
        instrument_configuration_ref: get_attr(start, b"instrumentConfigurationRef"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(512);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                push_params_empty(&e, &mut Vec::new(), &mut s.cv_params, &mut s.user_params);
            }
            Event::Start(e) => {
                if !push_params_start(reader, &e, &mut Vec::new(), &mut s.cv_params, &mut s.user_params)? {
                    match local_name(e.name().as_ref()) {
                        b"sourceFileRefList" => {
                            s.source_file_ref_list = Some(parse_source_file_ref_list(reader, &e)?)
                        }
                        b"targetList" => s.target_list = Some(parse_target_list(reader, &e)?),
                        _ => skip_element(reader, e.name().as_ref())?,
                    }
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"scanSettings" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(s)
}

fn parse_source_file_ref_list<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<SourceFileRefList> {
    let mut list = SourceFileRefList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) if local_name(e.name().as_ref()) == b"sourceFileRef" => {
                list.source_file_refs.push(SourceFileRef {
                    r#ref: get_attr(&e, b"ref").unwrap_or_default(),
                });
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if local_name(e.name().as_ref()) == b"sourceFileRefList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

fn parse_target_list<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<TargetList> {
    let mut list = TargetList {
        count: get_attr_usize(start, b"count"),
        ..Default::default()
    };
    let mut buf = Vec::with_capacity(256);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"target" => {
                let mut t = Target::default();
                let mut inner = Vec::with_capacity(256);
                loop {
                    match reader.read_event_into(&mut inner)? {
                        Event::Empty(ie) => {
                            push_params_empty(&ie, &mut Vec::new(), &mut t.cv_params, &mut t.user_params);
                        }
                        Event::Start(ie) => {
                            if !push_params_start(reader, &ie, &mut Vec::new(), &mut t.cv_params, &mut t.user_params)? {
                                skip_element(reader, ie.name().as_ref())?;
                            }
                        }
                        Event::End(ie) if local_name(ie.name().as_ref()) == b"target" => break,
                        Event::Eof => break,
                        _ => {}
                    }
                    inner.clear();
                }
                list.targets.push(t);
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"targetList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> MzMLHeader {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        parse_header(&mut reader).unwrap()
    }

    #[test]
    fn parses_document_id_and_version() {
        let header = parse(
            r#"<mzML id="doc1" version="1.1.0"><run id="run1"></run></mzML>"#,
        );
        assert_eq!(header.id, "doc1");
        assert_eq!(header.version.as_deref(), Some("1.1.0"));
        assert_eq!(header.run.id, "run1");
    }

    #[test]
    fn recovers_version_from_schema_location_when_attribute_absent() {
        let header = parse(
            r#"<mzML id="doc1" xsi:schemaLocation="http://x http://x/mzML1.1.2.xsd"><run id="r"></run></mzML>"#,
        );
        assert_eq!(header.version.as_deref(), Some("1.1.2"));
    }

    #[test]
    fn captures_cv_list_and_sample_list() {
        let header = parse(concat!(
            "<mzML id=\"d\">",
            "<cvList count=\"1\"><cv id=\"MS\" fullName=\"PSI-MS\" version=\"4.1\" URI=\"http://x\"/></cvList>",
            "<sampleList count=\"1\"><sample id=\"s1\" name=\"sample 1\"/></sampleList>",
            "<run id=\"r\"></run></mzML>"
        ));
        assert_eq!(header.cv_list.unwrap().cv[0].id, "MS");
        assert_eq!(header.sample_list.unwrap().samples[0].id, "s1");
    }

    #[test]
    fn stops_without_consuming_spectrum_list() {
        let header = parse(concat!(
            "<mzML id=\"d\"><run id=\"r\">",
            "<spectrumList count=\"1\"><spectrum id=\"s\"></spectrum></spectrumList>",
            "</run></mzML>"
        ));
        assert_eq!(header.run.id, "r");
    }
}
