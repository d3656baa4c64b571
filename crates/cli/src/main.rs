use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use mzreader::model::{BinaryDataArray, Chromatogram, Spectrum};
use mzreader::{Reader, ReaderOptions, Warning};
use serde::Serialize;

/// Opens an mzML (or mzML.gz) file and prints a summary or a decoded
/// spectrum/chromatogram as JSON. Demonstrates the reader end-to-end; not a
/// replacement for the reader's own API.
#[derive(Parser)]
#[command(name = "mzreader", version, about = "mzML reader demo CLI")]
#[command(group(
    ArgGroup::new("selector")
        .args(["spectrum_id", "spectrum_index", "chromatogram_id", "chromatogram_index"])
        .multiple(false)
))]
struct Cli {
    /// Path to the mzML (or mzML.gz) file to open.
    path: PathBuf,

    /// Print the decoded spectrum with this id.
    #[arg(long)]
    spectrum_id: Option<String>,

    /// Print the decoded spectrum at this 0-based index.
    #[arg(long)]
    spectrum_index: Option<usize>,

    /// Print the decoded chromatogram with this id.
    #[arg(long)]
    chromatogram_id: Option<String>,

    /// Print the decoded chromatogram at this 0-based index.
    #[arg(long)]
    chromatogram_index: Option<usize>,

    /// Rebuild the offset index from scratch instead of trusting the
    /// embedded footer.
    #[arg(long)]
    build_index_from_scratch: bool,

    /// Load the whole document into memory rather than keeping a
    /// file-backed cursor.
    #[arg(long)]
    in_memory: bool,
}

#[derive(Serialize)]
struct Summary {
    id: String,
    version: Option<String>,
    encoding: String,
    spectrum_count: Option<usize>,
    chromatogram_count: Option<usize>,
    supports_random_access: bool,
}

#[derive(Serialize)]
struct DecodedArray {
    name: &'static str,
    values: Vec<f64>,
}

#[derive(Serialize)]
struct DecodedEntry {
    id: String,
    index: Option<u32>,
    arrays: Vec<DecodedArray>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> mzreader::Result<()> {
    let options = ReaderOptions {
        build_index_from_scratch: cli.build_index_from_scratch,
        in_memory: cli.in_memory,
        ..ReaderOptions::default()
    };

    let reader = Reader::open(&cli.path, options)?;

    for warning in reader.warnings() {
        log_warning(warning);
    }

    if let Some(id) = &cli.spectrum_id {
        let spectrum = reader.spectrum_by_id(id)?;
        return print_json(&decoded_spectrum(&spectrum)?);
    }
    if let Some(index) = cli.spectrum_index {
        let spectrum = reader.spectrum_by_index(index)?;
        return print_json(&decoded_spectrum(&spectrum)?);
    }
    if let Some(id) = &cli.chromatogram_id {
        let chromatogram = reader.chromatogram_by_id(id)?;
        return print_json(&decoded_chromatogram(&chromatogram)?);
    }
    if let Some(index) = cli.chromatogram_index {
        let chromatogram = reader.chromatogram_by_index(index)?;
        return print_json(&decoded_chromatogram(&chromatogram)?);
    }

    print_json(&Summary {
        id: reader.id().to_string(),
        version: reader.version().map(str::to_string),
        encoding: reader.encoding().to_string(),
        spectrum_count: reader.spectrum_count(),
        chromatogram_count: reader.chromatogram_count(),
        supports_random_access: reader.supports_random_access(),
    })
}

fn decoded_spectrum(spectrum: &Spectrum) -> mzreader::Result<DecodedEntry> {
    let arrays = spectrum
        .binary_data_array_list
        .as_ref()
        .map(|list| decode_arrays(&list.binary_data_arrays))
        .transpose()?
        .unwrap_or_default();

    Ok(DecodedEntry {
        id: spectrum.id.clone(),
        index: spectrum.index,
        arrays,
    })
}

fn decoded_chromatogram(chromatogram: &Chromatogram) -> mzreader::Result<DecodedEntry> {
    let arrays = chromatogram
        .binary_data_array_list
        .as_ref()
        .map(|list| decode_arrays(&list.binary_data_arrays))
        .transpose()?
        .unwrap_or_default();

    Ok(DecodedEntry {
        id: chromatogram.id.clone(),
        index: chromatogram.index,
        arrays,
    })
}

fn decode_arrays(arrays: &[BinaryDataArray]) -> mzreader::Result<Vec<DecodedArray>> {
    let mut warnings = Vec::new();
    let mut out = Vec::with_capacity(arrays.len());
    for (i, array) in arrays.iter().enumerate() {
        let values = mzreader::binary::decode(array, &mut warnings)?;
        out.push(DecodedArray {
            name: array_slot_name(i),
            values,
        });
    }
    for warning in &warnings {
        log_warning(warning);
    }
    Ok(out)
}

fn array_slot_name(position: usize) -> &'static str {
    match position {
        0 => "array_0",
        1 => "array_1",
        _ => "array_n",
    }
}

fn log_warning(warning: &Warning) {
    log::warn!("{warning}");
}

fn print_json<T: Serialize>(value: &T) -> mzreader::Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| mzreader::Error::FormatError(format!("failed to serialize JSON: {e}")))?;
    println!("{text}");
    Ok(())
}
