//! A streaming, indexed mzML reader: CV accession enumerations, a numeric
//! codec library (base64/zlib/zstd/MS-Numpress), a byte-offset indexer and
//! subtree extractor, a header streaming parser, and the file-format
//! multiplexer and top-level [`Reader`] that tie them together.

pub mod binary;
pub mod codec;
pub mod cv;
pub mod error;
pub mod extract;
pub mod header;
pub mod index;
pub mod model;
pub mod options;
pub mod reader;
pub mod source;
pub mod wrapper;
pub mod xml;

pub use error::{Error, Result, Warning};
pub use options::ReaderOptions;
pub use reader::Reader;
