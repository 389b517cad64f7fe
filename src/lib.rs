use std::path::{Path, PathBuf};
use log::info;
use thiserror::Error;

pub mod header;
pub mod header_defs;
pub mod image;
pub mod io;

pub use header::{parse_header, HeaderMap, SyntaxError};
pub use header_defs::{ByteOrder, DataType, HeaderDef, HeaderValue, Interleave};
pub use image::{BilFile, BipFile, EnviImage, ImageParams, SpectralImage};


/// Coarse classification of an [EnviError]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    Io,
    /// the header is malformed or lacks what is needed to locate and decode the image
    Format,
    /// well formed, but names a data type or interleave with no reader
    UnsupportedFormat,
    /// a read from an opened image could not be satisfied
    Read,
}

#[derive(Debug, Error)]
pub enum EnviError {
    #[error("file {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("no read access for file {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("not an ENVI header")]
    NotEnviHeader,
    #[error("error while reading ENVI header")]
    MalformedHeader(#[source] SyntaxError),
    #[error("required header field `{0}` is missing")]
    MissingField(String),
    #[error("header field `{key}` has invalid value `{value}`")]
    InvalidField { key: String, value: String },
    #[error("byte order `{0}` cannot be decoded, expected 0 (little endian) or 1 (big endian)")]
    UnsupportedByteOrder(String),
    #[error("unable to determine image file name")]
    UnknownImageFile,
    #[error("unrecognized data type code `{0}` in header")]
    UnsupportedDataType(String),
    #[error("interleave `{0}` is not supported")]
    UnsupportedInterleave(String),
    #[error("{axis} index {index} is out of bounds for length {len}")]
    OutOfBounds { axis: &'static str, index: usize, len: usize },
    #[error("image value {0} does not fit the requested type")]
    ElementConversion(String),
    #[error("{len} bytes is not a whole number of {size} byte elements")]
    PartialElement { len: usize, size: usize },
}

impl EnviError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        EnviError::Io { path: path.to_path_buf(), source }
    }

    pub fn kind(&self) -> ErrorKind {
        use EnviError::*;
        match self {
            NotFound(_) => ErrorKind::NotFound,
            PermissionDenied(_) => ErrorKind::PermissionDenied,
            Io { .. } => ErrorKind::Io,
            NotEnviHeader | MalformedHeader(_) | MissingField(_) | InvalidField { .. } | UnsupportedByteOrder(_)
            | UnknownImageFile => ErrorKind::Format,
            UnsupportedDataType(_) | UnsupportedInterleave(_) => ErrorKind::UnsupportedFormat,
            OutOfBounds { .. } | ElementConversion(_) | PartialElement { .. } => ErrorKind::Read,
        }
    }
}

pub type Result<T> = std::result::Result<T, EnviError>;

/// Open the raw image described by an ENVI header.
///
/// `image_file` names the binary file explicitly. When it is `None` (or empty) the file is
/// looked for next to a header ending in `.hdr`: first the header name without the suffix,
/// then with `.img`, then with `.IMG`.
///
/// The returned handle carries the full header, with an extra `header file` field holding
/// `header_file`.
pub fn open_envi_image(header_file: impl AsRef<Path>, image_file: Option<&Path>) -> Result<EnviImage> {
    let header_file = header_file.as_ref();
    let mut h = parse_header(header_file)?;
    h.insert("header file", HeaderValue::Scalar(header_file.display().to_string()));

    let bands = h.integer::<usize>("bands")?;
    let rows = h.integer::<usize>("lines")?;
    let cols = h.integer::<usize>("samples")?;
    let offset = h.integer::<u64>("header offset")?;
    let byte_order = ByteOrder::from_header(&h)?;

    let file_name = match image_file.filter(|p| !p.as_os_str().is_empty()) {
        Some(p) => p.to_path_buf(),
        None => io::resolve_image_file(header_file).ok_or(EnviError::UnknownImageFile)?,
    };
    io::check_readable(&file_name)?;

    let data_type = DataType::from_header(&h)?;
    let interleave = Interleave::from_header(&h)?;

    let params = ImageParams { bands, rows, cols, offset, byte_order, data_type, file_name };
    params.file_size()?;

    info!(
        "opening {} as {interleave}: {rows} lines x {cols} samples x {bands} bands of {}",
        params.file_name.display(),
        data_type.name()
    );

    match interleave {
        Interleave::Bil => Ok(EnviImage::Bil(BilFile::new(params, h))),
        Interleave::Bip => Ok(EnviImage::Bip(BipFile::new(params, h))),
        Interleave::Bsq => Err(EnviError::UnsupportedInterleave(interleave.to_string())),
    }
}
