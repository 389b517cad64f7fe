use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use log::debug;
use num_traits::FromPrimitive;
use crate::header_defs::{ByteOrder, DataType};
use crate::EnviError;


/// open a file for reading, classifying the failure
pub fn open(path: &Path) -> Result<File, EnviError> {
    File::open(path).map_err(|e| open_error(path, e))
}

fn open_error(path: &Path, e: io::Error) -> EnviError {
    match e.kind() {
        io::ErrorKind::NotFound => EnviError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => EnviError::PermissionDenied(path.to_path_buf()),
        _ => EnviError::io(path, e),
    }
}

/// image file names to try for a header ending in `.hdr` (any case), in priority order:
/// the bare stem, then `.img`, then `.IMG`
pub fn image_file_candidates(header: &Path) -> Option<Vec<PathBuf>> {
    let ext = header.extension()?;
    if !ext.eq_ignore_ascii_case("hdr") {
        return None
    }
    let stem = header.with_extension("");
    let with_suffix = |suffix: &str| {
        let mut s = OsString::from(stem.as_os_str());
        s.push(suffix);
        PathBuf::from(s)
    };
    Some(vec![stem.clone(), with_suffix(".img"), with_suffix(".IMG")])
}

/// first existing image file next to `header`
pub fn resolve_image_file(header: &Path) -> Option<PathBuf> {
    image_file_candidates(header)?.into_iter().find(|p| {
        let exists = p.exists();
        debug!("image file candidate {} exists: {exists}", p.display());
        exists
    })
}

/// the file must exist and be openable for reading
pub fn check_readable(path: &Path) -> Result<(), EnviError> {
    if !path.exists() {
        return Err(EnviError::NotFound(path.to_path_buf()));
    }
    open(path).map(|_| ())
}

/// fills `bytes` starting at byte `seek_to` of the file
pub fn read_raw(f: &mut File, seek_to: u64, bytes: &mut [u8]) -> io::Result<()> {
    f.seek(SeekFrom::Start(seek_to))?;
    f.read_exact(bytes)
}

/// converts raw image bytes into values of `T`. `bytes` must hold a whole number of elements
pub(crate) fn decode<T: FromPrimitive>(bytes: &[u8], dtype: DataType, byte_order: ByteOrder) -> Result<Vec<T>, EnviError> {
    let size = dtype.size();
    if bytes.len() % size != 0 {
        return Err(EnviError::PartialElement { len: bytes.len(), size });
    }
    match dtype {
        DataType::Byte => bytes.iter().map(|&b| {
            T::from_u8(b).ok_or_else(|| EnviError::ElementConversion(b.to_string()))
        }).collect(),
        DataType::Int16 => bytes.chunks_exact(size).map(|chunk| {
            let x = match byte_order {
                ByteOrder::Big => BigEndian::read_i16(chunk),
                ByteOrder::Little => LittleEndian::read_i16(chunk),
            };
            T::from_i16(x).ok_or_else(|| EnviError::ElementConversion(x.to_string()))
        }).collect(),
    }
}
