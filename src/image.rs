use std::path::PathBuf;
use num_traits::FromPrimitive;
use crate::header::HeaderMap;
use crate::header_defs::{ByteOrder, DataType};
use crate::{io, EnviError};


/// Image layout and element encoding resolved from a header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageParams {
    pub bands: usize,
    /// `lines` in the header
    pub rows: usize,
    /// `samples` in the header
    pub cols: usize,
    /// bytes to skip at the start of the image file
    pub offset: u64,
    pub byte_order: ByteOrder,
    pub data_type: DataType,
    pub file_name: PathBuf,
}

impl ImageParams {
    /// None if the element count does not fit in a usize
    pub fn n_elements(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)?.checked_mul(self.bands)
    }

    /// expected size of the image file in bytes, including the header offset.
    /// Errors if the cube cannot be addressed with a usize element index and a u64 byte position
    pub fn file_size(&self) -> Result<u64, EnviError> {
        self.n_elements()
            .and_then(|n| n.checked_mul(self.data_type.size()))
            .and_then(|n_bytes| u64::try_from(n_bytes).ok())
            .and_then(|n_bytes| self.offset.checked_add(n_bytes))
            .ok_or_else(|| EnviError::InvalidField {
                key: "lines x samples x bands".to_string(),
                value: format!(
                    "{} x {} x {} of {} at offset {} exceeds the addressable size",
                    self.rows, self.cols, self.bands, self.data_type.name(), self.offset
                ),
            })
    }

    /// every read passes through here. Once the total size is known to fit, element and
    /// byte positions of in-bounds indices cannot overflow
    fn check(&self, row: Option<usize>, col: Option<usize>, band: Option<usize>) -> Result<(), EnviError> {
        self.file_size()?;
        let axes = [("row", row, self.rows), ("column", col, self.cols), ("band", band, self.bands)];
        for (axis, index, len) in axes {
            match index {
                Some(index) if index >= len => return Err(EnviError::OutOfBounds { axis, index, len }),
                _ => {}
            }
        }
        Ok(())
    }

    /// reads `n_elements` contiguous elements starting at element index `first`
    fn read_run(&self, f: &mut std::fs::File, first: usize, n_elements: usize) -> Result<Vec<u8>, EnviError> {
        let size = self.data_type.size();
        let mut bytes = vec![0u8; n_elements * size];
        let seek_to = self.offset + (first * size) as u64;
        io::read_raw(f, seek_to, &mut bytes).map_err(|e| EnviError::io(&self.file_name, e))?;
        Ok(bytes)
    }

    fn decode<T: FromPrimitive>(&self, bytes: &[u8]) -> Result<Vec<T>, EnviError> {
        io::decode(bytes, self.data_type, self.byte_order)
    }
}

/// Read access to a raw hyperspectral cube
pub trait SpectralImage {
    fn params(&self) -> &ImageParams;

    /// the full parsed header, kept for metadata such as wavelengths
    fn header(&self) -> &HeaderMap;

    /// (rows, cols, bands)
    fn shape(&self) -> (usize, usize, usize) {
        let p = self.params();
        (p.rows, p.cols, p.bands)
    }

    /// element index of a single value within the file, not counting the header offset.
    /// Indices must lie within [SpectralImage::shape]
    fn element_index(&self, row: usize, col: usize, band: usize) -> usize;

    fn read_datum<T: FromPrimitive>(&self, row: usize, col: usize, band: usize) -> Result<T, EnviError> {
        let p = self.params();
        p.check(Some(row), Some(col), Some(band))?;
        let mut f = io::open(&p.file_name)?;
        let bytes = p.read_run(&mut f, self.element_index(row, col, band), 1)?;
        let mut x = p.decode::<T>(&bytes)?;
        Ok(x.remove(0))
    }

    /// all band values of one pixel
    fn read_pixel<T: FromPrimitive>(&self, row: usize, col: usize) -> Result<Vec<T>, EnviError>;

    /// one band in row major order
    fn read_band<T: FromPrimitive>(&self, band: usize) -> Result<Vec<T>, EnviError>;
}

/// picks every element of `block` whose element index is in `indices`
fn gather(block: &[u8], size: usize, indices: impl Iterator<Item = usize>) -> Vec<u8> {
    let mut out = vec![];
    for i in indices {
        out.extend_from_slice(&block[i * size..(i + 1) * size]);
    }
    out
}

/******************************
 ************ BIL *************
 ****************************/

/// Band interleaved by line: each image row stores one line per band
#[derive(Debug, Clone)]
pub struct BilFile {
    params: ImageParams,
    header: HeaderMap,
}

impl BilFile {
    pub fn new(params: ImageParams, header: HeaderMap) -> Self {
        BilFile { params, header }
    }
}

impl SpectralImage for BilFile {
    fn params(&self) -> &ImageParams {
        &self.params
    }

    fn header(&self) -> &HeaderMap {
        &self.header
    }

    fn element_index(&self, row: usize, col: usize, band: usize) -> usize {
        let p = &self.params;
        (row * p.bands + band) * p.cols + col
    }

    fn read_pixel<T: FromPrimitive>(&self, row: usize, col: usize) -> Result<Vec<T>, EnviError> {
        let p = &self.params;
        p.check(Some(row), Some(col), None)?;
        let mut f = io::open(&p.file_name)?;
        let line_block = p.read_run(&mut f, self.element_index(row, 0, 0), p.bands * p.cols)?;
        let bytes = gather(&line_block, p.data_type.size(), (0..p.bands).map(|b| b * p.cols + col));
        p.decode(&bytes)
    }

    fn read_band<T: FromPrimitive>(&self, band: usize) -> Result<Vec<T>, EnviError> {
        let p = &self.params;
        p.check(None, None, Some(band))?;
        let mut f = io::open(&p.file_name)?;
        let mut bytes = Vec::new();
        for row in 0..p.rows {
            bytes.extend(p.read_run(&mut f, self.element_index(row, 0, band), p.cols)?);
        }
        p.decode(&bytes)
    }
}

/******************************
 ************ BIP *************
 ****************************/

/// Band interleaved by pixel: the full spectrum of each pixel is stored contiguously
#[derive(Debug, Clone)]
pub struct BipFile {
    params: ImageParams,
    header: HeaderMap,
}

impl BipFile {
    pub fn new(params: ImageParams, header: HeaderMap) -> Self {
        BipFile { params, header }
    }
}

impl SpectralImage for BipFile {
    fn params(&self) -> &ImageParams {
        &self.params
    }

    fn header(&self) -> &HeaderMap {
        &self.header
    }

    fn element_index(&self, row: usize, col: usize, band: usize) -> usize {
        let p = &self.params;
        (row * p.cols + col) * p.bands + band
    }

    fn read_pixel<T: FromPrimitive>(&self, row: usize, col: usize) -> Result<Vec<T>, EnviError> {
        let p = &self.params;
        p.check(Some(row), Some(col), None)?;
        let mut f = io::open(&p.file_name)?;
        let bytes = p.read_run(&mut f, self.element_index(row, col, 0), p.bands)?;
        p.decode(&bytes)
    }

    fn read_band<T: FromPrimitive>(&self, band: usize) -> Result<Vec<T>, EnviError> {
        let p = &self.params;
        p.check(None, None, Some(band))?;
        let mut f = io::open(&p.file_name)?;
        let size = p.data_type.size();
        let mut bytes = Vec::new();
        for row in 0..p.rows {
            let row_block = p.read_run(&mut f, self.element_index(row, 0, 0), p.cols * p.bands)?;
            bytes.extend(gather(&row_block, size, (0..p.cols).map(|c| c * p.bands + band)));
        }
        p.decode(&bytes)
    }
}

/******************************
 ********** HANDLE ************
 ****************************/

/// Reader selected from the header's `interleave` field
#[derive(Debug, Clone)]
pub enum EnviImage {
    Bil(BilFile),
    Bip(BipFile),
}

impl SpectralImage for EnviImage {
    fn params(&self) -> &ImageParams {
        match self {
            EnviImage::Bil(img) => img.params(),
            EnviImage::Bip(img) => img.params(),
        }
    }

    fn header(&self) -> &HeaderMap {
        match self {
            EnviImage::Bil(img) => img.header(),
            EnviImage::Bip(img) => img.header(),
        }
    }

    fn element_index(&self, row: usize, col: usize, band: usize) -> usize {
        match self {
            EnviImage::Bil(img) => img.element_index(row, col, band),
            EnviImage::Bip(img) => img.element_index(row, col, band),
        }
    }

    fn read_pixel<T: FromPrimitive>(&self, row: usize, col: usize) -> Result<Vec<T>, EnviError> {
        match self {
            EnviImage::Bil(img) => img.read_pixel(row, col),
            EnviImage::Bip(img) => img.read_pixel(row, col),
        }
    }

    fn read_band<T: FromPrimitive>(&self, band: usize) -> Result<Vec<T>, EnviError> {
        match self {
            EnviImage::Bil(img) => img.read_band(band),
            EnviImage::Bip(img) => img.read_band(band),
        }
    }
}
