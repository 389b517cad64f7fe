//! End to end tests: write a header and raw cube to disk, open it, read it back.

use std::fs;
use std::path::{Path, PathBuf};
use envi_rs::{open_envi_image, ByteOrder, DataType, EnviError, EnviImage, ErrorKind, SpectralImage};

const ROWS: usize = 3;
const COLS: usize = 4;
const BANDS: usize = 5;

/// value stored at (row, col, band). Negative for odd bands so sign handling is exercised
fn value(row: usize, col: usize, band: usize) -> i16 {
    let v = (1000 * band + 10 * row + col) as i16;
    if band % 2 == 1 { -v } else { v }
}

fn encode(v: i16, byte_order: ByteOrder) -> [u8; 2] {
    match byte_order {
        ByteOrder::Big => v.to_be_bytes(),
        ByteOrder::Little => v.to_le_bytes(),
    }
}

/// writes `<name>.hdr` and `<name>.img` holding the test cube as int16
fn write_cube(dir: &Path, name: &str, interleave: &str, byte_order: ByteOrder, offset: usize) -> PathBuf {
    let header = format!(
        "ENVI\n\
         description = {{\n  synthetic cube, {interleave}}}\n\
         samples = {COLS}\n\
         lines   = {ROWS}\n\
         bands   = {BANDS}\n\
         header offset = {offset}\n\
         file type = ENVI Standard\n\
         data type = 2\n\
         interleave = {interleave}\n\
         byte order = {}\n\
         wavelength = {{\n 400, 500, 600,\n 700, 800}}\n",
        byte_order.flag()
    );
    let hdr = dir.join(format!("{name}.hdr"));
    fs::write(&hdr, header).unwrap();

    let mut bytes = vec![0u8; offset];
    for r in 0..ROWS {
        if interleave == "bil" {
            for b in 0..BANDS {
                for c in 0..COLS {
                    bytes.extend(encode(value(r, c, b), byte_order));
                }
            }
        } else {
            for c in 0..COLS {
                for b in 0..BANDS {
                    bytes.extend(encode(value(r, c, b), byte_order));
                }
            }
        }
    }
    fs::write(dir.join(format!("{name}.img")), bytes).unwrap();
    hdr
}

#[test]
fn bil_and_bip_agree() {
    let dir = tempfile::tempdir().unwrap();
    let bil = open_envi_image(write_cube(dir.path(), "a", "bil", ByteOrder::Little, 0), None).unwrap();
    let bip = open_envi_image(write_cube(dir.path(), "b", "bip", ByteOrder::Little, 0), None).unwrap();
    assert!(matches!(bil, EnviImage::Bil(_)));
    assert!(matches!(bip, EnviImage::Bip(_)));

    for r in 0..ROWS {
        for c in 0..COLS {
            let expected: Vec<i16> = (0..BANDS).map(|b| value(r, c, b)).collect();
            assert_eq!(bil.read_pixel::<i16>(r, c).unwrap(), expected);
            assert_eq!(bip.read_pixel::<i16>(r, c).unwrap(), expected);
        }
    }
    for b in 0..BANDS {
        assert_eq!(bil.read_band::<i32>(b).unwrap(), bip.read_band::<i32>(b).unwrap());
    }
}

#[test]
fn big_endian_with_offset() {
    let dir = tempfile::tempdir().unwrap();
    let img = open_envi_image(write_cube(dir.path(), "be", "bip", ByteOrder::Big, 512), None).unwrap();
    let p = img.params();
    assert_eq!(p.byte_order, ByteOrder::Big);
    assert_eq!(p.data_type, DataType::Int16);
    assert_eq!(p.offset, 512);
    assert_eq!(fs::metadata(&p.file_name).unwrap().len(), p.file_size().unwrap());

    assert_eq!(img.read_datum::<i16>(2, 3, 3).unwrap(), -3023);
    let band: Vec<f32> = img.read_band(4).unwrap();
    assert_eq!(band.len(), ROWS * COLS);
    assert_eq!(band[COLS + 1], 4011.0);
}

#[test]
fn metadata_passes_through() {
    let dir = tempfile::tempdir().unwrap();
    let img = open_envi_image(write_cube(dir.path(), "m", "bil", ByteOrder::Little, 0), None).unwrap();
    let h = img.header();
    assert_eq!(h.description(), Some("synthetic cube, bil"));
    assert_eq!(h.wavelengths().unwrap(), Some(vec![400., 500., 600., 700., 800.]));
    assert_eq!(h.scalar("file type").unwrap(), "ENVI Standard");
    assert!(h.scalar("header file").unwrap().ends_with("m.hdr"));
}

#[test]
fn value_outside_requested_type() {
    let dir = tempfile::tempdir().unwrap();
    let img = open_envi_image(write_cube(dir.path(), "c", "bil", ByteOrder::Little, 0), None).unwrap();
    let err = img.read_pixel::<u8>(0, 0).unwrap_err();
    assert!(matches!(err, EnviError::ElementConversion(_)));
    assert_eq!(err.kind(), ErrorKind::Read);
    let err = img.read_datum::<i16>(ROWS, 0, 0).unwrap_err();
    assert!(matches!(err, EnviError::OutOfBounds { axis: "row", .. }));
}

#[test]
fn image_name_priority() {
    let dir = tempfile::tempdir().unwrap();
    let hdr = write_cube(dir.path(), "scene", "bil", ByteOrder::Little, 0);
    let img = open_envi_image(&hdr, None).unwrap();
    assert_eq!(img.params().file_name, dir.path().join("scene.img"));

    fs::copy(dir.path().join("scene.img"), dir.path().join("scene")).unwrap();
    let img = open_envi_image(&hdr, None).unwrap();
    assert_eq!(img.params().file_name, dir.path().join("scene"));
}
