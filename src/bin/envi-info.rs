use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;
use std::process::exit;
use std::str::FromStr;
use clap::Parser;
use envi_rs::{open_envi_image, EnviImage, SpectralImage};

#[derive(Parser, Debug)]
/// Print the contents of an ENVI header and the image parameters resolved from it
struct Args {

    /// path to the ENVI header
    header: PathBuf,

    /// raw image file described by the header. If omitted, the file is found from the header
    /// name (scene.hdr -> scene, scene.img or scene.IMG)
    #[clap(short, long)]
    image: Option<PathBuf>,

    /// print the spectrum of a single pixel.
    /// Example: `--pixel 10,42` for line 10, sample 42
    #[clap(short, long)]
    pixel: Option<String>,

    /// print the min, max and mean of a band.
    /// Example: `-b 0`
    #[clap(short, long)]
    band: Option<usize>,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    if let Err(err) = run(&args) {
        eprintln!("{err}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {

    let img = open_envi_image(&args.header, args.image.as_deref())?;

    println!("header fields:");
    for (key, val) in img.header().sorted() {
        println!("  {key} = {val}");
    }

    let p = img.params();
    let layout = match &img {
        EnviImage::Bil(_) => "band interleaved by line",
        EnviImage::Bip(_) => "band interleaved by pixel",
    };
    println!("image:");
    println!("  file: {}", p.file_name.display());
    println!("  layout: {layout}");
    println!("  shape: {} lines x {} samples x {} bands", p.rows, p.cols, p.bands);
    println!("  data type: {}", p.data_type);
    println!("  byte order: {}", p.byte_order);
    println!("  header offset: {}", p.offset);
    println!("  expected file size: {} bytes", p.file_size()?);

    if let Some(pixel) = &args.pixel {
        let [row, col] = parse_list_input::<usize, 2>(pixel)?;
        let spectrum = img.read_pixel::<f64>(row, col)?;
        let wavelengths = img.header().wavelengths()?;
        println!("pixel ({row}, {col}):");
        for (band, value) in spectrum.iter().enumerate() {
            match wavelengths.as_ref().and_then(|w| w.get(band)) {
                Some(w) => println!("  band {band} ({w}): {value}"),
                None => println!("  band {band}: {value}"),
            }
        }
    }

    if let Some(band) = args.band {
        let values = img.read_band::<f64>(band)?;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
        println!("band {band}: min {min} max {max} mean {mean:.4}");
    }

    Ok(())
}

/// parse exactly `N` comma or whitespace separated values
pub fn parse_list_input<T, const N: usize>(s: &str) -> Result<[T; N], String>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    let vals = s
        .split(|c: char| c.is_ascii_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<T>().map_err(|e| format!("failed to parse '{}': {e}", t)))
        .collect::<Result<Vec<_>, _>>()?;

    let n = vals.len();
    vals.try_into().map_err(|_| format!("expected {N} values, found {n} in '{s}'"))
}
