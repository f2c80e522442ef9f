//! squeeze CLI - streaming LZSS compression tool
//!
//! Compresses or decompresses a file through the squeeze codec, shuttling
//! fixed-size buffers so memory use stays flat regardless of file size.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use squeeze::{Decoder, Encoder, Finish, Poll};

/// Size of the read/write shuttle buffers.
const BUFFER_SIZE: usize = 4096;

/// A streaming LZSS compression tool for tiny-RAM targets.
///
/// The window and lookahead settings are not stored in the output; pass the
/// same values when decompressing.
#[derive(Parser, Debug)]
#[command(name = "squeeze")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (default: INPUT.sz, or INPUT.out when decompressing)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Decompress instead of compress
    #[arg(short, long)]
    decompress: bool,

    /// Window size exponent (window = 2^N bytes)
    #[arg(short, long, default_value = "11", value_parser = clap::value_parser!(u8).range(4..=15))]
    window: u8,

    /// Lookahead size exponent (max match = 2^N bytes; must not exceed the window exponent)
    #[arg(short, long, default_value = "4", value_parser = clap::value_parser!(u8).range(3..=15))]
    lookahead: u8,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let output_path = args.output.clone().unwrap_or_else(|| {
        let mut name = args.input.clone().into_os_string();
        name.push(if args.decompress { ".out" } else { ".sz" });
        PathBuf::from(name)
    });

    let mut reader = BufReader::new(File::open(&args.input)?);
    let mut writer = BufWriter::new(File::create(&output_path)?);

    let start = Instant::now();
    let (bytes_in, bytes_out) = if args.decompress {
        decompress_stream(&mut reader, &mut writer, args.window, args.lookahead)?
    } else {
        compress_stream(&mut reader, &mut writer, args.window, args.lookahead)?
    };
    writer.flush()?;
    let elapsed = start.elapsed();

    let ratio = if bytes_in > 0 {
        (bytes_out as f64 / bytes_in as f64) * 100.0
    } else {
        0.0
    };

    if args.verbose {
        eprintln!("{:?} -> {:?}", args.input, output_path);
        eprintln!("  Window: 2^{} bytes", args.window);
        eprintln!("  Lookahead: 2^{} bytes", args.lookahead);
        eprintln!("  Time: {:.2?}", elapsed);
        eprintln!(
            "  Size: {} -> {} ({:.1}%)",
            format_size(bytes_in),
            format_size(bytes_out),
            ratio
        );
    } else {
        println!(
            "{} -> {} ({:.1}%)",
            format_size(bytes_in),
            format_size(bytes_out),
            ratio
        );
    }

    Ok(())
}

/// Feed `reader` through an encoder into `writer`. Returns (bytes read,
/// bytes written).
fn compress_stream(
    reader: &mut impl Read,
    writer: &mut impl Write,
    window: u8,
    lookahead: u8,
) -> Result<(u64, u64), Box<dyn std::error::Error>> {
    let mut encoder = Encoder::new(window, lookahead)?;
    let mut in_buf = [0u8; BUFFER_SIZE];
    let mut out_buf = [0u8; BUFFER_SIZE];
    let mut bytes_in = 0u64;
    let mut bytes_out = 0u64;

    loop {
        let read = reader.read(&mut in_buf)?;
        if read == 0 {
            break;
        }
        bytes_in += read as u64;

        let mut consumed = 0;
        while consumed < read {
            consumed += encoder.sink(&in_buf[consumed..read])?;
            loop {
                let (n, poll) = encoder.poll(&mut out_buf)?;
                writer.write_all(&out_buf[..n])?;
                bytes_out += n as u64;
                if poll == Poll::Empty {
                    break;
                }
            }
        }
    }

    while encoder.finish() == Finish::More {
        let (n, _) = encoder.poll(&mut out_buf)?;
        writer.write_all(&out_buf[..n])?;
        bytes_out += n as u64;
    }

    Ok((bytes_in, bytes_out))
}

/// Feed `reader` through a decoder into `writer`. Returns (bytes read,
/// bytes written). Fails if the stream ends mid-symbol.
fn decompress_stream(
    reader: &mut impl Read,
    writer: &mut impl Write,
    window: u8,
    lookahead: u8,
) -> Result<(u64, u64), Box<dyn std::error::Error>> {
    let mut decoder = Decoder::new(BUFFER_SIZE, window, lookahead)?;
    let mut in_buf = [0u8; BUFFER_SIZE];
    let mut out_buf = [0u8; BUFFER_SIZE];
    let mut bytes_in = 0u64;
    let mut bytes_out = 0u64;

    loop {
        let read = reader.read(&mut in_buf)?;
        if read == 0 {
            break;
        }
        bytes_in += read as u64;

        let mut consumed = 0;
        while consumed < read {
            consumed += decoder.sink(&in_buf[consumed..read])?;
            loop {
                let (n, poll) = decoder.poll(&mut out_buf)?;
                writer.write_all(&out_buf[..n])?;
                bytes_out += n as u64;
                if poll == Poll::Empty {
                    break;
                }
            }
        }
    }

    if decoder.finish() != Finish::Done {
        return Err("input ends in the middle of a compressed symbol (truncated or wrong -w/-l settings)".into());
    }

    Ok((bytes_in, bytes_out))
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
