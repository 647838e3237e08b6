//! msexpand - Command-line expander for SZDD files
//!
//! A command-line tool for expanding files written by Microsoft's `COMPRESS.EXE`.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use msdecomp::{get_expanded_name, SzddReader};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Parser)]
#[command(name = "msexpand")]
#[command(about = "A CLI tool for expanding SZDD-compressed files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand an SZDD file
    Expand {
        /// Input compressed file
        input: PathBuf,

        /// Output file (defaults to the original name stored in the header)
        output: Option<PathBuf>,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Get information about an SZDD file
    Info {
        /// Compressed file to analyze
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Expand {
            input,
            output,
            force,
        } => expand_file(&input, output.as_deref(), force, cli.verbose, cli.quiet).map(|_| ()),
        Commands::Info { input } => show_file_info(&input, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Output path derived from the input's name and the header's missing character
fn default_output(input: &Path, missing_char: u8) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(get_expanded_name(&name, missing_char))
}

fn expand_file(
    input: &Path,
    output: Option<&Path>,
    force: bool,
    verbose: bool,
    quiet: bool,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Check if input file exists
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    let start_time = Instant::now();
    let compressed_data = fs::read(input)?;
    let input_size = compressed_data.len();
    let mut reader = SzddReader::new(compressed_data.as_slice())
        .map_err(|e| format!("Not a valid SZDD file: {}", e))?;

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output(input, reader.header().missing_char),
    };
    if output == input {
        return Err(format!(
            "Output file '{}' would overwrite the input; name it explicitly",
            output.display()
        )
        .into());
    }

    // Check if output file exists and force flag
    if output.exists() && !force {
        return Err(format!(
            "Output file '{}' already exists. Use --force to overwrite",
            output.display()
        )
        .into());
    }

    if verbose {
        println!("Expanding '{}' to '{}'", input.display(), output.display());
        println!("Compressed size: {} bytes", input_size);
    }

    let output_size = reader.len();

    // Show progress bar for large files
    let progress = if !quiet && input_size > 1024 * 1024 {
        let pb = ProgressBar::new(output_size);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} {msg}",
                )?
                .progress_chars("#>-"),
        );
        pb.set_message("Expanding...");
        Some(pb)
    } else {
        None
    };

    let mut writer = BufWriter::new(File::create(&output)?);
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader
            .read(&mut buffer)
            .map_err(|e| format!("Expansion failed: {}", e))?;
        if n == 0 {
            break;
        }
        writer.write_all(&buffer[..n])?;
        if let Some(ref pb) = progress {
            pb.inc(n as u64);
        }
    }
    writer.flush()?;

    if let Some(ref pb) = progress {
        pb.finish_with_message("Expansion complete");
    }

    let expansion_time = start_time.elapsed();
    let ratio = if output_size > 0 {
        (input_size as f64 / output_size as f64) * 100.0
    } else {
        0.0
    };

    if !quiet {
        println!("✓ Expansion successful!");
        println!("  Input:  {} bytes", input_size);
        println!("  Output: {} bytes ({})", output_size, output.display());
        println!("  Ratio:  {:.1}%", ratio);
        println!("  Time:   {:.2?}", expansion_time);
    }

    Ok(output)
}

fn show_file_info(input: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Check if input file exists
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    let data = fs::read(input)?;
    let file_size = data.len();
    let mut reader =
        SzddReader::new(data.as_slice()).map_err(|e| format!("Not a valid SZDD file: {}", e))?;
    let header = *reader.header();

    let missing = match header.missing_char {
        0 => "none".to_string(),
        c if c.is_ascii_graphic() => format!("'{}'", c as char),
        c => format!("{:#04x}", c),
    };

    println!("SZDD File Information:");
    println!("  File: {}", input.display());
    println!("  Size: {} bytes", file_size);
    println!("  Compression Type: '{}'", header.compression_type as char);
    println!("  Missing Character: {}", missing);
    println!("  Expanded Size: {} bytes", header.real_length);
    println!(
        "  Expanded Name: {}",
        default_output(input, header.missing_char).display()
    );

    if verbose {
        println!("  Compressed Payload: {} bytes", reader.compressed_len());
    }

    let mut expanded = Vec::new();
    match reader.read_to_end(&mut expanded) {
        Ok(_) => {
            let ratio = if expanded.is_empty() {
                0.0
            } else {
                (file_size as f64 / expanded.len() as f64) * 100.0
            };
            println!("  Compression Ratio: {:.1}%", ratio);
            println!("  Status: ✓ Valid SZDD file");
        }
        Err(e) => {
            println!("  Status: ✗ Invalid or corrupted SZDD file");
            if verbose {
                println!("  Error: {}", e);
            }
        }
    }

    Ok(())
}
