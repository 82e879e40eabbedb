//! `smartfile` command-line interface.
//!
//! - `deconstruct` encodes a file into a `.smart` file
//! - `reconstruct` restores the original file from a smart file
//! - `inspect` prints the size breakdown of a smart file
//! - `verify` checks that a smart file reproduces a given file
//! - `generate` writes a repeated-pattern sample file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use smartfile::BlockSize;
use smartfile::fs::{deconstruct, default_output_path, generate, reconstruct, verify};
use smartfile::sample::parse_hex_pattern;

/// Pattern and block deduplicating file encoder.
#[derive(Parser)]
#[command(name = "smartfile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file into the smart file format
    Deconstruct {
        /// File to encode
        input_file: PathBuf,

        /// Block size used when the file is not a single repeated pattern
        #[arg(allow_negative_numbers = true)]
        block_size: i64,

        /// Output path (default: <input_file>.smart)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Restore the original file from a smart file
    Reconstruct {
        /// Smart file to decode
        input_file: PathBuf,

        /// Where to write the restored file
        output_file: PathBuf,
    },

    /// Show the size breakdown and compression ratio of a smart file
    Inspect {
        /// Smart file to inspect
        smart_file: PathBuf,
    },

    /// Check that a smart file reconstructs a file byte for byte
    Verify {
        /// The original file
        original_file: PathBuf,

        /// Smart file expected to reproduce it
        smart_file: PathBuf,
    },

    /// Write a sample file made of a repeated pattern
    Generate {
        /// Output file
        output_file: PathBuf,

        /// Pattern as hex, e.g. "0fabbb"
        #[arg(short, long)]
        pattern: String,

        /// Number of repetitions
        #[arg(short, long)]
        repetitions: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")?;

    match cli.command {
        Commands::Deconstruct {
            input_file,
            block_size,
            output,
        } => cmd_deconstruct(&input_file, block_size, output.as_deref()),

        Commands::Reconstruct {
            input_file,
            output_file,
        } => cmd_reconstruct(&input_file, &output_file),

        Commands::Inspect { smart_file } => cmd_inspect(&smart_file),

        Commands::Verify {
            original_file,
            smart_file,
        } => cmd_verify(&original_file, &smart_file),

        Commands::Generate {
            output_file,
            pattern,
            repetitions,
        } => cmd_generate(&output_file, &pattern, repetitions),
    }
}

fn cmd_deconstruct(input: &Path, block_size: i64, output: Option<&Path>) -> Result<()> {
    let block_size = BlockSize::try_from(block_size)?;
    let output = output.map_or_else(|| default_output_path(input), Path::to_path_buf);

    info!("Deconstructing {:?} into {:?}", input, output);

    let summary = deconstruct(input, block_size, &output)
        .with_context(|| format!("Failed to deconstruct {}", input.display()))?;

    println!("{}", summary.output_len);
    Ok(())
}

fn cmd_reconstruct(input: &Path, output: &Path) -> Result<()> {
    info!("Reconstructing {:?} into {:?}", input, output);

    reconstruct(input, output)
        .with_context(|| format!("Failed to reconstruct {}", input.display()))?;

    Ok(())
}

fn cmd_inspect(smart_file: &Path) -> Result<()> {
    let encoded = std::fs::read(smart_file)
        .with_context(|| format!("Failed to read {}", smart_file.display()))?;
    let report = smartfile::inspect(&encoded)
        .with_context(|| format!("Failed to inspect {}", smart_file.display()))?;

    println!("{report}");
    Ok(())
}

fn cmd_verify(original: &Path, smart_file: &Path) -> Result<()> {
    let summary = verify(original, smart_file).with_context(|| {
        format!(
            "{} does not reproduce {}",
            smart_file.display(),
            original.display()
        )
    })?;

    println!(
        "OK: {} ({} encoding) reproduces {} bytes",
        smart_file.display(),
        summary.format,
        summary.output_len
    );
    Ok(())
}

fn cmd_generate(output: &Path, pattern: &str, repetitions: usize) -> Result<()> {
    let pattern = parse_hex_pattern(pattern)?;
    let len = generate(output, &pattern, repetitions)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {len} bytes to {}", output.display());
    Ok(())
}
