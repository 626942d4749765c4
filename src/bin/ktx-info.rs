//! Prints the header and mip layout of a KTX 1.1 file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ktx::backend::Recorder;
use ktx::{classify_target, load, read_header, walk_mip_chain};

#[derive(Parser)]
#[command(name = "ktx-info")]
#[command(about = "Inspect a KTX 1.1 texture container")]
#[command(version)]
struct Cli {
    /// KTX file to inspect
    path: PathBuf,

    /// Replay the load against a recording backend and print each call
    #[arg(long)]
    dry_run: bool,

    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let header = read_header(&cli.path)
        .with_context(|| format!("reading header of {}", cli.path.display()))?;
    println!("{:#?}", header);

    let target = classify_target(&header).context("classifying texture target")?;
    println!(
        "target: {:?} ({}D storage, {} levels)",
        target,
        target.storage_dimensions(),
        header.level_count()
    );

    for descriptor in walk_mip_chain(&header, target)? {
        let d = descriptor.context("walking mip chain")?;
        let face = d.face.map(|f| format!(" face {f}")).unwrap_or_default();
        println!(
            "level {}{}: {}x{}x{} at +{} ({} bytes)",
            d.level_index, face, d.width, d.height, d.depth, d.byte_offset, d.byte_length
        );
    }

    if cli.dry_run {
        let mut backend = Recorder::new();
        let result = load(&mut backend, &cli.path, None);
        for call in &backend.calls {
            println!("{call}");
        }
        result.with_context(|| format!("loading {}", cli.path.display()))?;
    }

    Ok(())
}
