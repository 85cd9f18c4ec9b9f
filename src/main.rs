use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::Level;

use vm_translator::{driver, TranslatorConfig};

/// Translates VM code (a .vm file or a directory of them) into Hack assembly
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input .vm file or directory
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output .asm file (defaults to <input>.asm, or <dir>/<dir>.asm)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prefix each translated command with a `// <vm command>` comment
    #[arg(long)]
    annotate: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = TranslatorConfig {
        annotate: args.annotate,
    };
    let summary = driver::translate_path(&args.input, args.output.as_deref(), config)
        .with_context(|| format!("failed to translate {}", args.input.display()))?;

    println!(
        "Wrote {} ({} commands from {} file(s))",
        summary.output.display(),
        summary.commands,
        summary.sources.len()
    );
    Ok(())
}
