//! tipyconv - convert between plain text and TI Python AppVar (8xv) files.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use tipyconv::convert::{self, Format, Options};

#[derive(Parser)]
#[command(
    name = "tipyconv",
    version,
    about = "Convert between plain text and TI Python AppVar (8xv) files"
)]
struct Cli {
    /// Input file
    input: PathBuf,

    /// Output path of the conversion
    #[arg(short, long)]
    outfile: Option<PathBuf>,

    /// Format of the input file (text, 8xv)
    #[arg(short, long)]
    format: Option<String>,

    /// Format of the output file (text, 8xv)
    #[arg(short = 't', long)]
    target_format: Option<String>,

    /// Name of the variable on the calculator (text -> 8xv only)
    #[arg(short = 'N', long)]
    varname: Option<String>,

    /// Long file name stored inside the payload (text -> 8xv only)
    #[arg(short = 'F', long)]
    filename: Option<String>,

    /// Comment stored in the container header (text -> 8xv only)
    #[arg(long)]
    comment: Option<String>,

    /// Dump the container fields instead of converting
    #[arg(short = 'd', long)]
    inspect: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn parse_format(name: &str) -> anyhow::Result<Format> {
    Format::from_name(name)
        .ok_or_else(|| anyhow::anyhow!("unknown format `{name}` (expected text or 8xv)"))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.inspect {
        let data = fs::read(&cli.input)?;
        println!("{}", convert::disassemble(&data)?);
        return Ok(());
    }

    let opts = Options {
        output: cli.outfile,
        format: cli.format.as_deref().map(parse_format).transpose()?,
        target_format: cli.target_format.as_deref().map(parse_format).transpose()?,
        var_name: cli.varname.map(String::into_bytes),
        long_name: cli.filename.map(String::into_bytes),
        comment: cli.comment.map(String::into_bytes),
    };

    let output = convert::convert(&cli.input, &opts)?;
    if cli.verbose {
        println!("{} -> {}", cli.input.display(), output.display());
    }

    Ok(())
}
