use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use stackimport::config::Config;
use stackimport::import::StackImporter;

/// Imports a legacy binary stack-document file into a textual XML/CSS/PBM
/// project directory.
#[derive(Parser, Debug)]
#[command(name = "stackimport", version, about)]
struct Cli {
    /// Input stack file.
    input: PathBuf,

    /// Output project directory. Defaults to `<input>.xstk`.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Also write `<TYPE>_<id>.data` beside the decoded artifacts.
    #[arg(long)]
    dump_raw_blocks: bool,

    /// Suppress the `Status: ...` diagnostic stream.
    #[arg(long)]
    quiet_status: bool,

    /// Suppress the `Progress: M of N` diagnostic stream.
    #[arg(long)]
    quiet_progress: bool,

    /// Write raw `BMAP_<id>.raw` payloads instead of decoding bitmaps.
    #[arg(long)]
    no_decode_graphics: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let out_dir = cli.out_dir.clone().unwrap_or_else(|| {
        let mut dir = cli.input.clone();
        dir.set_extension("xstk");
        dir
    });

    let config = Config {
        dump_raw_blocks: cli.dump_raw_blocks,
        quiet_status: cli.quiet_status,
        quiet_progress: cli.quiet_progress,
        decode_graphics: !cli.no_decode_graphics,
        ..Config::default()
    };

    let file = match File::open(&cli.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("stackimport: could not open {}: {e}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    let importer = StackImporter::new(config);
    match importer.import(BufReader::new(file), &out_dir) {
        Ok(warnings) => {
            if warnings > 0 {
                eprintln!("stackimport: completed with {warnings} warning(s)");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("stackimport: {e}");
            ExitCode::FAILURE
        }
    }
}
