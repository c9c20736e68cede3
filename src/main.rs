use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use epkextract::dispatch::{self, Resolution};
use epkextract::error::ExtractError;
use epkextract::{keys, AppContext};

#[derive(Parser, Debug)]
#[command(version, about = "LG digital TV firmware (EPK) extractor")]
struct Args {
    /// Firmware file to extract
    input_target: PathBuf,

    /// Extract into the current directory instead of next to the input
    #[arg(short = 'c', long)]
    current_dir: bool,

    /// AES key file (default: AES.key next to the executable)
    #[arg(short = 'k', long)]
    keys: Option<PathBuf>,

    /// Longest chain of nested formats to follow
    #[arg(long, default_value_t = dispatch::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn config_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    println!("epkextract Firmware extractor");

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    println!("Input target: {}", args.input_target.display());

    let output_dir = if args.current_dir {
        match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("Cannot get the current directory: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        match args.input_target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    };
    println!("Output folder: {}", output_dir.display());

    let config_dir = config_dir();
    let key_file = args.keys.unwrap_or_else(|| config_dir.join("AES.key"));
    let app_ctx = AppContext {
        output_dir,
        keys: keys::load_keys(&key_file),
        config_dir,
        max_depth: args.max_depth,
    };

    match dispatch::resolve(&app_ctx, &args.input_target) {
        Ok(Resolution::Extracted { chain, last }) => {
            println!("\nExtraction finished! ({}; last output {})", chain.join(" -> "), last.display());
            ExitCode::SUCCESS
        }
        Ok(Resolution::Unrecognized) => {
            eprintln!("Error: {}", ExtractError::UnrecognizedFormat(args.input_target));
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
