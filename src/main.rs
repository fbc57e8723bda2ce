//! Batch Editor CLI
//!
//! An interactive shell for inspecting and editing fixed-width batch files.
//! Commands are read from stdin, one per line.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --data-dir files batch.txt
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use batch_editor::{Flow, LockConfig, Result, Shell};
use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;

/// Interactive editor for fixed-width batch files
#[derive(Parser, Debug)]
#[command(name = "batch-editor")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the lock configuration file
    #[arg(long, default_value = "lock_config.json")]
    lock_config: PathBuf,

    /// Directory that `load` filenames are resolved against
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Batch file to load on startup
    file: Option<String>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let locks = LockConfig::load(&cli.lock_config)?;

    let stdout = io::stdout();
    let mut shell = Shell::new(stdout.lock(), cli.data_dir, cli.lock_config, locks);

    shell.intro()?;
    if let Some(file) = cli.file {
        shell.load(&[file.as_str()])?;
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        shell.prompt()?;
        let Some(line) = lines.next() else {
            break;
        };
        if shell.execute(&line?)? == Flow::Quit {
            break;
        }
    }

    Ok(())
}
