use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use netview::EditorConfig;

#[derive(Parser)]
#[command(name = "netview", about = "Map network documents to graph-editor display state and back")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Project a network document into display state
    Display {
        /// Network JSON file (reads from stdin if not provided)
        file: Option<PathBuf>,
    },
    /// Reconcile display state back into a network document
    Network {
        /// Display JSON file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Network to merge into (default: empty network)
        #[arg(long, short = 'b')]
        base: Option<PathBuf>,
    },
    /// Load a network, run an editor script and print the result
    Edit {
        /// Network JSON file
        network: PathBuf,

        /// Command script (reads from stdin if not provided)
        #[arg(long, short = 's')]
        script: Option<PathBuf>,

        /// Editor options as JSON
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
    /// Print node and edge tables for a network
    Show {
        /// Network JSON file (reads from stdin if not provided)
        file: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    }
}

fn run(command: Cmd) -> Result<String, String> {
    match command {
        Cmd::Display { file } => {
            netview::display_json(&read_input(file.as_deref())?).map(with_newline)
        }
        Cmd::Network { file, base } => {
            let display = read_input(file.as_deref())?;
            let base = base.as_deref().map(read_file).transpose()?;
            netview::network_json(&display, base.as_deref()).map(with_newline)
        }
        Cmd::Edit {
            network,
            script,
            config,
        } => {
            let network = read_file(&network)?;
            let script = read_input(script.as_deref())?;
            let config = match config {
                Some(path) => EditorConfig::from_json(&read_file(&path)?)?,
                None => EditorConfig::default(),
            };
            let edited = netview::edit(&network, &script, config)?;
            serde_json::to_string_pretty(&edited)
                .map(with_newline)
                .map_err(|e| format!("failed to write JSON: {e}"))
        }
        Cmd::Show { file } => netview::show(&read_input(file.as_deref())?),
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
}

fn read_input(file: Option<&Path>) -> Result<String, String> {
    match file {
        Some(path) => read_file(path),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            Ok(buf)
        }
    }
}

fn with_newline(mut s: String) -> String {
    s.push('\n');
    s
}
