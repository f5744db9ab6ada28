//! Keyscope CLI
//!
//! Prints the key paths found across a project's YAML documents.
//!
//! ## Commands
//!
//! - `keys` - Merged key set (`path<TAB>item` or JSON)
//! - `files` - Indexed files with entry counts
//! - `watch` - Keep the index live and report every update

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod command;

#[derive(Parser, Debug)]
#[command(name = "keyscope", version, about = "Live index of YAML key paths")]
struct Cli {
    /// Config file (defaults to <ROOT>/.keyscope.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the merged key set
    Keys {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Only keys under this path (`a/b` or `a.b`)
        #[arg(short, long)]
        prefix: Option<String>,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// List indexed files and their entry counts
    Files {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Index the project, then follow file changes until Ctrl-C
    Watch {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Report the key count under this path
        #[arg(short, long)]
        prefix: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // stdout carries command output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Keys { root, prefix, json } => {
            let open = command::open_project(&root, config).await?;
            command::keys::run(&open, prefix.as_deref(), json)
        }
        Commands::Files { root, json } => {
            let open = command::open_project(&root, config).await?;
            command::files::run(&open, json)
        }
        Commands::Watch { root, prefix } => {
            let open = command::open_project(&root, config).await?;
            command::watch::run(open, prefix).await
        }
    }
}
