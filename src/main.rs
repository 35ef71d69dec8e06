mod cache;
mod classify;
mod commands;
mod config;
mod error;
mod filter;
mod heuristic;
mod oracle;
mod protocol;
mod source;
mod store;
mod tree;
mod types;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "refsift",
    about = "Read/write classification and tree grouping for Go symbol references"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify each reference in a JSON list as read/write/text
    Classify {
        /// Path to the JSON reference list
        refs: String,
        /// Highlight oracle command to consult before the heuristic
        #[arg(long)]
        oracle: Option<String>,
    },
    /// Print the references that survive classification filtering
    Filter {
        /// Path to the JSON reference list
        refs: String,
        /// Drop read references
        #[arg(long)]
        no_read: bool,
        /// Drop plain-text references
        #[arg(long)]
        no_text: bool,
        /// Drop write references
        #[arg(long)]
        no_write: bool,
        /// Only keep references under this path
        #[arg(long)]
        scope: Option<String>,
        /// Treat --scope as a directory instead of a file
        #[arg(long, requires = "scope")]
        dir: bool,
        /// Highlight oracle command to consult before the heuristic
        #[arg(long)]
        oracle: Option<String>,
    },
    /// Speak the JSON-lines protocol over stdin/stdout
    Serve {
        /// Highlight oracle command to consult before the heuristic
        #[arg(long)]
        oracle: Option<String>,
    },
    /// Print the compressed reference tree for a JSON list
    Tree {
        /// Path to the JSON reference list
        refs: String,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Classify { refs, oracle } => commands::classify(&refs, oracle.as_deref()),
        Commands::Filter { refs, no_read, no_text, no_write, scope, dir, oracle } => {
            commands::filter(
                &refs,
                no_read,
                no_text,
                no_write,
                scope.as_deref(),
                dir,
                oracle.as_deref(),
            )
        },
        Commands::Serve { oracle } => commands::serve(oracle.as_deref()),
        Commands::Tree { refs } => commands::print_tree(&refs),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Log to stderr, `RUST_LOG`-filtered, warnings by default. Stdout is
/// reserved for command output and the serve protocol.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
