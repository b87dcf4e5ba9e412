//! quizflow CLI: a terminal host for quiz sessions.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use quizflow_core::AdvancePolicy;

mod commands;

#[derive(Parser)]
#[command(name = "quizflow", version, about = "Sequential agreement quiz for couples")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the participation flag (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a question set interactively
    Play {
        /// Path to a .toml or .json question set
        #[arg(long)]
        questions: PathBuf,

        /// Write a session report here when the session ends (markdown for .md, JSON otherwise)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Advance policy: require-answer, require-check, unrestricted
        #[arg(long)]
        policy: Option<AdvancePolicy>,
    },

    /// Validate question set files
    Validate {
        /// Path to question set file or directory
        #[arg(long)]
        questions: PathBuf,
    },

    /// Show whether the participation flag is set
    Status,

    /// Clear the participation flag
    Reset,

    /// Create starter config and example question set
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizflow=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context {
        config_path: cli.config,
        data_dir: cli.data_dir,
    };

    let result = match cli.command {
        Commands::Play {
            questions,
            output,
            policy,
        } => commands::play::execute(&ctx, questions, output, policy).await,
        Commands::Validate { questions } => commands::validate::execute(questions),
        Commands::Status => commands::status::execute(&ctx),
        Commands::Reset => commands::reset::execute(&ctx),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
