//! studydash CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "studydash",
    version,
    about = "AI tutor and study-score tracker"
)]
struct Cli {
    #[command(flatten)]
    globals: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding per-user stats (overrides `data_dir` in the config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter studydash.toml
    Init,

    /// Create a default stats record for a user
    Enroll {
        /// User id
        #[arg(long)]
        user: String,
    },

    /// Record one answered question
    #[command(group(
        ArgGroup::new("outcome")
            .required(true)
            .args(["correct", "incorrect"])
    ))]
    Answer {
        /// User id
        #[arg(long)]
        user: String,

        /// Subject of the question (defaults to "General")
        #[arg(long)]
        subject: Option<String>,

        /// The answer was correct
        #[arg(long)]
        correct: bool,

        /// The answer was wrong
        #[arg(long)]
        incorrect: bool,
    },

    /// Ask the tutor a question and print its validated reply as JSON
    Ask {
        /// Message to send
        #[arg(long)]
        message: String,

        /// Always request a quiz
        #[arg(long, conflicts_with = "chat")]
        quiz: bool,

        /// Always request a conversational reply
        #[arg(long)]
        chat: bool,
    },

    /// Show a user's points, average, and subject scores
    Stats {
        /// User id
        #[arg(long)]
        user: String,
    },

    /// List models offered by the configured providers
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("studydash=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let globals = cli.globals;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Enroll { user } => commands::enroll::execute(&globals, &user).await,
        Commands::Answer {
            user,
            subject,
            correct,
            incorrect: _,
        } => commands::answer::execute(&globals, &user, subject, correct).await,
        Commands::Ask {
            message,
            quiz,
            chat,
        } => commands::ask::execute(&globals, &message, quiz, chat).await,
        Commands::Stats { user } => commands::stats::execute(&globals, &user).await,
        Commands::ListModels { provider } => {
            commands::list_models::execute(&globals, provider).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
