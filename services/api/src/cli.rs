use crate::inspect::{run_inspect, InspectArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use clarification::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ClarificatION",
    about = "Explore ESG ratings, test score scenarios and read analyst commentary",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the dashboard HTTP service (default command)
    Serve(ServeArgs),
    /// Print a company card and its model prediction to the terminal
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
}

/// Dataset and model overrides shared by every command.
#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Company dataset CSV
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
    /// Rating model artifact (JSON)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Feature scaler artifact (JSON)
    #[arg(long)]
    pub(crate) scaler: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Inspect(args) => run_inspect(args).await,
    }
}
