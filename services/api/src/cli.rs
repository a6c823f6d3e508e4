use crate::demo::{run_assess, run_batch, run_demo, AssessArgs, BatchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use guardian_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Guardian Risk",
    about = "Score personal-safety risk for geolocated situations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a single situation and print the result as JSON
    Assess(AssessArgs),
    /// Score every situation in a CSV file
    Batch(BatchArgs),
    /// Walk the reference scenarios through the decision engine
    Demo,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Batch(args) => run_batch(args),
        Command::Demo => run_demo(),
    }
}
