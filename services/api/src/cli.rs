use crate::demo::{run_demo, run_import, DemoArgs, ImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use realty_market::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Realty Market",
    about = "Run the property listing marketplace service or explore it from the command line",
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
    /// Walk through submission, review, browsing and the admin dashboard
    Demo(DemoArgs),
    /// Validate a listing CSV and submit every row for review
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Preload listings from a CSV export before accepting requests
    #[arg(long)]
    pub(crate) seed_csv: Option<PathBuf>,
    /// Uid recorded as submitter of preloaded listings
    #[arg(long, default_value = "seed-importer")]
    pub(crate) seed_owner: String,
    /// Grant admin rights to this uid at startup (repeatable)
    #[arg(long = "admin", value_name = "UID")]
    pub(crate) admins: Vec<String>,
    /// Register the demo seller, buyer and admin accounts (implied by --seed-csv)
    #[arg(long)]
    pub(crate) demo_accounts: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
        Command::Import(args) => run_import(args).await,
    }
}
