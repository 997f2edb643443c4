// mint_cli/src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use mint_cli::commands;
use mint_service::config::Config;
use mint_service::MintService;

#[derive(Parser)]
#[command(name = "mint")]
#[command(about = "StudyMint paywalled document backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the database schema from embedded assets
    Rebuild(commands::rebuild::RebuildArgs),

    /// Upload a document into the catalog
    AddDoc(commands::add_doc::AddDocArgs),

    /// List the catalog, newest first
    Documents(commands::documents::DocumentsArgs),

    /// Register an account and credit the signup bonus
    Signup(commands::signup::SignupArgs),

    /// Show a balance, optionally with the full ledger
    Balance(commands::balance::BalanceArgs),

    /// Render the free watermarked preview of a document
    Preview(commands::preview::PreviewArgs),

    /// Buy (or re-download) a document stamped with the buyer's identity
    Download(commands::download::DownloadArgs),

    /// Request a payout of coins
    Withdraw(commands::withdraw::WithdrawArgs),

    /// List withdrawal requests
    Withdrawals(commands::withdrawals::WithdrawalsArgs),

    /// Approve or reject a pending withdrawal
    Resolve(commands::resolve::ResolveArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // 1. Load Config (Fails fast if invalid)
    let config = Config::from_env()?;

    // 2. Parse arguments and route to the correct command
    let cli = Cli::parse();

    match cli.command {
        Commands::Rebuild(args) => {
            // Schema work only needs the database.
            let pool = PgPoolOptions::new()
                .max_connections(1)
                .connect(&config.database_url)
                .await
                .context("Failed to connect to Postgres")?;
            commands::rebuild::execute(pool, args).await?;
        }
        command => {
            let service = MintService::connect(&config).await?;
            run(&service, command).await?;
        }
    }

    Ok(())
}

async fn run(service: &MintService, command: Commands) -> Result<()> {
    match command {
        Commands::Rebuild(_) => anyhow::bail!("rebuild runs without the service"),
        Commands::AddDoc(args) => commands::add_doc::execute(service, args).await,
        Commands::Documents(args) => commands::documents::execute(service, args).await,
        Commands::Signup(args) => commands::signup::execute(service, args).await,
        Commands::Balance(args) => commands::balance::execute(service, args).await,
        Commands::Preview(args) => commands::preview::execute(service, args).await,
        Commands::Download(args) => commands::download::execute(service, args).await,
        Commands::Withdraw(args) => commands::withdraw::execute(service, args).await,
        Commands::Withdrawals(args) => commands::withdrawals::execute(service, args).await,
        Commands::Resolve(args) => commands::resolve::execute(service, args).await,
    }
}
