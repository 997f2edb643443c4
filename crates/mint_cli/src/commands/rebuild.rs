use anyhow::Result;
use clap::Args;
use sqlx::PgPool;

use mint_db::schema::rebuild_database;

#[derive(Debug, Args)]
pub struct RebuildArgs {
    /// DANGER: Drop existing tables before rebuilding?
    #[arg(long)]
    pub reset: bool,
}

pub async fn execute(pool: PgPool, args: RebuildArgs) -> Result<()> {
    println!("🏗️  Rebuilding Database Schema...");
    if args.reset {
        println!("🔥 Reset requested. Dropping ledger, receipts and catalog...");
    }

    rebuild_database(&pool, args.reset).await?;

    println!("✅ Database Schema Applied Successfully.");
    Ok(())
}
