use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use uuid::Uuid;

use mint_service::MintService;

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Buyer identity
    #[arg(short, long)]
    pub identity: String,

    /// Document UUID
    #[arg(short, long)]
    pub document: Uuid,

    /// Output directory; the file keeps its attachment name
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
}

pub async fn execute(service: &MintService, args: DownloadArgs) -> Result<()> {
    println!("📥 Purchasing and Downloading...");
    let delivery = service.purchase_and_download(&args.identity, args.document).await?;

    if delivery.grant.replayed {
        println!("   ♻️  Already purchased, no coins charged.");
    } else {
        println!("   🪙 Charged {} coins.", delivery.grant.receipt.coins_deducted);
    }

    tokio::fs::create_dir_all(&args.out_dir).await?;
    let path = args.out_dir.join(&delivery.file_name);
    tokio::fs::write(&path, &delivery.bytes)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;

    println!("✅ Saved {:?}", path);
    Ok(())
}
