use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use uuid::Uuid;

use mint_service::MintService;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Document UUID
    #[arg(short, long)]
    pub document: Uuid,

    /// Where to write the preview PDF
    #[arg(short, long, default_value = "preview.pdf")]
    pub out: PathBuf,
}

pub async fn execute(service: &MintService, args: PreviewArgs) -> Result<()> {
    println!("👀 Rendering Preview...");
    let preview = service.get_preview(args.document).await?;

    tokio::fs::write(&args.out, &preview.bytes)
        .await
        .with_context(|| format!("Failed to write preview to {:?}", args.out))?;

    for degradation in &preview.degradations {
        println!("   ⚠️  {}", degradation);
    }
    println!("✅ Preview written to {:?} ({} pages)", args.out, preview.page_count);
    Ok(())
}
