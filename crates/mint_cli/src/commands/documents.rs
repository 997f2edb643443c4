use anyhow::Result;
use clap::Args;

use mint_service::MintService;

#[derive(Debug, Args)]
pub struct DocumentsArgs {
    /// Only show documents in this category
    #[arg(long)]
    pub category: Option<String>,
}

pub async fn execute(service: &MintService, args: DocumentsArgs) -> Result<()> {
    let documents: Vec<_> = service
        .list_documents()
        .await?
        .into_iter()
        .filter(|d| args.category.is_none() || d.category == args.category)
        .collect();

    println!("📚 {} document(s)", documents.len());
    for doc in documents {
        println!(
            "   {}  {:<40} {:>9} bytes  {}",
            doc.id,
            doc.display_name,
            doc.byte_size,
            doc.uploaded_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
