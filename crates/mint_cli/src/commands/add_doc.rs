use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use mint_core::models::UploaderKind;
use mint_service::documents::UploadParams;
use mint_service::MintService;

#[derive(Debug, Args)]
pub struct AddDocArgs {
    /// Path to the file (e.g. ./calculus-notes.pdf)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Title shown in the catalog (e.g. "Calculus I Notes")
    #[arg(short, long)]
    pub title: String,

    /// Declared content type; inferred from the extension when omitted
    #[arg(long)]
    pub content_type: Option<String>,

    /// Who uploaded it: admin or user
    #[arg(long, default_value = "admin")]
    pub uploader: UploaderKind,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub section: Option<String>,

    /// Repeatable (e.g. --tag exam --tag 2024)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

pub async fn execute(service: &MintService, args: AddDocArgs) -> Result<()> {
    println!("📎 Uploading Document...");

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to open file: {:?}", args.file))?;
    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let document = service
        .upload_document(UploadParams {
            display_name: args.title,
            file_name,
            content_type: args.content_type,
            bytes,
            uploader_kind: args.uploader,
            category: args.category,
            section: args.section,
            tags: args.tags,
        })
        .await?;

    println!("   Blob:   {}", document.blob_key);
    println!("   Type:   {} ({} bytes)", document.content_type, document.byte_size);
    println!("✅ Document Registered. UUID: {}", document.id);
    Ok(())
}
