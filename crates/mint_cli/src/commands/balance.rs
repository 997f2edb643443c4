use anyhow::Result;
use clap::Args;

use mint_service::MintService;

#[derive(Debug, Args)]
pub struct BalanceArgs {
    #[arg(short, long)]
    pub identity: String,

    /// Also print every ledger entry and purchased document
    #[arg(long)]
    pub history: bool,
}

pub async fn execute(service: &MintService, args: BalanceArgs) -> Result<()> {
    let balance = service.get_balance(&args.identity).await?;
    println!("💰 {} coins", balance);

    if args.history {
        println!("📒 Ledger:");
        for entry in service.get_ledger_history(&args.identity).await? {
            let document = entry.document_id.map(|id| id.to_string()).unwrap_or_default();
            println!(
                "   #{:<6} {}  {:<14} {:>+6}  {}",
                entry.seq,
                entry.created_at.format("%Y-%m-%d %H:%M"),
                entry.kind,
                entry.amount,
                document
            );
        }

        println!("🧾 Purchased:");
        for receipt in service.list_receipts(&args.identity).await? {
            println!("   {}  {}  ({} coins)", receipt.document_id, receipt.file_name, receipt.coins_deducted);
        }
    }
    Ok(())
}
