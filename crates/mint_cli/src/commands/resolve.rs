use anyhow::Result;
use clap::Args;
use uuid::Uuid;

use mint_core::models::{Decision, WithdrawStatus};
use mint_service::MintService;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Withdrawal request UUID
    #[arg(short, long)]
    pub request: Uuid,

    /// approve or reject
    #[arg(short, long)]
    pub decision: Decision,
}

pub async fn execute(service: &MintService, args: ResolveArgs) -> Result<()> {
    let request = service.resolve_withdrawal(args.request, args.decision).await?;

    match request.status {
        WithdrawStatus::Rejected => println!("↩️  Rejected. {} coins refunded to {}", request.amount, request.identity),
        _ => println!("✅ Approved. Pay {} coins to {}", request.amount, request.payout_address),
    }
    Ok(())
}
