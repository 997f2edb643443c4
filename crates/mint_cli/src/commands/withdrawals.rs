use anyhow::Result;
use clap::Args;

use mint_core::models::WithdrawStatus;
use mint_service::MintService;

#[derive(Debug, Args)]
pub struct WithdrawalsArgs {
    /// pending, approved or rejected
    #[arg(long)]
    pub status: Option<WithdrawStatus>,
}

pub async fn execute(service: &MintService, args: WithdrawalsArgs) -> Result<()> {
    let requests = service.list_withdrawals(args.status).await?;
    println!("🏦 {} withdrawal request(s)", requests.len());
    for request in requests {
        println!(
            "   {}  {:<9} {:>6}  {}  → {}",
            request.id, request.status, request.amount, request.identity, request.payout_address
        );
    }
    Ok(())
}
