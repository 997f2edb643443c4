use anyhow::Result;
use clap::Args;

use mint_service::MintService;

#[derive(Debug, Args)]
pub struct WithdrawArgs {
    #[arg(short, long)]
    pub identity: String,

    /// Coins to redeem
    #[arg(short, long)]
    pub amount: i64,

    /// Where the payout goes (e.g. a UPI handle)
    #[arg(short, long)]
    pub payout: String,
}

pub async fn execute(service: &MintService, args: WithdrawArgs) -> Result<()> {
    let request = service.request_withdrawal(&args.identity, args.amount, &args.payout).await?;
    let balance = service.get_balance(&args.identity).await?;

    println!("🏦 Withdrawal {} is {}", request.id, request.status);
    println!("   Held {} coins. Remaining balance: {}", request.amount, balance);
    Ok(())
}
