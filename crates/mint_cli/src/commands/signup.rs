use anyhow::Result;
use clap::Args;

use mint_service::MintService;

#[derive(Debug, Args)]
pub struct SignupArgs {
    /// Verified identity (email) of the new account
    #[arg(short, long)]
    pub identity: String,
}

pub async fn execute(service: &MintService, args: SignupArgs) -> Result<()> {
    let user = service.register_user(&args.identity).await?;
    println!("👤 Registered {}", user.identity);
    println!("✅ Signup bonus credited. Balance: {} coins", user.balance);
    Ok(())
}
