//! Demo 3: Account Summary
//!
//! Showcases: login from environment, automatic token refresh, private endpoints
//!
//! Run: BITPIN_API_KEY=... BITPIN_SECRET_KEY=... cargo run --bin account_summary

use bitpin_rest::{BitpinRestClient, ClientConfig};
use bitpin_types::{OrdersHistoryParams, UserTradesParams, WalletParams};
use colored::*;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  ACCOUNT SUMMARY".cyan().bold());
    println!("{}", "═".repeat(60).cyan());
    println!();

    let client = BitpinRestClient::connect(ClientConfig::from_env()?).await?;
    println!("{} Authenticated ({:?})", "✓".green(), client.token_status());

    let wallets = client.get_wallets(&WalletParams::new()).await?;
    println!();
    println!("{}", "  Wallets".bold());
    for wallet in wallets
        .iter()
        .filter(|w| w.balance_decimal().unwrap_or(Decimal::ZERO) > Decimal::ZERO)
    {
        println!(
            "  {:<8} {:>20} {} {}",
            wallet.asset.yellow(),
            wallet.balance,
            "available:".dimmed(),
            wallet.available().unwrap_or(Decimal::ZERO)
        );
    }

    let open = client.get_open_orders(&OrdersHistoryParams::new()).await?;
    println!();
    println!("{} {}", "  Open orders:".bold(), open.len());
    for order in &open {
        println!(
            "  #{} {} {} {} @ {} ({})",
            order.id,
            order.symbol,
            order.side,
            order.base_amount,
            order.price,
            order.order_type
        );
    }

    let fills = client
        .get_user_trades(&UserTradesParams::new().page(0, 5))
        .await?;
    println!();
    println!("{}", "  Latest fills".bold());
    for fill in &fills {
        println!(
            "  {} {} {} @ {} fee {} {}",
            fill.created_at.format("%Y-%m-%d %H:%M"),
            fill.symbol,
            fill.base_amount,
            fill.price,
            fill.commission,
            fill.commission_currency
        );
    }

    Ok(())
}
