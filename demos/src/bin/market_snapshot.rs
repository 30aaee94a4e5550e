//! Demo 1: Market Snapshot
//!
//! Showcases: public endpoints, decimal helpers on market data
//!
//! Run: cargo run --bin market_snapshot -- BTC_USDT

use bitpin_rest::BitpinRestClient;
use colored::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "BTC_USDT".to_string());

    println!("{}", "═".repeat(60).cyan());
    println!("{}", format!("  MARKET SNAPSHOT: {}", symbol).cyan().bold());
    println!("{}", "═".repeat(60).cyan());
    println!();

    let client = BitpinRestClient::new();

    let markets = client.get_markets().await?;
    match markets.iter().find(|m| m.symbol == symbol) {
        Some(market) => println!(
            "{} {} ({}/{}), price precision {}",
            "✓".green(),
            market.name,
            market.base,
            market.quote,
            market.price_precision
        ),
        None => {
            println!("{} Unknown market {}", "✗".red(), symbol);
            return Ok(());
        }
    }

    let tickers = client.get_tickers().await?;
    if let Some(ticker) = tickers.iter().find(|t| t.symbol == symbol) {
        println!(
            "  {} {}  {} {}  {} {}  {} {:+.2}%",
            "LAST:".yellow(),
            ticker.price,
            "LOW:".yellow(),
            ticker.low,
            "HIGH:".yellow(),
            ticker.high,
            "24H:".yellow(),
            ticker.daily_change_price
        );
    }

    let book = client.get_order_book(&symbol).await?;
    if let (Some(bid), Some(ask), Some(spread)) = (book.best_bid(), book.best_ask(), book.spread()) {
        println!(
            "  {} {}  {} {}  {} {}",
            "BID:".green(),
            bid,
            "ASK:".red(),
            ask,
            "SPREAD:".cyan(),
            spread
        );
    }

    println!();
    println!("{}", "  Recent trades".bold());
    for trade in client.get_recent_trades(&symbol).await?.iter().take(10) {
        let side = match trade.side {
            bitpin_types::Side::Buy => "BUY ".green(),
            bitpin_types::Side::Sell => "SELL".red(),
        };
        println!("  {} {} @ {}", side, trade.base_amount, trade.price);
    }

    Ok(())
}
