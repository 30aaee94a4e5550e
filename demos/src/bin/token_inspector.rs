//! Demo 2: Token Inspector
//!
//! Showcases: offline token decoding and lifecycle state
//!
//! Run: BITPIN_ACCESS_TOKEN=... BITPIN_REFRESH_TOKEN=... cargo run --bin token_inspector

use bitpin_auth::{ApiKeyPair, CredentialStore, DecodedToken, TokenKind, TokenStatus};
use colored::*;
use std::time::Duration;

fn main() {
    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  TOKEN INSPECTOR".cyan().bold());
    println!("{}", "═".repeat(60).cyan());

    let access = std::env::var(bitpin_auth::ACCESS_TOKEN_ENV).unwrap_or_default();
    let refresh = std::env::var(bitpin_auth::REFRESH_TOKEN_ENV).unwrap_or_default();
    let mut store = CredentialStore::new().with_tokens(access, refresh);

    if let (Ok(key), Ok(secret)) = (
        std::env::var(bitpin_auth::API_KEY_ENV),
        std::env::var(bitpin_auth::SECRET_KEY_ENV),
    ) {
        store = store.with_api_keys(ApiKeyPair::new(key, secret));
    }

    for kind in [TokenKind::Access, TokenKind::Refresh] {
        println!();
        println!("{}", format!("  {} token", kind).bold());
        match store.decode(kind) {
            None => println!("  {} not set", "-".dimmed()),
            Some(Err(e)) => println!("  {} {}", "✗".red(), e),
            Some(Ok(token)) => describe(&token),
        }
    }

    println!();
    let status = store.status();
    let label = match status {
        TokenStatus::AccessValid => "ready".green(),
        TokenStatus::AccessExpired => "access token needs a refresh".yellow(),
        TokenStatus::RefreshExpired => "will re-authenticate with API keys".yellow(),
        TokenStatus::NoCredentials => "expired, no API keys to log in with".red(),
        TokenStatus::Unauthenticated => "no tokens".dimmed(),
        TokenStatus::Malformed(_) => "malformed token".red(),
    };
    println!("  {} {}", "Status:".bold(), label);
}

fn describe(token: &DecodedToken) {
    for line in token.to_string().lines() {
        println!("  {}", line);
    }

    if token.is_expired() {
        println!("  {} expired", "✗".red());
    } else if token.is_expiring_within(Duration::from_secs(300)) {
        println!(
            "  {} expires in {}s",
            "!".yellow(),
            token.time_until_expiry().as_secs()
        );
    } else {
        println!(
            "  {} valid for {}s",
            "✓".green(),
            token.time_until_expiry().as_secs()
        );
    }
}
