//! Fetch exchange rates and balances for an account.
//!
//! ```bash
//! export COINPAYMENTS_PUBLIC_KEY=...
//! export COINPAYMENTS_PRIVATE_KEY=...
//! RUST_LOG=coinpayments=debug cargo run --example rates
//! ```

use coinpayments::{Client, OptionalValue};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinpayments=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let public_key = std::env::var("COINPAYMENTS_PUBLIC_KEY")?;
    let private_key = std::env::var("COINPAYMENTS_PRIVATE_KEY")?;
    let client = Client::new(public_key, private_key)?;

    let rates = client.rates([OptionalValue::new("accepted", "1")]).await?;
    let mut coins: Vec<_> = rates.iter().filter(|(_, rate)| rate.is_accepted()).collect();
    coins.sort_by(|a, b| a.0.cmp(b.0));

    for (ticker, rate) in coins {
        println!("{:>8}  {:<28} {} BTC", ticker, rate.name, rate.rate_btc);
    }

    match client.balances([]).await {
        Ok(balances) => {
            for (ticker, balance) in &balances {
                println!("{:>8}  balance {}", ticker, balance.balancef);
            }
        }
        Err(e) if e.api_message().is_some() => {
            tracing::warn!("Balances not available for this key: {}", e);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
