use anyhow::{anyhow, Result};
use clap::Parser;
use colored::Colorize;
use limit_order_sdk::codec::{build_signable_order, parse_address, settlement_address};
use limit_order_sdk::domain::{expiry_after, now_ts, time_remaining, OrderInput};

/// Builds an order offline and prints its signable data and orderHash.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value_t = 1)]
    chain_id: u64,

    /// Settlement contract; defaults to the known deployment for the chain
    #[arg(long)]
    verifying_contract: Option<String>,

    #[arg(long)]
    maker: String,

    #[arg(long)]
    maker_asset: String,

    #[arg(long)]
    taker_asset: String,

    /// Base units
    #[arg(long)]
    maker_amount: String,

    /// Base units
    #[arg(long)]
    taker_amount: String,

    #[arg(long)]
    taker: Option<String>,

    #[arg(long, default_value_t = 1)]
    nonce: u128,

    /// Lifetime in seconds; 0 never expires
    #[arg(long, default_value_t = 604800)]
    ttl: i64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let verifying_contract = match args.verifying_contract.as_deref() {
        Some(address) => parse_address("verifyingContract", address)?,
        None => settlement_address(args.chain_id)
            .ok_or_else(|| anyhow!("no settlement contract known for chain {}", args.chain_id))?,
    };

    let expiry = if args.ttl == 0 {
        0
    } else {
        expiry_after(chrono::Duration::seconds(args.ttl))
    };

    let input = OrderInput {
        nonce: args.nonce,
        expiry,
        maker_asset: args.maker_asset,
        taker_asset: args.taker_asset,
        maker_amount: args.maker_amount,
        taker_amount: args.taker_amount,
        maker: args.maker,
        taker: args.taker,
    };

    let signable = build_signable_order(
        &input,
        input.nonce,
        args.chain_id,
        verifying_contract,
        now_ts(),
    )?;

    println!("{}", serde_json::to_string_pretty(&signable)?);
    println!();
    println!("{} {}", "orderHash".bold(), signable.order_hash().green());
    println!("{} {}", "expires".bold(), time_remaining(signable.data.expiry));

    Ok(())
}
