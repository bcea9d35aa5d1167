use limit_order_sdk::*;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::Colorize;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, TxHash};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use config::{Args, Config, OrderSettings};
use domain::{format_units, now_ts, time_remaining};
use logging::log_success;

type Caller = EthersContractCaller<Provider<Http>, LocalWallet>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    info!("🚀 Starting limit order client");

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    let read_only = Config::is_read_only();

    // ===============================
    // PROVIDER + SIGNER
    // ===============================
    let rpc_url = std::env::var("RPC_URL").context("RPC_URL missing in .env")?;
    let private_key = std::env::var("PRIVATE_KEY").context("PRIVATE_KEY missing in .env file")?;

    let provider = Provider::<Http>::try_from(rpc_url.as_str())?;
    let chain_id = provider.get_chainid().await?.as_u64();
    if chain_id != config.sdk.chain_id {
        return Err(anyhow!(
            "RPC is on chain {} but config expects {}",
            chain_id,
            config.sdk.chain_id
        ));
    }

    let wallet: LocalWallet = private_key.parse::<LocalWallet>()?.with_chain_id(chain_id);
    let client = Arc::new(SignerMiddleware::new(provider, wallet));
    let caller: Caller = EthersContractCaller::new(client);
    let account = caller.account();

    info!("🔑 Signer loaded: {:?}", account);
    if read_only {
        warn!("👀 READ_ONLY mode: nothing will be sent on chain or posted");
    }

    // ===============================
    // SDK
    // ===============================
    let fetcher = ReqwestFetcher::with_timeout(Duration::from_secs(config.sdk.http_timeout_secs))?;
    let sdk_config = config
        .sdk
        .to_sdk_config()?
        .with_fetcher(fetcher)
        .with_contract_caller(caller.clone());

    match args.fill {
        Some(order_hash) => {
            let sdk = partial_sdk!(
                sdk_config,
                construct_get_limit_orders,
                construct_fill_limit_order,
                construct_approve_token_for_limit_order,
            );
            run_taker(&sdk, &caller, &config, &order_hash, args.fill_amount, read_only).await
        }
        None => {
            let sdk = construct_full_sdk(sdk_config);
            run_maker(&sdk, &caller, &config, read_only).await
        }
    }
}

// ===============================
// MAKER FLOW
// ===============================
async fn run_maker(
    sdk: &PartialSdk<TxHash>,
    caller: &Caller,
    config: &Config,
    read_only: bool,
) -> Result<()> {
    let account = caller.account();

    // cancel what is still open
    let open = sdk
        .get_limit_orders(LimitOrdersFilter::default().maker(account).status(OrderStatus::Limit))
        .await?;
    info!(
        "📋 {} open order(s) for {:?} on chain {}",
        open.len(),
        account,
        sdk.chain_id()
    );
    for order in &open {
        print_order(order, &config.order);
    }

    if let Some(first) = open.first() {
        if read_only {
            info!("would cancel {}", first.order_hash);
        } else {
            let tx = sdk.cancel_limit_order(first.order_hash.as_str()).await?;
            log_success(&format!("cancelOrder tx {:?}", tx));
        }
    }

    let more: Vec<String> = open
        .iter()
        .skip(1)
        .take(1)
        .map(|order| order.order_hash.clone())
        .collect();
    if !more.is_empty() {
        if read_only {
            info!("would bulk cancel {:?}", more);
        } else {
            let tx = sdk.cancel_limit_order_bulk(more).await?;
            log_success(&format!("cancelOrders tx {:?}", tx));
        }
    }

    // new order
    let input = config.order.to_order_input(account, now_ts())?;
    ensure_allowance(sdk, caller, &input.maker_asset, &input.maker_amount, read_only).await?;

    let signable = sdk.build_limit_order(input).await?;
    info!("🧾 Built order {}", signable.order_hash());

    let signature = sdk.sign_limit_order(signable.clone()).await?;
    let to_send = to_limit_order_to_send(&signable, signature);

    if read_only {
        println!("{}", serde_json::to_string_pretty(&to_send)?);
        return Ok(());
    }

    let posted = sdk.post_limit_order(to_send).await?;
    println!("{} {}", "POSTED".green().bold(), posted.order_hash);
    print_order(&posted, &config.order);

    Ok(())
}

// ===============================
// TAKER FLOW
// ===============================
async fn run_taker(
    sdk: &PartialSdk<TxHash>,
    caller: &Caller,
    config: &Config,
    order_hash: &str,
    fill_amount: Option<String>,
    read_only: bool,
) -> Result<()> {
    let order = sdk.get_limit_order_by_hash(order_hash).await?;
    print_order(&order, &config.order);

    if order.status != OrderStatus::Limit {
        return Err(anyhow!("order {} is {}", order.order_hash, order.status.as_str()));
    }

    let taker_asset = format!("{:?}", order.taker_asset);
    let pay = fill_amount.clone().unwrap_or_else(|| order.taker_amount.clone());
    ensure_allowance(sdk, caller, &taker_asset, &pay, read_only).await?;

    let signature = order.signature.clone();
    let input = match fill_amount {
        Some(amount) => FillLimitOrderInput::partial(&order, signature, amount),
        None => FillLimitOrderInput::full(&order, signature),
    };

    if read_only {
        info!("would fill {} paying {} base units", order.order_hash, pay);
        return Ok(());
    }

    let tx = sdk.fill_limit_order(input).await?;
    println!("{} {:?}", "FILLED".green().bold(), tx);
    Ok(())
}

// ===============================
// ALLOWANCE PREFLIGHT
// ===============================
async fn ensure_allowance(
    sdk: &PartialSdk<TxHash>,
    caller: &Caller,
    token: &str,
    amount: &str,
    read_only: bool,
) -> Result<()> {
    let token_address: Address = codec::parse_address("token", token)?;
    let needed = codec::parse_uint("amount", amount, false)?;
    let spender = sdk.config().settlement_address()?;

    let current = caller
        .allowance(token_address, caller.account(), spender)
        .await?;
    if current >= needed {
        info!("✅ Allowance ok for {:?}", token_address);
        return Ok(());
    }

    if read_only {
        warn!("⚠️ Allowance {} < {} for {:?}, approve skipped", current, needed, token_address);
        return Ok(());
    }

    let tx = sdk.approve_token_for_limit_order(amount, token).await?;
    log_success(&format!("approve tx {:?}", tx));
    Ok(())
}

/// Human units for the configured pair, base units for anything else.
fn display_amount(amount: &str, asset: Address, settings: &OrderSettings) -> String {
    let decimals = [
        (&settings.maker_asset, settings.maker_decimals),
        (&settings.taker_asset, settings.taker_decimals),
    ]
    .into_iter()
    .find(|(configured, _)| codec::parse_address("asset", configured).ok() == Some(asset))
    .map(|(_, decimals)| decimals);

    match decimals.and_then(|d| format_units(amount, d).ok()) {
        Some(human) => human.to_string(),
        None => amount.to_string(),
    }
}

fn print_order(order: &PostedOrder, settings: &OrderSettings) {
    let status = match order.status {
        OrderStatus::Limit => order.status.as_str().cyan(),
        OrderStatus::Filled => order.status.as_str().green(),
        OrderStatus::Cancelled | OrderStatus::Expired => order.status.as_str().red(),
    };
    println!(
        "  {} {} | {} {:?} → {} {:?} | expires {}",
        status,
        order.order_hash,
        display_amount(&order.maker_amount, order.maker_asset, settings),
        order.maker_asset,
        display_amount(&order.taker_amount, order.taker_asset, settings),
        order.taker_asset,
        time_remaining(order.expiry)
    );
}
