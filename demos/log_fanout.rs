//! Log fan-out demo
//!
//! Run with: cargo run --example log_fanout [BLOCKS]
//!
//! A fake poller emits one Transfer log per block for a single token
//! contract. Two consumers subscribe to it:
//!
//! - `fast` drains its queue continuously and sees every log
//! - `slow` sleeps between reads, so once its queue (capacity 3) is full
//!   the registry drops logs for it after the send timeout
//!
//! Set `RUST_LOG=sentinel_rs=debug` to watch cache rebuilds and drops.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use sentinel_rs::{
    Address, Event, EventKey, Hash, RegistryConfig, Subscription, SubscriptionRegistry,
};

/// keccak256("Transfer(address,address,uint256)")
const TRANSFER_TOPIC: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

const TOKEN: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

fn print_usage() {
    eprintln!("Usage: log_fanout [BLOCKS]");
    eprintln!();
    eprintln!("  BLOCKS  number of blocks to emit (default: 10)");
}

fn spawn_consumer(
    name: &'static str,
    mut subscription: Subscription,
    delay: Duration,
) -> tokio::task::JoinHandle<usize> {
    tokio::spawn(async move {
        let mut received = 0;
        while let Some(event) = subscription.recv().await {
            received += 1;
            println!(
                "[{}] block={} index={} data={} bytes",
                name,
                event.block_number,
                event.index,
                event.data.len()
            );
            tokio::time::sleep(delay).await;
        }
        println!("[{}] queue closed after {} events", name, received);
        received
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let blocks: u64 = match args.get(1) {
        Some(arg) => match arg.parse() {
            Ok(n) => n,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => 10,
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sentinel_rs=info".parse()?)
                .add_directive("log_fanout=debug".parse()?),
        )
        .init();

    let registry = Arc::new(SubscriptionRegistry::with_config(RegistryConfig::for_chain(1)));

    let token: Address = TOKEN.parse()?;
    let transfer: Hash = TRANSFER_TOPIC.parse()?;
    let key = EventKey::new(token, transfer);

    let fast = registry.subscribe(token, transfer).await?;
    let slow = registry.subscribe(token, transfer).await?;
    let slow_id = slow.id();

    let fast_task = spawn_consumer("fast", fast, Duration::ZERO);
    let slow_task = spawn_consumer("slow", slow, Duration::from_millis(400));

    println!("Subscribed keys: {:?}", registry.list_keys().await);

    for block in 1..=blocks {
        let event = Event::new(block, Hash::from_low_u64_be(block), token, vec![transfer])
            .with_data(Bytes::from(block.to_be_bytes().to_vec()))
            .with_index(0);

        let outcome = registry.broadcast(&key, event).await;
        tracing::debug!(
            block = block,
            delivered = outcome.delivered,
            dropped = outcome.dropped,
            "Poller emitted block"
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    registry.unsubscribe(token, transfer, slow_id).await?;
    let slow_received = slow_task.await?;

    registry.close().await;
    let fast_received = fast_task.await?;

    let stats = registry.stats().await;
    println!();
    println!(
        "fast={} slow={} delivered={} dropped={} cache_rebuilds={}",
        fast_received, slow_received, stats.delivered, stats.dropped, stats.cache_rebuilds
    );

    Ok(())
}
