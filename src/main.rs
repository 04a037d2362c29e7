use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coinsignal::agent::Agent;
use coinsignal::config::Config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinsignal=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    print_banner(&config);

    info!("⏱️  Poll {}s / retick {}s / fast {}s",
        config.market.poll_interval_secs,
        config.signals.retick_interval_secs,
        config.signals.fast_retick_interval_secs,
    );

    let mut agent = Agent::new(config);
    agent.run().await
}

fn print_banner(config: &Config) {
    println!("\n╔═══════════════════════════════════════════════════════════╗");
    println!("║              Coinsignal Market Dashboard Agent            ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();
    println!("📊 Top markets tracked: {}", config.market.top_limit);
    println!("🧮 Signal book cap: {}", config.signals.max_signals);
    if config.signals.auto_generate {
        println!(
            "🤖 Auto-generation: every {}s (up to {} per batch)",
            config.signals.generate_interval_secs, config.signals.max_new_per_batch
        );
    } else {
        println!("🤖 Auto-generation: disabled");
    }
    println!(
        "💾 Persistence: {}",
        match &config.store.url {
            Some(url) => url.as_str(),
            None => "disabled",
        }
    );
    if config.agent.simulation_mode {
        println!("🎞️  Mode: SIMULATION (no network)");
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!("═══════════════════════════════════════════════════════════");
    println!();
}
