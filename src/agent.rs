use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::{interval, interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::market::{GlobalStats, MarketDataClient, MarketFeed, MarketSnapshot};
use crate::signals::{BandExitPolicy, SignalBook, SignalEvent};
use crate::simulation::MarketSimulator;
use crate::store::{DocumentStore, SignalRepository, StoreClient};
use crate::watchlist::WatchlistService;

/// Owns all mutable session state: the cached snapshot list, global stats
/// and the signal book. Every timer tick is handled sequentially inside one
/// select loop, so there is exactly one writer and no locking.
pub struct Agent {
    config: Config,
    feed: Arc<dyn MarketFeed>,
    store_client: Option<Arc<StoreClient>>,
    repository: Option<SignalRepository>,
    watchlist: Option<WatchlistService>,
    book: SignalBook,
    latest: Vec<MarketSnapshot>,
    global: Option<GlobalStats>,
    watched_symbols: Vec<String>,
}

impl Agent {
    pub fn new(config: Config) -> Self {
        let feed: Arc<dyn MarketFeed> = if config.agent.simulation_mode {
            info!("🎞️  Initializing market simulator");
            Arc::new(MarketSimulator::new())
        } else {
            info!("🌐 Initializing market data client ({})", config.market.api_url);
            Arc::new(MarketDataClient::new(&config.market))
        };

        let store_client = config
            .store
            .url
            .as_ref()
            .map(|url| Arc::new(StoreClient::new(url, &config.store.api_key)));

        let (repository, watchlist) = match &store_client {
            Some(client) => {
                let store: Arc<dyn DocumentStore> = client.clone();
                (
                    Some(SignalRepository::new(store.clone())),
                    Some(WatchlistService::new(store, &config.store.user_id)),
                )
            }
            None => {
                info!("📊 No STORE_URL configured, running without persistence");
                (None, None)
            }
        };

        let policy = match config.signals.exit_seed {
            Some(seed) => Box::new(BandExitPolicy::seeded(seed)),
            None => Box::new(BandExitPolicy::new()),
        };
        let book = SignalBook::new(config.signals.max_signals, policy);

        Self {
            config,
            feed,
            store_client,
            repository,
            watchlist,
            book,
            latest: Vec::new(),
            global: None,
            watched_symbols: Vec::new(),
        }
    }

    /// Main scheduler loop. Blocks until ctrl-c; dropping the loop tears
    /// down every interval and any call they had in flight.
    pub async fn run(&mut self) -> Result<()> {
        info!("🚀 Starting signal dashboard agent");

        self.startup().await;

        // First poll already happened in startup(), so the poll interval
        // starts one period out.
        let poll_period = Duration::from_secs(self.config.market.poll_interval_secs);
        let mut poll_interval = interval_at(Instant::now() + poll_period, poll_period);

        let mut retick_interval = interval(Duration::from_secs(
            self.config.signals.retick_interval_secs,
        ));

        let mut fast_retick_interval = interval(Duration::from_secs(
            self.config.signals.fast_retick_interval_secs,
        ));
        fast_retick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut generate_interval = interval(Duration::from_secs(
            self.config.signals.generate_interval_secs,
        ));

        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    self.refresh_markets().await;
                }

                _ = retick_interval.tick() => {
                    self.retick_signals().await;
                }

                // Fast path only matters while something is open
                _ = fast_retick_interval.tick() => {
                    if self.book.open_count() > 0 {
                        self.retick_signals().await;
                    }
                }

                _ = generate_interval.tick() => {
                    if self.config.signals.auto_generate {
                        self.generate_signals().await;
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    if let Some(stats) = &self.global {
                        info!(
                            "🌍 Last global view: ${:.0}B cap, BTC dominance {:.1}%",
                            stats.total_market_cap / 1e9,
                            stats.btc_dominance_pct
                        );
                    }
                    info!("👋 Shutting down ({} signals tracked)", self.book.signals().len());
                    break;
                }
            }
        }

        Ok(())
    }

    /// Session check, watchlist load, open-signal restore, first poll.
    async fn startup(&mut self) {
        if let Some(client) = &self.store_client {
            match client.current_user().await {
                Ok(Some(_)) => {}
                Ok(None) => info!("🔓 Anonymous session"),
                Err(e) => warn!("⚠️ Account lookup failed: {}", e),
            }

            // Log session changes as the backend delivers them
            let mut session_rx = client.session_changes();
            tokio::spawn(async move {
                while session_rx.changed().await.is_ok() {
                    let user = session_rx.borrow().clone();
                    match user {
                        Some(user) => info!("🔐 Session active for {}", user.id),
                        None => info!("🔓 Session ended"),
                    }
                }
            });
        }

        if let Some(watchlist) = &self.watchlist {
            match watchlist.list().await {
                Ok(symbols) => {
                    if !symbols.is_empty() {
                        info!("⭐ Watchlist: {}", symbols.join(", "));
                    }
                    self.watched_symbols = symbols;
                }
                Err(e) => warn!("⚠️ Failed to load watchlist: {}", e),
            }
        }

        if let Some(repository) = &self.repository {
            match repository.load_open(self.config.signals.max_signals).await {
                Ok(signals) if !signals.is_empty() => self.book.restore(signals),
                Ok(_) => {}
                Err(e) => warn!("⚠️ Failed to restore signals: {}", e),
            }
        }

        self.refresh_markets().await;
    }

    /// Pull the latest snapshot list and global stats. The feed falls back
    /// to built-in sample data on its own, so an error here is unusual.
    async fn refresh_markets(&mut self) {
        match self.feed.list_top_markets(self.config.market.top_limit).await {
            Ok(snapshots) if !snapshots.is_empty() => {
                self.latest = snapshots;
            }
            Ok(_) => warn!("⚠️ Market poll returned no snapshots, keeping last known data"),
            Err(e) => error!("❌ Market poll failed: {}", e),
        }

        match self.feed.global_stats().await {
            Ok(stats) => {
                debug!(
                    "🌍 Market cap ${:.0}B, BTC dominance {:.1}%",
                    stats.total_market_cap / 1e9,
                    stats.btc_dominance_pct
                );
                self.global = Some(stats);
            }
            Err(e) => warn!("⚠️ Global stats fetch failed: {}", e),
        }
    }

    /// Mint new signals from the cached snapshots, watchlisted symbols
    /// first, and persist them best-effort.
    async fn generate_signals(&mut self) {
        if self.latest.is_empty() {
            debug!("No snapshots cached yet, skipping generation");
            return;
        }

        let mut candidates = self.latest.clone();
        if !self.watched_symbols.is_empty() {
            let watched: HashSet<&str> =
                self.watched_symbols.iter().map(|s| s.as_str()).collect();
            // Stable sort keeps market-cap order within each group
            candidates.sort_by_key(|s| !watched.contains(s.symbol.as_str()));
        }

        let minted = self
            .book
            .generate(&candidates, self.config.signals.max_new_per_batch);
        if minted.is_empty() {
            debug!("🔍 No actionable setups this cycle");
            return;
        }

        if let Some(repository) = &self.repository {
            for signal in &minted {
                if let Err(e) = repository.save(signal).await {
                    warn!("⚠️ Failed to persist signal {}: {}", signal.id, e);
                }
            }
        }
    }

    /// One evaluation pass; dispatches notifications and patches closed
    /// records into the store.
    async fn retick_signals(&mut self) {
        if self.latest.is_empty() {
            return;
        }

        let events = self.book.retick(&self.latest);
        for event in events {
            match event {
                SignalEvent::Closed { signal, reason } => {
                    info!(
                        "🔔 {} closed ({:?}) at {:+.2}%",
                        signal.symbol, reason, signal.performance_pct
                    );
                    if let Some(repository) = &self.repository {
                        if let Err(e) = repository.mark_closed(&signal).await {
                            warn!("⚠️ Failed to persist close for {}: {}", signal.id, e);
                        }
                    }
                }
                SignalEvent::SignificantMove { signal, delta_pct } => {
                    info!(
                        "📢 {} moved {:+.2} pts to {:+.2}%",
                        signal.symbol, delta_pct, signal.performance_pct
                    );
                }
            }
        }
    }
}
