use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub market: MarketConfig,
    pub signals: SignalConfig,
    pub store: StoreConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
    pub api_url: String,
    pub top_limit: usize,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignalConfig {
    pub max_signals: usize,
    pub max_new_per_batch: usize,
    pub retick_interval_secs: u64,
    pub fast_retick_interval_secs: u64,
    pub auto_generate: bool,
    pub generate_interval_secs: u64,
    // Seed for the exit-level policy. None = OS entropy.
    pub exit_seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub api_key: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    pub simulation_mode: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let market = MarketConfig {
            api_url: env::var("MARKET_API_URL")
                .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string()),
            top_limit: env::var("MARKET_TOP_LIMIT")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .unwrap_or(50),
            poll_interval_secs: env::var("MARKET_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            request_timeout_secs: env::var("MARKET_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        };

        let signals = SignalConfig {
            max_signals: env::var("MAX_SIGNALS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
            max_new_per_batch: env::var("MAX_NEW_SIGNALS_PER_BATCH")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            retick_interval_secs: env::var("RETICK_INTERVAL_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),
            fast_retick_interval_secs: env::var("FAST_RETICK_INTERVAL_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            auto_generate: env::var("AUTO_GENERATE_SIGNALS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            generate_interval_secs: env::var("GENERATE_INTERVAL_SECS")
                .unwrap_or_else(|_| "180".to_string())
                .parse()
                .unwrap_or(180),
            exit_seed: env::var("EXIT_POLICY_SEED").ok().and_then(|s| s.parse().ok()),
        };

        let store = StoreConfig {
            url: env::var("STORE_URL").ok(),
            api_key: env::var("STORE_API_KEY").unwrap_or_default(),
            user_id: env::var("STORE_USER_ID").unwrap_or_else(|_| "local".to_string()),
        };

        let agent = AgentConfig {
            simulation_mode: env::var("SIMULATION_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        };

        Ok(Config {
            market,
            signals,
            store,
            agent,
        })
    }
}
