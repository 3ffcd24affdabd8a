use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// 令牌存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    File,
    Redis,
    Memory,
}

impl StoreKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Some(Self::File),
            "redis" => Some(Self::Redis),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub login_path: String,
    pub zones_path: String,
    pub token_store: StoreKind,
    pub token_file: PathBuf,
    pub redis_url: String,
    pub poll_interval_secs: u64,
    pub high_occupancy_threshold: u32,
    pub alert_webhook_url: Option<String>,
    pub identifier: Option<String>,
    pub secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let poll_interval = env::var("POLL_INTERVAL")
            .ok()
            .and_then(|v| v.trim_end_matches('s').parse::<u64>().ok())
            .unwrap_or(30);
        let token_store = env::var("TOKEN_STORE")
            .ok()
            .and_then(|v| StoreKind::parse(&v))
            .unwrap_or(StoreKind::File);

        Ok(Config {
            api_base_url: env::var("API_BASE_URL")?,
            login_path: env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".into()),
            zones_path: env::var("ZONES_PATH").unwrap_or_else(|_| "/setores".into()),
            token_store,
            token_file: env::var("TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".patio/session.json")),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".into()),
            poll_interval_secs: poll_interval,
            high_occupancy_threshold: env::var("HIGH_OCCUPANCY_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(80),
            alert_webhook_url: env::var("ALERT_WEBHOOK_URL").ok().filter(|v| !v.is_empty()),
            identifier: env::var("PATIO_IDENTIFIER").ok(),
            secret: env::var("PATIO_SECRET").ok(),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// 登录接口完整地址
    pub fn login_url(&self) -> String {
        join_url(&self.api_base_url, &self.login_path)
    }

    /// 区域占用接口完整地址
    pub fn zones_url(&self) -> String {
        join_url(&self.api_base_url, &self.zones_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
