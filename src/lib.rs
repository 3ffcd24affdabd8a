use config::Config;

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod monitor;
pub mod occupancy;
pub mod storage;

pub use error::{AppError, AppResult};

/// 根据配置选择令牌存储后端
pub fn build_store(config: &Config) -> AppResult<Box<dyn storage::KeyValueStore>> {
    let store: Box<dyn storage::KeyValueStore> = match config.token_store {
        config::StoreKind::File => Box::new(storage::FileStore::new(&config.token_file)),
        config::StoreKind::Redis => Box::new(storage::RedisStore::open(&config.redis_url)?),
        config::StoreKind::Memory => Box::new(storage::MemoryStore::new()),
    };
    Ok(store)
}
