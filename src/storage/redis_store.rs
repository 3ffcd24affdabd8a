use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use super::KeyValueStore;
use crate::error::AppResult;

/// Redis 存储
pub struct RedisStore {
    redis: Arc<RedisClient>,
    namespace: String,
}

impl RedisStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self {
            redis,
            namespace: "patio".to_string(),
        }
    }

    pub fn open(url: &str) -> AppResult<Self> {
        let client = RedisClient::open(url)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// 设置键的命名空间前缀
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let result: Option<String> = conn.get(self.full_key(key)).await?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.set(self.full_key(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.del(self.full_key(key)).await?;
        Ok(())
    }
}
