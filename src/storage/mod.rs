//! 持久化键值存储
//! 会话管理器通过该接口读写令牌

use async_trait::async_trait;

use crate::error::AppResult;

pub mod file;
pub mod keys;
pub mod memory;
pub mod redis_store;

pub use file::FileStore;
pub use keys::TOKEN_KEY;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// 键值存储接口
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    async fn remove(&self, key: &str) -> AppResult<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        (**self).remove(key).await
    }
}
