use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// 通知发送接口
///
/// 立即发送一条通知，调用方不等待结果也不重试。
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn schedule_immediate(&self, title: &str, body: &str, metadata: &Value) -> AppResult<()>;
}

/// 写入日志的通知发送器
#[derive(Debug, Default, Clone)]
pub struct LogDispatcher;

#[async_trait]
impl Dispatcher for LogDispatcher {
    async fn schedule_immediate(&self, title: &str, body: &str, metadata: &Value) -> AppResult<()> {
        tracing::info!(target: "patio::alert", %metadata, "{}: {}", title, body);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    id: String,
    title: &'a str,
    body: &'a str,
    data: &'a Value,
    sent_at: i64,
}

/// 把通知以 JSON 形式 POST 到指定地址
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    http: reqwest::Client,
    url: String,
}

impl WebhookDispatcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Dispatcher for WebhookDispatcher {
    async fn schedule_immediate(&self, title: &str, body: &str, metadata: &Value) -> AppResult<()> {
        let payload = WebhookPayload {
            id: Uuid::new_v4().to_string(),
            title,
            body,
            data: metadata,
            sent_at: Utc::now().timestamp(),
        };

        let resp = self.http.post(&self.url).json(&payload).send().await?;
        if !resp.status().is_success() {
            return Err(AppError::Dispatch(format!(
                "webhook responded with {}",
                resp.status()
            )));
        }
        Ok(())
    }
}
