use async_trait::async_trait;
use reqwest::StatusCode;

use super::schema::{LoginRequest, LoginResponse};
use crate::auth::AuthApi;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::occupancy::OccupancySnapshot;

/// 后端客户端
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    login_url: String,
    zones_url: String,
}

impl ApiClient {
    pub fn new(login_url: impl Into<String>, zones_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            login_url: login_url.into(),
            zones_url: zones_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.login_url(), config.zones_url())
    }

    /// 获取各区域的占用快照
    pub async fn fetch_zones(&self, token: &str) -> AppResult<Vec<OccupancySnapshot>> {
        let resp = self
            .http
            .get(&self.zones_url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Auth(format!("zones request rejected: {}", status)));
        }

        let zones: Vec<OccupancySnapshot> = resp.error_for_status()?.json().await?;
        tracing::debug!("Fetched {} zones", zones.len());
        Ok(zones)
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn request_token(&self, identifier: &str, secret: &str) -> AppResult<Option<String>> {
        let req = LoginRequest {
            identifier: identifier.to_string(),
            secret: secret.to_string(),
        };
        let resp = self.http.post(&self.login_url).json(&req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Auth(format!("login responded with {}", status)));
        }

        // 响应体不是预期的 JSON 时按没有令牌处理
        let body = resp.text().await?;
        let parsed: LoginResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Login response body is not valid JSON: {}", e);
                LoginResponse::default()
            }
        };
        Ok(parsed.token.filter(|t| !t.is_empty()))
    }
}
