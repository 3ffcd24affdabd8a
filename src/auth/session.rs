use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::token::{Claims, decode_token};
use crate::error::{AppError, AppResult};
use crate::storage::{KeyValueStore, TOKEN_KEY};

/// 登录接口
///
/// 返回后端给出的令牌字段；响应里没有令牌时为 `None`。
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn request_token(&self, identifier: &str, secret: &str) -> AppResult<Option<String>>;
}

/// 已认证会话
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub claims: Claims,
}

impl Session {
    /// 解析令牌并构造会话
    pub fn from_token(token: String) -> AppResult<Self> {
        let claims = decode_token(&token)?;
        Ok(Self { token, claims })
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.claims.is_expired_at(now)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Unauthenticated => None,
        }
    }
}

/// 登录失败原因
#[derive(Debug, Clone, PartialEq)]
pub enum LoginFailure {
    /// 网络错误或后端不可达
    Network(String),
    /// 后端拒绝了凭证
    Rejected(String),
    /// 响应中没有令牌
    MissingToken,
    /// 令牌无法解析
    MalformedToken(String),
    /// 令牌签发时已过期
    Expired,
    /// 令牌无法持久化
    Storage(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Authenticated(Claims),
    Failed(LoginFailure),
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated(_))
    }
}

/// 会话管理器
///
/// 持有唯一的当前令牌，并通过键值存储跨进程保存。所有公开操作都不返回错误：
/// 存储或解析失败一律退化为未登录状态。
pub struct SessionManager<S, A> {
    store: S,
    api: A,
    state: SessionState,
}

impl<S: KeyValueStore, A: AuthApi> SessionManager<S, A> {
    pub fn new(store: S, api: A) -> Self {
        Self {
            store,
            api,
            state: SessionState::Unauthenticated,
        }
    }

    /// 启动时从存储恢复会话
    pub async fn restore(&mut self) -> &SessionState {
        self.state = SessionState::Unauthenticated;

        let token = match self.store.get(TOKEN_KEY).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::debug!("No persisted token found");
                return &self.state;
            }
            Err(e) => {
                tracing::warn!("Failed to read persisted token, starting logged out: {}", e);
                return &self.state;
            }
        };

        match Session::from_token(token) {
            Ok(session) if session.is_valid_at(Utc::now()) => {
                tracing::info!(
                    "Session restored for {}, expires at {:?}",
                    session.claims.sub,
                    session.claims.expires_at()
                );
                self.state = SessionState::Authenticated(session);
            }
            Ok(session) => {
                tracing::info!("Persisted token for {} has expired", session.claims.sub);
                self.clear_persisted().await;
            }
            Err(e) => {
                tracing::warn!("Persisted token is not decodable: {}", e);
                self.clear_persisted().await;
            }
        }

        &self.state
    }

    /// 用凭证登录
    ///
    /// 任何失败都不会修改存储或当前状态。
    pub async fn login(&mut self, identifier: &str, secret: &str) -> LoginOutcome {
        let token = match self.api.request_token(identifier, secret).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!("Login response for {} carried no token", identifier);
                return LoginOutcome::Failed(LoginFailure::MissingToken);
            }
            Err(AppError::Auth(reason)) => {
                tracing::warn!("Login rejected for {}: {}", identifier, reason);
                return LoginOutcome::Failed(LoginFailure::Rejected(reason));
            }
            Err(e) => {
                tracing::warn!("Login request for {} failed: {}", identifier, e);
                return LoginOutcome::Failed(LoginFailure::Network(e.to_string()));
            }
        };

        let session = match Session::from_token(token) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Login returned a malformed token: {}", e);
                return LoginOutcome::Failed(LoginFailure::MalformedToken(e.to_string()));
            }
        };
        if !session.is_valid_at(Utc::now()) {
            tracing::warn!("Login returned an already expired token");
            return LoginOutcome::Failed(LoginFailure::Expired);
        }

        if let Err(e) = self.store.set(TOKEN_KEY, &session.token).await {
            tracing::warn!("Failed to persist token: {}", e);
            return LoginOutcome::Failed(LoginFailure::Storage(e.to_string()));
        }

        tracing::info!("Logged in as {}", session.claims.sub);
        let claims = session.claims.clone();
        self.state = SessionState::Authenticated(session);
        LoginOutcome::Authenticated(claims)
    }

    /// 退出登录，可重复调用
    pub async fn logout(&mut self) {
        if let SessionState::Authenticated(session) = &self.state {
            tracing::info!("Logging out {}", session.claims.sub);
        }
        self.state = SessionState::Unauthenticated;
        self.clear_persisted().await;
    }

    pub fn current_token(&self) -> Option<&str> {
        self.state.session().map(|s| s.token.as_str())
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.state.session().map(|s| &s.claims)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn clear_persisted(&self) {
        if let Err(e) = self.store.remove(TOKEN_KEY).await {
            tracing::warn!("Failed to clear persisted token: {}", e);
        }
    }
}
