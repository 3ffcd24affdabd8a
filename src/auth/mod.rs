//! 会话与认证
//! 包含令牌解析和会话生命周期管理

pub mod session;
pub mod token;

pub use session::{AuthApi, LoginFailure, LoginOutcome, Session, SessionManager, SessionState};
pub use token::{Claims, decode_token};
