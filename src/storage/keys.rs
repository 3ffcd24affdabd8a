/// 当前令牌的固定键
pub const TOKEN_KEY: &str = "auth:token";
