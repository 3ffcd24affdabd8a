use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

/// 令牌载荷
///
/// `exp`/`iat` 是 NumericDate，可以带小数部分。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 用户标识
    pub exp: f64,    // 过期时间（秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>, // 签发时间
}

impl Claims {
    /// 过期判断按毫秒比较：`exp * 1000 > now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp * 1000.0 <= now.timestamp_millis() as f64
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((self.exp * 1000.0) as i64)
    }
}

/// 解析令牌载荷
///
/// 客户端没有签名密钥，只做结构解析，不校验签名；过期由调用方判断。
pub fn decode_token(token: &str) -> AppResult<Claims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}
