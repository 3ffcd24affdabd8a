//! 后端 REST 接口
//! 只用到登录和区域占用两个接口

pub mod client;
pub mod schema;

pub use client::ApiClient;
pub use schema::{LoginRequest, LoginResponse};
