//! 前端错误类型
//!
//! 会话层与验证器绝不向外抛出这些错误，它们只在内部被捕获、记录并转换为
//! "未登录"/"已过期"等确定的结果。

use std::time::Duration;
use thiserror::Error;

/// Cookie / LocalStorage / SessionStorage 访问失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// 存储介质不可用（无 window、隐私模式禁用等）
    #[error("storage unavailable: {0}")]
    Unavailable(&'static str),
    #[error("failed to read `{key}`: {message}")]
    Read { key: String, message: String },
    #[error("failed to write `{key}`: {message}")]
    Write { key: String, message: String },
}

impl StorageError {
    pub fn read(key: &str, message: impl Into<String>) -> Self {
        Self::Read {
            key: key.to_string(),
            message: message.into(),
        }
    }

    pub fn write(key: &str, message: impl Into<String>) -> Self {
        Self::Write {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// REST 调用失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 请求未能到达服务器
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// 服务器返回了非 2xx 状态码且没有可用的错误信息
    #[error("server responded with status {0}")]
    Status(u16),
    /// 服务器返回的错误信息（`{"error": "..."}`）
    #[error("{0}")]
    Server(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    /// 登录成功但无法写入本地会话
    #[error("could not persist session: {0}")]
    Session(String),
}

impl ApiError {
    /// 面向用户展示的错误文本
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) | ApiError::Timeout(_) => {
                "Network error. Please try again.".to_string()
            }
            ApiError::Server(msg) => msg.clone(),
            ApiError::Status(_) | ApiError::Decode(_) => "Login failed.".to_string(),
            ApiError::Session(_) => {
                "Could not save your session. Please check browser storage settings.".to_string()
            }
        }
    }
}

impl From<gloo_net::Error> for ApiError {
    fn from(e: gloo_net::Error) -> Self {
        match e {
            gloo_net::Error::SerdeError(e) => ApiError::Decode(e.to_string()),
            other => ApiError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_hide_transport_details() {
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(10)).user_message(),
            "Network error. Please try again."
        );
        assert_eq!(
            ApiError::Server("Invalid credentials".into()).user_message(),
            "Invalid credentials"
        );
        assert_eq!(ApiError::Status(500).user_message(), "Login failed.");
    }
}
