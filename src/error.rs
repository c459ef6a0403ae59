//! 错误类型
//!
//! 按来源划分：认证、远程 API、本地存储、配置。
//! 二进制入口处统一转换为 `anyhow::Error`。

use reqwest::StatusCode;
use thiserror::Error;

/// 认证失败时的通用提示
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

/// 认证请求网络异常时的提示
pub const AUTH_NETWORK_MESSAGE: &str = "An error occurred during authentication";

/// 认证错误
#[derive(Debug, Error)]
pub enum AuthError {
    /// 用户名或密码为空
    #[error("用户名和密码不能为空")]
    MissingCredentials,
    /// 服务端拒绝
    #[error("服务端拒绝认证 (status={status}): {message:?}")]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
    /// 成功响应中没有 token
    #[error("认证响应缺少 token")]
    MissingToken,
    /// 网络请求失败
    #[error("认证请求失败: {0}")]
    Network(#[source] reqwest::Error),
    /// 响应体无法解析
    #[error("认证响应解析失败: {0}")]
    Decode(#[source] reqwest::Error),
    /// 无法保存 token
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// 展示给用户的提示信息
    ///
    /// 服务端给出的信息优先，否则使用通用提示。
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            AuthError::Network(_) => AUTH_NETWORK_MESSAGE.to_string(),
            _ => AUTH_FAILED_MESSAGE.to_string(),
        }
    }
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回非 2xx 响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadStatus {
        endpoint: String,
        status: StatusCode,
        message: Option<String>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 题目结构不合法
    #[error("题目数据不合法: {0}")]
    InvalidQuestion(String),
}

impl ApiError {
    /// 是否为 token 失效（401/403）
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::BadStatus { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}

/// 本地存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 读取失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 删除失败
    #[error("删除文件失败 ({path}): {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// HTTP 客户端构建失败
    #[error("HTTP客户端构建失败: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_remote_message() {
        let err = AuthError::Rejected {
            status: StatusCode::UNAUTHORIZED,
            message: Some("Invalid credentials".to_string()),
        };
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[test]
    fn test_user_message_falls_back_to_generic() {
        let err = AuthError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: None,
        };
        assert_eq!(err.user_message(), AUTH_FAILED_MESSAGE);

        let blank = AuthError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message(), AUTH_FAILED_MESSAGE);
        assert_eq!(AuthError::MissingToken.user_message(), AUTH_FAILED_MESSAGE);
    }

    #[test]
    fn test_unauthorized_detection() {
        let err = ApiError::BadStatus {
            endpoint: "/api/quiz/progress".to_string(),
            status: StatusCode::UNAUTHORIZED,
            message: Some("Token has expired".to_string()),
        };
        assert!(err.is_unauthorized());

        let other = ApiError::BadStatus {
            endpoint: "/api/quiz/generate".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert!(!other.is_unauthorized());
    }
}
