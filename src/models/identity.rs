use serde::{Deserialize, Serialize};
use std::fmt;

/// 认证方式，决定调用哪个远程接口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn endpoint(&self) -> &'static str {
        match self {
            AuthMode::Login => "/api/auth/login",
            AuthMode::Register => "/api/auth/register",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register",
        }
    }
}

/// 访问令牌
///
/// `Debug` 不输出明文，避免写进日志。
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(***)")
    }
}

/// 服务端返回的用户信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub quizzes_completed: u32,
}

/// 已认证的身份：用户信息 + token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: UserProfile,
    pub token: AccessToken,
}

impl Identity {
    pub fn new(user: UserProfile, token: AccessToken) -> Self {
        Self { user, token }
    }

    /// 日志用的显示名
    pub fn display_name(&self) -> &str {
        self.user.username.as_deref().unwrap_or("<stored session>")
    }
}

/// 登录 / 注册请求体
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.trim().is_empty()
    }
}

/// 登录 / 注册响应
///
/// 注册接口可能只返回 `message`，因此 `user` 和 `token` 都可缺省。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
