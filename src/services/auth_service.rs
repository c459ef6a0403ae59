//! 认证服务 - 业务能力层
//!
//! 只负责"用凭据换取身份"和"恢复已保存的会话"，不关心答题流程

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::QuizApi;
use crate::error::AuthError;
use crate::infrastructure::TokenStore;
use crate::models::{AccessToken, AuthMode, Credentials, Identity, UserProfile};

/// 启动时恢复会话的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// 没有保存的 token
    NoToken,
    /// token 可用（或未校验）
    Resumed(Identity),
    /// token 被服务端拒绝（401/403），已清除
    Expired { reason: String },
    /// 服务端不可达或返回其他错误，token 保留
    Unverified { reason: String },
}

/// 认证服务
pub struct AuthService {
    api: Arc<dyn QuizApi>,
    store: Arc<dyn TokenStore>,
}

impl AuthService {
    pub fn new(api: Arc<dyn QuizApi>, store: Arc<dyn TokenStore>) -> Self {
        Self { api, store }
    }

    /// 登录或注册，换取身份
    ///
    /// 注册接口只返回提示信息时，用同一组凭据再登录一次以取得 token。
    /// 不写入存储；调用方确认结果仍然有效后再调用 `remember`。
    pub async fn authenticate(
        &self,
        mode: AuthMode,
        credentials: Credentials,
    ) -> Result<Identity, AuthError> {
        if !credentials.is_complete() {
            return Err(AuthError::MissingCredentials);
        }

        info!("🔐 {} 请求: {}", mode.title(), credentials.username);
        let mut response = self.api.authenticate(mode, &credentials).await?;

        if mode == AuthMode::Register && response.token.is_none() {
            info!(
                "注册成功 ({}), 使用相同凭据登录",
                response.message.as_deref().unwrap_or("无提示")
            );
            response = self.api.authenticate(AuthMode::Login, &credentials).await?;
        }

        let token = response
            .token
            .filter(|t| !t.trim().is_empty())
            .map(AccessToken::new)
            .ok_or(AuthError::MissingToken)?;

        let mut user = response.user.unwrap_or_default();
        if user.username.is_none() {
            user.username = Some(credentials.username.clone());
        }

        info!("✓ 认证成功: {}", credentials.username);
        Ok(Identity::new(user, token))
    }

    /// 持久化已接受身份的 token
    pub async fn remember(&self, identity: &Identity) -> Result<(), AuthError> {
        self.store.save(&identity.token).await?;
        debug!("token 已保存: {}", identity.display_name());
        Ok(())
    }

    /// 读取已保存的 token 并按需向服务端校验
    pub async fn resume(&self, validate: bool) -> ResumeOutcome {
        let token = match self.store.load().await {
            Ok(Some(token)) => token,
            Ok(None) => return ResumeOutcome::NoToken,
            Err(e) => {
                warn!("⚠️ 读取已保存的 token 失败: {}", e);
                return ResumeOutcome::NoToken;
            }
        };

        if !validate {
            debug!("跳过 token 校验，直接恢复会话");
            return ResumeOutcome::Resumed(Identity::new(UserProfile::default(), token));
        }

        match self.api.fetch_progress(&token).await {
            Ok(progress) => {
                info!(
                    "✓ 已恢复会话 (服务端得分: {}, 已答题数: {})",
                    progress.score, progress.quizzes_completed
                );
                let user = UserProfile {
                    username: None,
                    score: progress.score,
                    quizzes_completed: progress.quizzes_completed,
                };
                ResumeOutcome::Resumed(Identity::new(user, token))
            }
            Err(e) => {
                warn!("⚠️ 已保存的 token 无法使用: {}", e);
                if !e.is_unauthorized() {
                    return ResumeOutcome::Unverified {
                        reason: e.to_string(),
                    };
                }
                if let Err(clear_err) = self.store.clear().await {
                    warn!("⚠️ 清除失效 token 失败: {}", clear_err);
                }
                ResumeOutcome::Expired {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// 清除本地 token
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("⚠️ 清除 token 失败: {}", e);
        }
    }
}
