/// 测验服务 API 客户端
///
/// 封装所有与远程测验服务相关的调用逻辑
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, AuthError, ConfigError};
use crate::models::{
    AccessToken, AnswerSubmission, AuthMode, AuthResponse, Credentials, Progress, Question,
    SubmitReceipt,
};

pub const GENERATE_ENDPOINT: &str = "/api/quiz/generate";
pub const SUBMIT_ENDPOINT: &str = "/api/quiz/submit";
pub const PROGRESS_ENDPOINT: &str = "/api/quiz/progress";

/// 会话控制器依赖的远程能力
///
/// 真实实现是 [`QuizClient`]，测试中可替换为内存实现。
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// 登录或注册，返回原始认证响应
    async fn authenticate(
        &self,
        mode: AuthMode,
        credentials: &Credentials,
    ) -> Result<AuthResponse, AuthError>;

    /// 获取下一道题
    async fn generate_question(&self, token: &AccessToken) -> Result<Question, ApiError>;

    /// 提交答案
    async fn submit_answer(
        &self,
        token: &AccessToken,
        submission: &AnswerSubmission,
    ) -> Result<SubmitReceipt, ApiError>;

    /// 查询服务端进度，也用于校验 token
    async fn fetch_progress(&self, token: &AccessToken) -> Result<Progress, ApiError>;
}

/// 基于 reqwest 的测验服务客户端
#[derive(Clone)]
pub struct QuizClient {
    http: Client,
    base_url: String,
}

impl QuizClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// 检查状态码，非 2xx 时读取服务端的错误信息
    async fn ensure_success(endpoint: &str, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = remote_message(response).await;
        Err(ApiError::BadStatus {
            endpoint: endpoint.to_string(),
            status,
            message,
        })
    }
}

#[async_trait]
impl QuizApi for QuizClient {
    async fn authenticate(
        &self,
        mode: AuthMode,
        credentials: &Credentials,
    ) -> Result<AuthResponse, AuthError> {
        let endpoint = mode.endpoint();
        debug!("认证请求: {} (用户: {})", endpoint, credentials.username);

        let response = self
            .http
            .post(self.url(endpoint))
            .json(credentials)
            .send()
            .await
            .map_err(AuthError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let message = remote_message(response).await;
            return Err(AuthError::Rejected { status, message });
        }

        response.json::<AuthResponse>().await.map_err(AuthError::Decode)
    }

    async fn generate_question(&self, token: &AccessToken) -> Result<Question, ApiError> {
        let response = self
            .http
            .get(self.url(GENERATE_ENDPOINT))
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed {
                endpoint: GENERATE_ENDPOINT.to_string(),
                source,
            })?;

        let response = Self::ensure_success(GENERATE_ENDPOINT, response).await?;
        let question: Question =
            response
                .json()
                .await
                .map_err(|source| ApiError::JsonParseFailed {
                    endpoint: GENERATE_ENDPOINT.to_string(),
                    source,
                })?;
        question.validate()?;

        debug!("获取题目 {}: {} 个选项", question.id, question.options.len());
        Ok(question)
    }

    async fn submit_answer(
        &self,
        token: &AccessToken,
        submission: &AnswerSubmission,
    ) -> Result<SubmitReceipt, ApiError> {
        debug!(
            "提交答案 Payload: questionId={}, answer={}",
            submission.question_id, submission.answer
        );

        let response = self
            .http
            .post(self.url(SUBMIT_ENDPOINT))
            .bearer_auth(token.as_str())
            .json(submission)
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed {
                endpoint: SUBMIT_ENDPOINT.to_string(),
                source,
            })?;

        let response = Self::ensure_success(SUBMIT_ENDPOINT, response).await?;
        // 响应体不影响流程，解析失败时按空回执处理
        Ok(response.json::<SubmitReceipt>().await.unwrap_or_default())
    }

    async fn fetch_progress(&self, token: &AccessToken) -> Result<Progress, ApiError> {
        let response = self
            .http
            .get(self.url(PROGRESS_ENDPOINT))
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed {
                endpoint: PROGRESS_ENDPOINT.to_string(),
                source,
            })?;

        let response = Self::ensure_success(PROGRESS_ENDPOINT, response).await?;
        response
            .json()
            .await
            .map_err(|source| ApiError::JsonParseFailed {
                endpoint: PROGRESS_ENDPOINT.to_string(),
                source,
            })
    }
}

/// 从错误响应中提取 `message` 或 `error` 字段
async fn remote_message(response: Response) -> Option<String> {
    let body: Value = response.json().await.ok()?;
    extract_message(&body)
}

fn extract_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
