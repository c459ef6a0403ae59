use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 远程测验服务地址
    pub api_base_url: String,
    /// token 持久化文件
    pub token_file: String,
    /// 答题后加载下一题前的等待时间（毫秒）
    pub next_question_delay_ms: u64,
    /// 单个请求超时（秒）
    pub request_timeout_secs: u64,
    /// 启动时是否先校验已保存的 token
    pub validate_stored_token: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000".to_string(),
            token_file: ".quiz_session/token".to_string(),
            next_question_delay_ms: 2000,
            request_timeout_secs: 10,
            validate_stored_token: true,
            verbose_logging: false,
        }
    }
}

/// 配置文件结构，所有字段可选
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    token_file: Option<String>,
    next_question_delay_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    validate_stored_token: Option<bool>,
    verbose_logging: Option<bool>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 先读 `QUIZ_CONFIG` 指向的 TOML 文件（如有），再用环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var("QUIZ_CONFIG") {
            Ok(path) => Ok(Self::from_toml_file(Path::new(&path))?.with_env_overrides()),
            Err(_) => Ok(Self::from_env()),
        }
    }

    /// 从 TOML 文件加载配置，缺失字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: FileConfig = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            api_base_url: file.api_base_url.unwrap_or(default.api_base_url),
            token_file: file.token_file.unwrap_or(default.token_file),
            next_question_delay_ms: file
                .next_question_delay_ms
                .unwrap_or(default.next_question_delay_ms),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(default.request_timeout_secs),
            validate_stored_token: file
                .validate_stored_token
                .unwrap_or(default.validate_stored_token),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("QUIZ_API_BASE_URL").unwrap_or(self.api_base_url),
            token_file: std::env::var("QUIZ_TOKEN_FILE").unwrap_or(self.token_file),
            next_question_delay_ms: std::env::var("QUIZ_NEXT_QUESTION_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.next_question_delay_ms),
            request_timeout_secs: std::env::var("QUIZ_REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            validate_stored_token: std::env::var("QUIZ_VALIDATE_STORED_TOKEN").ok().and_then(|v| v.parse().ok()).unwrap_or(self.validate_stored_token),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    pub fn next_question_delay(&self) -> Duration {
        Duration::from_millis(self.next_question_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
