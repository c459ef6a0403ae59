use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ApiError;

/// 题目标识
///
/// 服务端给什么就原样保存什么（字符串或数字），提交答案时原样带回。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(Value);

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        Self(Value::String(id.to_string()))
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(id) => f.write_str(id),
            other => write!(f, "{}", other),
        }
    }
}

/// 远程服务生成的单道选择题
///
/// 收到后不可变，直到被下一题替换。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(rename = "correct_answer")]
    pub correct_answer_index: usize,
}

impl Question {
    /// 校验题目结构：至少两个选项，正确答案下标在范围内
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.options.len() < 2 {
            return Err(ApiError::InvalidQuestion(format!(
                "题目 {} 只有 {} 个选项",
                self.id,
                self.options.len()
            )));
        }
        if self.correct_answer_index >= self.options.len() {
            return Err(ApiError::InvalidQuestion(format!(
                "题目 {} 的正确答案下标 {} 超出范围 [0, {})",
                self.id,
                self.correct_answer_index,
                self.options.len()
            )));
        }
        Ok(())
    }

    pub fn has_option(&self, index: usize) -> bool {
        index < self.options.len()
    }
}

/// 提交答案的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerSubmission {
    #[serde(rename = "questionId")]
    pub question_id: QuestionId,
    pub answer: usize,
}

/// 提交答案的响应
///
/// 流程不依赖它，只用于调试日志，因此所有字段都可缺省。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub quizzes_completed: Option<u32>,
}

/// 服务端记录的答题进度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub quizzes_completed: u32,
}
