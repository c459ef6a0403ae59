//! 集成测试共用的内存实现
#![allow(dead_code)]

use async_trait::async_trait;
use quiz_session::error::{ApiError, AuthError};
use quiz_session::models::{
    AccessToken, AnswerSubmission, AuthMode, AuthResponse, Credentials, Progress, Question,
    SubmitReceipt, UserProfile,
};
use quiz_session::workflow::OptionMark;
use quiz_session::{Config, MemoryTokenStore, QuizApi, QuizView, SessionController};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const VALID_TOKEN: &str = "token-a";

pub fn question(id: &str, options: &[&str], correct: usize) -> Question {
    Question {
        id: id.into(),
        prompt: format!("Question {}?", id),
        options: options.iter().map(|s| s.to_string()).collect(),
        correct_answer_index: correct,
    }
}

fn bad_status(endpoint: &str, status: StatusCode, message: &str) -> ApiError {
    ApiError::BadStatus {
        endpoint: endpoint.to_string(),
        status,
        message: Some(message.to_string()),
    }
}

#[derive(Default)]
struct FakeState {
    questions: VecDeque<Option<Question>>,
    generate_tokens: Vec<String>,
    submissions: Vec<AnswerSubmission>,
    auth_calls: Vec<AuthMode>,
    fail_submissions: bool,
    register_returns_token: bool,
    progress_unavailable: bool,
}

/// 内存版测验服务
///
/// 只接受 a/b 这一组凭据；题目按队列返回，`None` 或队列耗尽时返回 500。
#[derive(Default)]
pub struct FakeQuizApi {
    state: Mutex<FakeState>,
}

impl FakeQuizApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_question(&self, question: Question) {
        self.state.lock().unwrap().questions.push_back(Some(question));
    }

    pub fn push_failure(&self) {
        self.state.lock().unwrap().questions.push_back(None);
    }

    pub fn fail_submissions(&self) {
        self.state.lock().unwrap().fail_submissions = true;
    }

    pub fn register_returns_token(&self) {
        self.state.lock().unwrap().register_returns_token = true;
    }

    pub fn progress_unavailable(&self) {
        self.state.lock().unwrap().progress_unavailable = true;
    }

    pub fn generate_calls(&self) -> usize {
        self.state.lock().unwrap().generate_tokens.len()
    }

    pub fn generate_tokens(&self) -> Vec<String> {
        self.state.lock().unwrap().generate_tokens.clone()
    }

    pub fn submissions(&self) -> Vec<AnswerSubmission> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn auth_calls(&self) -> Vec<AuthMode> {
        self.state.lock().unwrap().auth_calls.clone()
    }
}

#[async_trait]
impl QuizApi for FakeQuizApi {
    async fn authenticate(
        &self,
        mode: AuthMode,
        credentials: &Credentials,
    ) -> Result<AuthResponse, AuthError> {
        let mut state = self.state.lock().unwrap();
        state.auth_calls.push(mode);

        if credentials.username != "a" || credentials.password != "b" {
            return Err(AuthError::Rejected {
                status: StatusCode::UNAUTHORIZED,
                message: Some("Invalid credentials".to_string()),
            });
        }

        if mode == AuthMode::Register && !state.register_returns_token {
            return Ok(AuthResponse {
                message: Some("Registration successful".to_string()),
                ..AuthResponse::default()
            });
        }

        Ok(AuthResponse {
            user: Some(UserProfile {
                username: Some("a".to_string()),
                score: 0,
                quizzes_completed: 0,
            }),
            token: Some(VALID_TOKEN.to_string()),
            message: None,
        })
    }

    async fn generate_question(&self, token: &AccessToken) -> Result<Question, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.generate_tokens.push(token.as_str().to_string());

        if token.as_str() != VALID_TOKEN {
            return Err(bad_status(
                "/api/quiz/generate",
                StatusCode::UNAUTHORIZED,
                "Token is invalid",
            ));
        }
        match state.questions.pop_front() {
            Some(Some(question)) => Ok(question),
            _ => Err(bad_status(
                "/api/quiz/generate",
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate question",
            )),
        }
    }

    async fn submit_answer(
        &self,
        _token: &AccessToken,
        submission: &AnswerSubmission,
    ) -> Result<SubmitReceipt, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.submissions.push(submission.clone());
        if state.fail_submissions {
            return Err(bad_status(
                "/api/quiz/submit",
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
            ));
        }
        Ok(SubmitReceipt {
            message: Some("Answer submitted successfully".to_string()),
            ..SubmitReceipt::default()
        })
    }

    async fn fetch_progress(&self, token: &AccessToken) -> Result<Progress, ApiError> {
        if self.state.lock().unwrap().progress_unavailable {
            return Err(bad_status(
                "/api/quiz/progress",
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
            ));
        }
        if token.as_str() != VALID_TOKEN {
            return Err(bad_status(
                "/api/quiz/progress",
                StatusCode::UNAUTHORIZED,
                "Token has expired",
            ));
        }
        Ok(Progress {
            score: 4,
            quizzes_completed: 9,
        })
    }
}

/// 视图调用记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    ShowAuthForm(AuthMode),
    HideAuthForm,
    Alert(String),
    Render(String),
    Prompt(String),
    Mark(usize, OptionMark),
    Score(u32),
}

/// 记录所有调用的视图
#[derive(Clone, Default)]
pub struct RecordingView {
    calls: Arc<Mutex<Vec<ViewCall>>>,
}

impl RecordingView {
    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn marks(&self) -> Vec<(usize, OptionMark)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ViewCall::Mark(index, mark) => Some((index, mark)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(&self, call: ViewCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl QuizView for RecordingView {
    fn show_auth_form(&mut self, mode: AuthMode) {
        self.push(ViewCall::ShowAuthForm(mode));
    }

    fn hide_auth_form(&mut self) {
        self.push(ViewCall::HideAuthForm);
    }

    fn show_alert(&mut self, message: &str) {
        self.push(ViewCall::Alert(message.to_string()));
    }

    fn render_question(&mut self, question: &Question) {
        self.push(ViewCall::Render(question.id.to_string()));
    }

    fn show_prompt_message(&mut self, message: &str) {
        self.push(ViewCall::Prompt(message.to_string()));
    }

    fn mark_option(&mut self, index: usize, mark: OptionMark) {
        self.push(ViewCall::Mark(index, mark));
    }

    fn update_score(&mut self, score: u32) {
        self.push(ViewCall::Score(score));
    }
}

pub struct Harness {
    pub controller: SessionController,
    pub api: Arc<FakeQuizApi>,
    pub store: Arc<MemoryTokenStore>,
    pub view: RecordingView,
}

pub fn harness_with(config: Config, store: MemoryTokenStore) -> Harness {
    let api = Arc::new(FakeQuizApi::new());
    let store = Arc::new(store);
    let view = RecordingView::default();
    let controller =
        SessionController::new(&config, api.clone(), store.clone(), Box::new(view.clone()));
    Harness {
        controller,
        api,
        store,
        view,
    }
}

pub fn harness() -> Harness {
    harness_with(Config::default(), MemoryTokenStore::new())
}
