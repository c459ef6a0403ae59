//! 会话控制器 - 编排层
//!
//! ## 职责
//!
//! 1. **持有状态**：唯一持有 `SessionState`，所有修改都经过 `transition`
//! 2. **事件循环**：从一个通道中按顺序处理用户命令和异步结果
//! 3. **执行副作用**：取题、提交、定时都作为 tokio 任务运行，结果以事件投递回来
//! 4. **取消**：认证、取题和定时任务按代次跟踪，重新认证或重置时中止，
//!    迟到的结果按代次丢弃
//!
//! 提交答案不被跟踪也不会被取消，失败只记日志。

use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::clients::QuizApi;
use crate::config::Config;
use crate::error::AuthError;
use crate::infrastructure::TokenStore;
use crate::models::{AccessToken, AnswerSubmission, AuthMode, Identity};
use crate::services::{AuthService, ResumeOutcome};
use crate::ui::{QuizView, UserCommand};
use crate::utils::logging::truncate_text;
use crate::workflow::{transition, QuizEffect, QuizEvent, SessionState};

/// 已保存的会话被服务端拒绝时的提示
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// 无法向服务端校验已保存会话时的提示
pub const SESSION_UNVERIFIED_MESSAGE: &str =
    "Could not reach the quiz server to restore your session. Please log in again.";

/// 控制器通道中的消息
#[derive(Debug)]
pub enum SessionMessage {
    Command(UserCommand),
    Event(QuizEvent),
    AuthFinished {
        generation: u64,
        result: Result<Identity, AuthError>,
    },
}

/// 向控制器投递用户命令的句柄
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl SessionHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SessionMessage>) -> Self {
        Self { tx }
    }

    /// 控制器已退出时返回 `false`
    pub fn send(&self, command: UserCommand) -> bool {
        self.tx.send(SessionMessage::Command(command)).is_ok()
    }
}

/// 会话统计
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub answered: u32,
    pub score: u32,
}

/// 会话控制器
pub struct SessionController {
    session: SessionState,
    api: Arc<dyn QuizApi>,
    auth: Arc<AuthService>,
    view: Box<dyn QuizView>,
    next_question_delay: Duration,
    validate_stored_token: bool,
    tx: mpsc::UnboundedSender<SessionMessage>,
    rx: mpsc::UnboundedReceiver<SessionMessage>,
    in_flight: Vec<AbortHandle>,
    auth_task: Option<AbortHandle>,
    started_at: DateTime<Local>,
}

impl SessionController {
    pub fn new(
        config: &Config,
        api: Arc<dyn QuizApi>,
        store: Arc<dyn TokenStore>,
        view: Box<dyn QuizView>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let auth = Arc::new(AuthService::new(api.clone(), store));

        Self {
            session: SessionState::new(),
            api,
            auth,
            view,
            next_question_delay: config.next_question_delay(),
            validate_stored_token: config.validate_stored_token,
            tx,
            rx,
            in_flight: Vec::new(),
            auth_task: None,
            started_at: Local::now(),
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(self.tx.clone())
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// 尚未结束的取题 / 定时任务数
    pub fn pending_tasks(&self) -> usize {
        self.in_flight.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            started_at: self.started_at,
            finished_at: Local::now(),
            answered: self.session.answered(),
            score: self.session.score(),
        }
    }

    /// 启动：有保存的 token 时尝试恢复会话，否则打开登录表单
    pub async fn start(&mut self) {
        match self.auth.resume(self.validate_stored_token).await {
            ResumeOutcome::NoToken => {
                info!("未找到已保存的 token，等待登录");
                self.view.show_auth_form(AuthMode::Login);
            }
            ResumeOutcome::Resumed(identity) => self.apply(QuizEvent::Resumed(identity)),
            ResumeOutcome::Expired { reason } => {
                debug!("恢复会话失败: {}", reason);
                self.view.show_alert(SESSION_EXPIRED_MESSAGE);
                self.apply(QuizEvent::SessionExpired);
            }
            ResumeOutcome::Unverified { reason } => {
                debug!("无法校验已保存的会话: {}", reason);
                self.view.show_alert(SESSION_UNVERIFIED_MESSAGE);
                self.apply(QuizEvent::SessionExpired);
            }
        }
    }

    /// 处理消息直到收到 `Quit`
    pub async fn run(&mut self) {
        while self.process_next().await {}
        self.cancel_in_flight();
    }

    /// 处理一条消息；收到 `Quit` 时返回 `false`
    pub async fn process_next(&mut self) -> bool {
        // 控制器自己持有发送端，通道不会关闭
        let Some(message) = self.rx.recv().await else {
            return false;
        };
        self.dispatch(message).await
    }

    async fn dispatch(&mut self, message: SessionMessage) -> bool {
        match message {
            SessionMessage::Command(command) => return self.on_command(command).await,
            SessionMessage::Event(event) => self.apply(event),
            SessionMessage::AuthFinished { generation, result } => {
                self.on_auth_finished(generation, result).await
            }
        }
        true
    }

    async fn on_command(&mut self, command: UserCommand) -> bool {
        match command {
            UserCommand::Authenticate { mode, credentials } => {
                if self.auth_task.is_some() {
                    debug!("已有认证请求进行中，忽略本次提交");
                    return true;
                }

                let generation = self.session.generation();
                let auth = self.auth.clone();
                let tx = self.tx.clone();
                let handle = tokio::spawn(async move {
                    let result = auth.authenticate(mode, credentials).await;
                    let _ = tx.send(SessionMessage::AuthFinished { generation, result });
                });
                self.auth_task = Some(handle.abort_handle());
            }
            UserCommand::Select(index) => self.apply(QuizEvent::OptionSelected { index }),
            UserCommand::Reset => {
                if let Some(handle) = self.auth_task.take() {
                    debug!("取消进行中的认证请求");
                    handle.abort();
                }
                self.auth.logout().await;
                self.apply(QuizEvent::Reset);
            }
            UserCommand::Quit => {
                info!("收到退出命令");
                return false;
            }
        }
        true
    }

    async fn on_auth_finished(&mut self, generation: u64, result: Result<Identity, AuthError>) {
        if generation != self.session.generation() {
            debug!(
                "丢弃过期的认证结果 (gen#{}, 当前 gen#{})",
                generation,
                self.session.generation()
            );
            return;
        }
        self.auth_task = None;

        let accepted = match result {
            Ok(identity) => {
                let saved = self.auth.remember(&identity).await;
                saved.map(|_| identity)
            }
            Err(e) => Err(e),
        };
        match accepted {
            Ok(identity) => self.apply(QuizEvent::Authenticated(identity)),
            Err(e) => {
                error!("❌ 认证失败: {}", e);
                // 表单保持打开，用户可以修改后重新提交
                self.view.show_alert(&e.user_message());
            }
        }
    }

    /// 执行一次状态转换及其副作用
    fn apply(&mut self, event: QuizEvent) {
        for effect in transition(&mut self.session, event) {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: QuizEffect) {
        match effect {
            QuizEffect::FetchQuestion { generation, token } => {
                self.spawn_fetch(generation, token)
            }
            QuizEffect::RenderQuestion(question) => {
                info!("📝 题目: {}", truncate_text(&question.prompt, 80));
                self.view.render_question(&question);
            }
            QuizEffect::ShowPromptMessage(message) => self.view.show_prompt_message(message),
            QuizEffect::MarkOption { index, mark } => self.view.mark_option(index, mark),
            QuizEffect::UpdateScore(score) => self.view.update_score(score),
            QuizEffect::SubmitAnswer { token, submission } => {
                self.spawn_submit(token, submission)
            }
            QuizEffect::ScheduleAdvance { generation } => self.spawn_advance(generation),
            QuizEffect::CancelInFlight => self.cancel_in_flight(),
            QuizEffect::ShowAuthForm(mode) => self.view.show_auth_form(mode),
            QuizEffect::HideAuthForm => self.view.hide_auth_form(),
        }
    }

    fn spawn_fetch(&mut self, generation: u64, token: AccessToken) {
        debug!("🔍 获取题目 (gen#{})", generation);
        let api = self.api.clone();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let event = match api.generate_question(&token).await {
                Ok(question) => QuizEvent::QuestionLoaded {
                    generation,
                    question,
                },
                Err(e) => QuizEvent::QuestionLoadFailed {
                    generation,
                    reason: e.to_string(),
                },
            };
            let _ = tx.send(SessionMessage::Event(event));
        });
        self.track(handle.abort_handle());
    }

    fn spawn_submit(&self, token: AccessToken, submission: AnswerSubmission) {
        let api = self.api.clone();
        tokio::spawn(async move {
            match api.submit_answer(&token, &submission).await {
                Ok(receipt) => debug!(
                    "📤 答案已提交: {} (服务端: {:?})",
                    submission.question_id, receipt.message
                ),
                Err(e) => warn!(
                    "⚠️ 答案提交失败 (题目 {}): {}",
                    submission.question_id, e
                ),
            }
        });
    }

    fn spawn_advance(&mut self, generation: u64) {
        let delay = self.next_question_delay;
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionMessage::Event(QuizEvent::AdvanceDue { generation }));
        });
        self.track(handle.abort_handle());
    }

    fn track(&mut self, handle: AbortHandle) {
        self.in_flight.retain(|h| !h.is_finished());
        self.in_flight.push(handle);
    }

    fn cancel_in_flight(&mut self) {
        let count = self.pending_tasks();
        if count > 0 {
            debug!("取消 {} 个进行中的任务", count);
        }
        for handle in self.in_flight.drain(..) {
            handle.abort();
        }
    }
}
