//! 答题流程 - 流程层
//!
//! 核心职责：定义会话状态如何响应事件
//!
//! 状态流转：
//! 1. Idle → Loading（认证成功 / 恢复会话）
//! 2. Loading → Displayed（题目到达）或 LoadFailed（获取失败，流程停止）
//! 3. Displayed → Evaluated（选择选项，评分并提交）
//! 4. Evaluated → Loading（固定延迟后）
//!
//! 这里只修改 [`SessionState`] 并返回副作用，不做任何 IO。

use tracing::{debug, info, warn};

use crate::models::{AccessToken, AnswerSubmission, AuthMode, Identity, Question};
use crate::workflow::quiz_state::{Evaluation, OptionMark, QuizState, SessionState};

/// 获取题目失败时显示的固定提示
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load question. Please try again.";

/// 驱动状态机的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// 登录 / 注册成功
    Authenticated(Identity),
    /// 启动时恢复已保存的会话
    Resumed(Identity),
    /// 已保存的 token 失效
    SessionExpired,
    /// 题目到达
    QuestionLoaded { generation: u64, question: Question },
    /// 获取题目失败
    QuestionLoadFailed { generation: u64, reason: String },
    /// 用户选择了某个选项（从 0 开始）
    OptionSelected { index: usize },
    /// 固定延迟结束
    AdvanceDue { generation: u64 },
    /// 显式重置（注销）
    Reset,
}

/// 状态机要求执行的副作用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEffect {
    /// 发起带 token 的取题请求
    FetchQuestion { generation: u64, token: AccessToken },
    /// 用新题目替换题干和所有选项
    RenderQuestion(Question),
    /// 在题干区域显示提示
    ShowPromptMessage(&'static str),
    /// 高亮某个选项
    MarkOption { index: usize, mark: OptionMark },
    /// 刷新得分显示
    UpdateScore(u32),
    /// 后台提交答案，失败只记日志
    SubmitAnswer {
        token: AccessToken,
        submission: AnswerSubmission,
    },
    /// 固定延迟后投递 `AdvanceDue`
    ScheduleAdvance { generation: u64 },
    /// 取消所有进行中的取题 / 定时任务
    CancelInFlight,
    ShowAuthForm(AuthMode),
    HideAuthForm,
}

/// 唯一的状态转换函数
pub fn transition(session: &mut SessionState, event: QuizEvent) -> Vec<QuizEffect> {
    match event {
        QuizEvent::Authenticated(identity) => {
            let mut effects = vec![QuizEffect::HideAuthForm];
            effects.extend(start_session(session, identity));
            effects
        }
        QuizEvent::Resumed(identity) => start_session(session, identity),
        QuizEvent::SessionExpired => {
            info!("会话已失效，需要重新登录");
            session.identity = None;
            session.generation += 1;
            session.quiz = QuizState::Idle;
            vec![
                QuizEffect::CancelInFlight,
                QuizEffect::ShowAuthForm(AuthMode::Login),
            ]
        }
        QuizEvent::QuestionLoaded {
            generation,
            question,
        } => on_question_loaded(session, generation, question),
        QuizEvent::QuestionLoadFailed { generation, reason } => {
            if !is_pending_load(session, generation) {
                debug!("丢弃过期的取题失败结果 (gen#{}): {}", generation, reason);
                return Vec::new();
            }
            warn!("⚠️ 获取题目失败: {}", reason);
            let previous = session.quiz.take_question();
            session.quiz = QuizState::LoadFailed { previous };
            vec![QuizEffect::ShowPromptMessage(LOAD_FAILED_MESSAGE)]
        }
        QuizEvent::OptionSelected { index } => on_option_selected(session, index),
        QuizEvent::AdvanceDue { generation } => {
            let is_due = generation == session.generation
                && matches!(session.quiz, QuizState::Evaluated { .. });
            if !is_due {
                debug!("丢弃过期的定时器 (gen#{})", generation);
                return Vec::new();
            }
            begin_loading(session)
        }
        QuizEvent::Reset => {
            info!("🔄 会话重置");
            session.identity = None;
            session.generation += 1;
            session.quiz = QuizState::Idle;
            vec![
                QuizEffect::CancelInFlight,
                QuizEffect::ShowAuthForm(AuthMode::Login),
            ]
        }
    }
}

/// 认证 / 恢复后进入取题状态，旧的异步结果全部作废
fn start_session(session: &mut SessionState, identity: Identity) -> Vec<QuizEffect> {
    info!("👤 会话开始: {}", identity.display_name());
    session.identity = Some(identity);
    session.generation += 1;

    let mut effects = vec![QuizEffect::CancelInFlight];
    effects.extend(begin_loading(session));
    effects
}

fn begin_loading(session: &mut SessionState) -> Vec<QuizEffect> {
    let Some(token) = session.token().cloned() else {
        warn!("⚠️ 未认证，无法获取题目");
        session.quiz = QuizState::Idle;
        return Vec::new();
    };

    let previous = session.quiz.take_question();
    session.quiz = QuizState::Loading { previous };
    vec![QuizEffect::FetchQuestion {
        generation: session.generation,
        token,
    }]
}

fn is_pending_load(session: &SessionState, generation: u64) -> bool {
    generation == session.generation && matches!(session.quiz, QuizState::Loading { .. })
}

fn on_question_loaded(
    session: &mut SessionState,
    generation: u64,
    question: Question,
) -> Vec<QuizEffect> {
    if !is_pending_load(session, generation) {
        debug!(
            "丢弃过期的题目 {} (gen#{}, 当前 {})",
            question.id, generation, session
        );
        return Vec::new();
    }

    if let Err(e) = question.validate() {
        warn!("⚠️ {}", e);
        let previous = session.quiz.take_question();
        session.quiz = QuizState::LoadFailed { previous };
        return vec![QuizEffect::ShowPromptMessage(LOAD_FAILED_MESSAGE)];
    }

    debug!("展示题目 {}", question.id);
    session.quiz = QuizState::Displayed {
        question: question.clone(),
    };
    vec![QuizEffect::RenderQuestion(question)]
}

fn on_option_selected(session: &mut SessionState, index: usize) -> Vec<QuizEffect> {
    let question = match &session.quiz {
        QuizState::Displayed { question } => question,
        other => {
            debug!("忽略选择 {}: 当前状态 {}", index, other.name());
            return Vec::new();
        }
    };
    if !question.has_option(index) {
        debug!(
            "忽略选择 {}: 题目 {} 只有 {} 个选项",
            index,
            question.id,
            question.options.len()
        );
        return Vec::new();
    }
    let Some(token) = session.token().cloned() else {
        debug!("忽略选择 {}: 未认证", index);
        return Vec::new();
    };

    let question = question.clone();
    let evaluation = Evaluation::of(&question, index);

    session.answered += 1;
    let mut effects = Vec::new();
    if evaluation.is_correct() {
        session.score += 1;
        info!("✓ 回答正确 (得分: {})", session.score);
        effects.push(QuizEffect::UpdateScore(session.score));
    } else {
        info!(
            "✗ 回答错误: 选择 {}, 正确答案 {}",
            evaluation.selected, evaluation.correct
        );
    }

    effects.extend(
        evaluation
            .marks()
            .into_iter()
            .map(|(index, mark)| QuizEffect::MarkOption { index, mark }),
    );
    effects.push(QuizEffect::SubmitAnswer {
        token,
        submission: AnswerSubmission {
            question_id: question.id.clone(),
            answer: index,
        },
    });
    effects.push(QuizEffect::ScheduleAdvance {
        generation: session.generation,
    });

    session.quiz = QuizState::Evaluated {
        question,
        evaluation,
    };
    effects
}
