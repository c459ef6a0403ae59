//! 展示层
//!
//! 状态机只通过 [`QuizView`] 输出，用户输入统一转换为 [`UserCommand`]。

pub mod terminal;

use crate::models::{AuthMode, Credentials, Question};
use crate::workflow::OptionMark;

pub use terminal::{parse_command, TerminalView};

/// 展示面：题干区、选项区、得分、认证表单、提示框
pub trait QuizView: Send {
    fn show_auth_form(&mut self, mode: AuthMode);
    fn hide_auth_form(&mut self);
    fn show_alert(&mut self, message: &str);
    /// 用新题目替换题干和全部选项
    fn render_question(&mut self, question: &Question);
    fn show_prompt_message(&mut self, message: &str);
    fn mark_option(&mut self, index: usize, mark: OptionMark);
    fn update_score(&mut self, score: u32);
}

/// 用户输入
#[derive(Debug, Clone)]
pub enum UserCommand {
    /// 提交认证表单
    Authenticate {
        mode: AuthMode,
        credentials: Credentials,
    },
    /// 选择选项（从 0 开始）
    Select(usize),
    Reset,
    Quit,
}
