//! 终端展示
//!
//! 题目、反馈、得分都输出为文本行；输入按行解析为命令。

use std::io::Write;
use tracing::warn;

use crate::models::{AuthMode, Credentials, Question};
use crate::ui::{QuizView, UserCommand};
use crate::workflow::OptionMark;

pub const HELP_TEXT: &str =
    "命令: login <用户名> <密码> | register <用户名> <密码> | <选项编号> | reset | quit";

/// 输出到任意 `Write` 的终端视图
pub struct TerminalView<W: Write + Send> {
    out: W,
    options: Vec<String>,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            options: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!("⚠️ 终端输出失败: {}", e);
        }
    }
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> QuizView for TerminalView<W> {
    fn show_auth_form(&mut self, mode: AuthMode) {
        self.line(&format!(
            "== {} == 输入: {} <用户名> <密码>",
            mode.title(),
            mode.title().to_lowercase()
        ));
    }

    fn hide_auth_form(&mut self) {
        self.line("== 已登录 ==");
    }

    fn show_alert(&mut self, message: &str) {
        self.line(&format!("[!] {}", message));
    }

    fn render_question(&mut self, question: &Question) {
        self.options = question.options.clone();
        self.line("");
        self.line(&question.prompt);
        for (i, option) in question.options.iter().enumerate() {
            self.line(&format!("  {}) {}", i + 1, option));
        }
    }

    fn show_prompt_message(&mut self, message: &str) {
        self.options.clear();
        self.line(message);
    }

    fn mark_option(&mut self, index: usize, mark: OptionMark) {
        let symbol = match mark {
            OptionMark::Correct => "✓",
            OptionMark::Incorrect => "✗",
        };
        let text = self.options.get(index).cloned().unwrap_or_default();
        self.line(&format!("  {} {}) {}", symbol, index + 1, text));
    }

    fn update_score(&mut self, score: u32) {
        self.line(&format!("得分: {}", score));
    }
}

/// 解析一行输入；无法识别时返回 `None`
///
/// 选项编号从 1 开始，转换为从 0 开始的下标。
pub fn parse_command(line: &str) -> Option<UserCommand> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;

    let mode = match head.to_lowercase().as_str() {
        "login" => Some(AuthMode::Login),
        "register" => Some(AuthMode::Register),
        "reset" | "logout" => return Some(UserCommand::Reset),
        "quit" | "exit" => return Some(UserCommand::Quit),
        _ => None,
    };

    if let Some(mode) = mode {
        let username = parts.next().unwrap_or_default();
        let password = parts.next().unwrap_or_default();
        return Some(UserCommand::Authenticate {
            mode,
            credentials: Credentials::new(username, password),
        });
    }

    match head.parse::<usize>() {
        Ok(n) if n >= 1 => Some(UserCommand::Select(n - 1)),
        _ => None,
    }
}
