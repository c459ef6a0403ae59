//! 会话状态
//!
//! 封装"当前是谁、正在答哪道题、得了多少分"这一信息。
//! 只由 [`transition`](super::transition::transition) 修改。

use std::fmt::Display;

use crate::models::{AccessToken, Identity, Question};

/// 选项的反馈标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Correct,
    Incorrect,
}

/// 一次作答的评判结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub selected: usize,
    pub correct: usize,
}

impl Evaluation {
    /// 按题目的正确答案评判一次选择
    pub fn of(question: &Question, selected: usize) -> Self {
        Self {
            selected,
            correct: question.correct_answer_index,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.selected == self.correct
    }

    /// 需要高亮的选项：答对时一个，答错时两个
    pub fn marks(&self) -> Vec<(usize, OptionMark)> {
        if self.is_correct() {
            vec![(self.correct, OptionMark::Correct)]
        } else {
            vec![
                (self.selected, OptionMark::Incorrect),
                (self.correct, OptionMark::Correct),
            ]
        }
    }
}

/// 答题流程状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QuizState {
    /// 没有题目，也没有请求在进行
    #[default]
    Idle,
    /// 正在获取题目；`previous` 是尚未被替换的上一题
    Loading { previous: Option<Question> },
    /// 题目已展示，等待选择
    Displayed { question: Question },
    /// 已评分，等待定时加载下一题
    Evaluated {
        question: Question,
        evaluation: Evaluation,
    },
    /// 获取题目失败，流程停止
    LoadFailed { previous: Option<Question> },
}

impl QuizState {
    pub fn name(&self) -> &'static str {
        match self {
            QuizState::Idle => "Idle",
            QuizState::Loading { .. } => "Loading",
            QuizState::Displayed { .. } => "Displayed",
            QuizState::Evaluated { .. } => "Evaluated",
            QuizState::LoadFailed { .. } => "LoadFailed",
        }
    }

    /// 当前题目（至多一道）
    pub fn current_question(&self) -> Option<&Question> {
        match self {
            QuizState::Idle => None,
            QuizState::Loading { previous } | QuizState::LoadFailed { previous } => {
                previous.as_ref()
            }
            QuizState::Displayed { question } | QuizState::Evaluated { question, .. } => {
                Some(question)
            }
        }
    }

    /// 离开当前状态时交出题目，供 `Loading` 保留
    pub(crate) fn take_question(&mut self) -> Option<Question> {
        match std::mem::take(self) {
            QuizState::Idle => None,
            QuizState::Loading { previous } | QuizState::LoadFailed { previous } => previous,
            QuizState::Displayed { question } | QuizState::Evaluated { question, .. } => {
                Some(question)
            }
        }
    }
}

/// 单个用户会话的可变状态
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub(crate) identity: Option<Identity>,
    pub(crate) quiz: QuizState,
    pub(crate) score: u32,
    pub(crate) answered: u32,
    pub(crate) generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.identity.as_ref().map(|identity| &identity.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn quiz(&self) -> &QuizState {
        &self.quiz
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.current_question()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// 本次会话已作答的题目数
    pub fn answered(&self) -> u32 {
        self.answered
    }

    /// 每次重新认证或重置时递增，用于丢弃过期的异步结果
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[会话 gen#{} 状态#{} 得分#{}/{}]",
            self.generation,
            self.quiz.name(),
            self.score,
            self.answered
        )
    }
}
