//! # Quiz Session
//!
//! 交互式问答测验的客户端会话控制器：登录、逐题获取、作答、本地计分、上报、定时进入下一题。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `clients/` - `QuizApi` 远程能力及其 reqwest 实现 `QuizClient`
//! - `infrastructure/` - `TokenStore` token 持久化（文件 / 内存）
//!
//! ### ② 业务能力层（Services）
//! - `AuthService` - 用凭据换取身份，恢复已保存的会话
//!
//! ### ③ 流程层（Workflow）
//! - `SessionState` - 身份 + 当前题目 + 得分 + 代次
//! - `transition` - 唯一的状态转换函数（Idle → Loading → Displayed → Evaluated → Loading）
//!
//! ### ④ 编排层（Orchestration）
//! - `SessionController` - 单线程事件循环，执行副作用
//! - `App` - 组装终端应用
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod ui;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{QuizApi, QuizClient};
pub use config::Config;
pub use error::{ApiError, AuthError};
pub use infrastructure::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use models::{Identity, Question};
pub use orchestrator::{App, SessionController, SessionHandle};
pub use services::AuthService;
pub use ui::{QuizView, UserCommand};
pub use workflow::{transition, QuizEffect, QuizEvent, QuizState, SessionState};
