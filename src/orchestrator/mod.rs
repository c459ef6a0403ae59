//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `session_controller` - 会话控制器
//! - 唯一持有 `SessionState`
//! - 单通道事件循环，按顺序处理用户命令和异步结果
//! - 执行状态机返回的副作用（取题、提交、定时、渲染）
//! - 按代次取消过期任务
//!
//! ### `app` - 应用入口
//! - 组装 HTTP 客户端、token 存储、终端视图
//! - 读取标准输入并转换为命令
//! - 输出会话统计
//!
//! ## 层次关系
//!
//! ```text
//! app (组装 + 输入)
//!     ↓
//! session_controller (事件循环 + 副作用)
//!     ↓
//! workflow::transition (纯状态转换)
//!     ↓
//! services::AuthService (认证能力)
//!     ↓
//! clients / infrastructure (HTTP、token 存储)
//! ```

pub mod app;
pub mod session_controller;

pub use app::App;
pub use session_controller::{
    SessionController, SessionHandle, SessionMessage, SessionSummary, SESSION_EXPIRED_MESSAGE,
    SESSION_UNVERIFIED_MESSAGE,
};
