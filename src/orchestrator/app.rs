//! 应用入口 - 编排层
//!
//! 组装配置、HTTP 客户端、token 存储、终端视图和会话控制器，
//! 并把标准输入转换为用户命令。

use anyhow::{Context, Result};
use std::sync::Arc;
use std::io::ErrorKind;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::clients::{QuizApi, QuizClient};
use crate::config::Config;
use crate::infrastructure::{FileTokenStore, TokenStore};
use crate::orchestrator::session_controller::{SessionController, SessionHandle};
use crate::ui::terminal::HELP_TEXT;
use crate::ui::{parse_command, TerminalView, UserCommand};
use crate::utils::logging::{log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    controller: SessionController,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let api: Arc<dyn QuizApi> =
            Arc::new(QuizClient::new(&config).context("无法创建测验服务客户端")?);
        let token_store = FileTokenStore::new(&config.token_file);
        debug!("token 文件: {}", token_store.path().display());
        let store: Arc<dyn TokenStore> = Arc::new(token_store);

        let controller =
            SessionController::new(&config, api, store, Box::new(TerminalView::stdout()));

        Ok(Self { controller })
    }

    /// 运行应用主逻辑，直到用户退出
    pub async fn run(mut self) -> Result<()> {
        println!("{}", HELP_TEXT);
        spawn_stdin_reader(self.controller.handle());

        self.controller.start().await;
        self.controller.run().await;

        print_final_stats(&self.controller.summary());
        Ok(())
    }
}

/// 逐行读取标准输入，EOF 视为退出
fn spawn_stdin_reader(handle: SessionHandle) {
    tokio::spawn(forward_lines(
        BufReader::new(tokio::io::stdin()),
        handle,
    ));
}

/// 把输入行转换为命令投递给控制器
///
/// 非 UTF-8 的行跳过；EOF 或其他读取错误时投递 `Quit`。
async fn forward_lines<R>(reader: R, handle: SessionHandle)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Some(command) => {
                    if !handle.send(command) {
                        return;
                    }
                }
                None if line.trim().is_empty() => {}
                None => println!("{}", HELP_TEXT),
            },
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!("⚠️ 忽略无法解码的输入行: {}", e);
            }
            Ok(None) => {
                info!("输入结束");
                handle.send(UserCommand::Quit);
                return;
            }
            Err(e) => {
                warn!("⚠️ 读取标准输入失败: {}", e);
                handle.send(UserCommand::Quit);
                return;
            }
        }
    }
}
