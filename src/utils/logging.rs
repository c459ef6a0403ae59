/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::SessionSummary;

/// 初始化 tracing
///
/// `RUST_LOG` 优先；否则默认 `info`，详细模式下为 `debug`。
/// 重复调用不会报错（测试中常见）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 测验会话");
    info!("🌐 服务地址: {}", config.api_base_url);
    info!("⏱  下一题延迟: {} ms", config.next_question_delay_ms);
    info!("{}", "=".repeat(60));
}

/// 打印会话统计信息
pub fn print_final_stats(summary: &SessionSummary) {
    let elapsed = summary.finished_at - summary.started_at;
    info!("\n{}", "=".repeat(60));
    info!("📊 会话统计");
    info!(
        "开始时间: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S")
    );
    info!(
        "结束时间: {}",
        summary.finished_at.format("%Y-%m-%d %H:%M:%S")
    );
    info!("持续: {} 秒", elapsed.num_seconds());
    info!("{}", "=".repeat(60));
    info!("✅ 答对: {}/{}", summary.score, summary.answered);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
