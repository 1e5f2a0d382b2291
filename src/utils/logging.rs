//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时默认 info，`verbose` 为 true 时 debug。
pub fn init(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("日志初始化失败: {}", e))
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, documents: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 选择题批量抽取");
    info!("📄 待处理文档: {}", documents);
    info!(
        "📚 每批 {} 页，字符上限 {}，忽略窗口上限 {}",
        config.pages_per_batch, config.max_chars_per_batch, config.max_questions_to_ignore
    );
    info!("🤖 模型: {}", config.llm_model_name);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
pub fn log_batch_start(batch_num: usize, total_batches: usize, start_page: usize, end_page: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📦 处理第 {}/{} 批（第 {}-{} 页）",
        batch_num, total_batches, start_page, end_page
    );
}

/// 打印最终统计信息
pub fn print_final_stats(success: usize, empty: usize, failed: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("📭 无题目: {}", empty);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
