/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use crate::config::Config;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// 优先使用 `RUST_LOG`，未设置时按 `verbose_logging` 选择 debug / info。
/// 日志写到 stderr，stdout 留给工具输出。
pub fn init(config: &Config) {
    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("socrates={}", default_level)));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if let Err(e) = result {
        debug!("全局日志已存在，沿用现有订阅者: {}", e);
    }
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 Socrates 启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🔗 检索接口: {}", config.arxiv_api_base);
    info!("📁 PDF 缓存: {}", config.pdf_cache_dir.display());
    info!("📥 下载目录: {}", config.download_dir.display());
    info!("{}", "=".repeat(60));
}

/// 记录工具调用
///
/// # 参数
/// - `tool`: 工具名称
/// - `argument`: 主要参数（查询词或命令）
pub fn log_tool_call(tool: &str, argument: &str) {
    info!("\n{}", "─".repeat(60));
    info!("🛠️ 调用工具 {}: {}", tool, truncate_text(argument, 80));
}

/// 记录批量下载完成信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
pub fn log_batch_complete(success: usize, failed: usize, total: usize) {
    info!("{}", "─".repeat(60));
    info!("✓ 批量下载完成: 成功 {}/{}, 失败 {}", success, total, failed);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
