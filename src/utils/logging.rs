//! 日志工具模块
//!
//! 提供日志初始化以及格式化输出的辅助函数

use anyhow::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则 `verbose` 为真时使用 debug 级别
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n出题日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_workers`: 最大并发抓取数
/// - `offline`: 是否离线模式
pub fn log_startup(max_workers: usize, offline: bool) {
    info!("{}", "=".repeat(60));
    if offline {
        info!("🚀 程序启动 - 离线题库模式");
    } else {
        info!("🚀 程序启动 - 在线抓取出题模式");
        info!("📊 最大并发抓取数: {}", max_workers);
    }
    info!("{}", "=".repeat(60));
}

/// 记录分类目录加载信息
pub fn log_catalog_loaded(categories: usize, cheat_sheets: usize) {
    info!("✓ 分类目录加载完成: {} 个分类, {} 个速查表", categories, cheat_sheets);
}

/// 打印最终统计信息
///
/// # 参数
/// - `origin`: 题目来源描述
/// - `questions`: 题目数量
/// - `failed_sources`: 抓取失败的来源数
/// - `stem_fallbacks`: 题干改写回退次数
/// - `output_path`: 试卷输出路径
pub fn print_final_stats(
    origin: &str,
    questions: usize,
    failed_sources: usize,
    stem_fallbacks: usize,
    output_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 出题完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📚 题目来源: {}", origin);
    info!("✅ 题目数量: {}", questions);
    info!("❌ 抓取失败来源: {}", failed_sources);
    info!("↩️ 题干改写回退: {}", stem_fallbacks);
    info!("{}", "=".repeat(60));
    info!("\n试卷已保存至: {}", output_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
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
