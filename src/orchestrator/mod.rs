//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责并发调度和应用生命周期，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 创建并持有缓存、题库等共享资源
//! - 写出试卷、归档题库、输出统计信息
//!
//! ### `fetch_orchestrator` - 抓取编排器
//! - 规划抓取任务（分类顺序、页数限制）
//! - 控制并发数量（Semaphore）
//! - 缓存优先，失败跳过
//!
//! ## 层次关系
//!
//! ```text
//! app (一次出题)
//!     ↓
//! workflow::QuizFlow (抓取 → 出题 → 拼卷 → 题库回退)
//!     ↓
//! fetch_orchestrator (并发抓取)      services (干扰项 / 出题 / 题库)
//!     ↓
//! infrastructure (ContentCache / PageFetcher)
//! ```

pub mod app;
pub mod fetch_orchestrator;

// 重新导出主要类型
pub use app::App;
pub use fetch_orchestrator::{FetchJob, FetchLimits, FetchOrchestrator, FetchReport, SourceFacts};
