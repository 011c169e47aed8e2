//! # CheatSheet Quiz
//!
//! 从安全速查表生成单选题试卷的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 只暴露能力，不含业务判断
//! - `ContentCache` - 按 URL 缓存清洗后的事实，过期后按未命中处理
//! - `PageFetcher` - 抓取页面条目行（`HttpPageFetcher` 为 reqwest 实现）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `DistractorPool` - 干扰项去重与排序
//! - `McqBuilder` - 按种子为一份速查表出题
//! - `StemEnhancer` / `LlmService` - 可选的题干改写
//! - `QuestionBank` - 题库的导入、抽题与持久化
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一套题"的完整生成流程
//! - `QuizRequest` - 请求封装（分类 + 题数 + 种子）
//! - `QuizFlow` - 流程编排（抓取 → 出题 → 拼卷 → 题库回退）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用生命周期和共享资源
//! - `orchestrator/fetch_orchestrator` - 并发抓取
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ContentCache, HttpPageFetcher, PageFetcher};
pub use models::{Category, CheatSheet, Question, Quiz};
pub use orchestrator::{App, FetchOrchestrator, FetchReport, SourceFacts};
pub use services::{DistractorPool, McqBuilder, QuestionBank};
pub use workflow::{QuizFlow, QuizOrigin, QuizOutcome, QuizRequest};
