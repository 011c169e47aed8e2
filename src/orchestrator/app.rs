//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、分类目录、题库、缓存、抓取器、题干改写器
//! 2. **运行一次出题**：监听 Ctrl-C，生成试卷，写出 JSON
//! 3. **题库归档**：按配置把在线生成的题目收进题库并保存
//! 4. **全局统计**：输出最终统计信息
//!
//! 缓存和题库只在这里创建一次，之后通过 `Arc` 共享。

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{ContentCache, HttpPageFetcher, PageFetcher};
use crate::models::{load_catalog, Category, CheatSheet};
use crate::orchestrator::fetch_orchestrator::{FetchLimits, FetchOrchestrator};
use crate::services::question_bank::now_rfc3339;
use crate::services::{
    LlmService, LlmStemEnhancer, McqBuilder, NoopStemEnhancer, QuestionBank, StemEnhancer,
};
use crate::utils::logging::{init_log_file, log_catalog_loaded, log_startup, print_final_stats};
use crate::workflow::{QuizFlow, QuizOrigin, QuizOutcome, QuizRequest};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    catalog: Vec<Category>,
    bank: Arc<QuestionBank>,
    flow: QuizFlow,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        log_startup(config.max_fetch_workers, config.offline_mode);

        let bank = Arc::new(
            QuestionBank::open(&config.bank_path)
                .with_context(|| format!("无法加载题库: {}", config.bank_path))?,
        );

        let catalog = load_or_derive_catalog(&config, &bank).await?;
        log_catalog_loaded(
            catalog.len(),
            catalog.iter().map(|c| c.cheat_sheets.len()).sum(),
        );

        let fetcher: Arc<dyn PageFetcher> =
            Arc::new(HttpPageFetcher::new(&config).context("无法创建 HTTP 客户端")?);
        let cache = Arc::new(ContentCache::with_ttl_secs(config.cache_ttl_secs));
        let orchestrator =
            FetchOrchestrator::new(fetcher, cache, FetchLimits::from_config(&config));

        let flow = QuizFlow::new(
            orchestrator,
            build_mcq_builder(&config),
            Arc::clone(&bank),
            config.offline_mode,
        );

        Ok(Self {
            config,
            catalog,
            bank,
            flow,
        })
    }

    /// 由配置生成的出题请求
    pub fn request(&self) -> QuizRequest {
        QuizRequest::new(
            self.config.quiz_categories.clone(),
            Some(self.config.quiz_count),
            self.config.quiz_seed,
        )
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let cancel = CancellationToken::new();
        let ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⚠️ 收到 Ctrl-C，停止后续出题");
                ctrl_c.cancel();
            }
        });

        let request = self.request();
        let outcome = self.generate(&request, &cancel).await?;

        if self.config.archive_generated && outcome.origin == QuizOrigin::Live {
            self.archive(&outcome);
        }

        self.write_output(&outcome).await?;

        print_final_stats(
            &outcome.origin.to_string(),
            outcome.quiz.questions.len(),
            outcome.failed_sources,
            outcome.stem_fallbacks,
            &self.config.output_path,
        );

        Ok(())
    }

    /// 生成一套题
    pub async fn generate(
        &self,
        request: &QuizRequest,
        cancel: &CancellationToken,
    ) -> AppResult<QuizOutcome> {
        self.flow.generate(&self.catalog, request, cancel).await
    }

    /// 把在线生成的题目追加进题库并保存
    ///
    /// 题库中已有的题目 ID 不会重复追加；保存失败只记录警告，内存中的题库保留新题目
    fn archive(&self, outcome: &QuizOutcome) {
        let archived = self.bank.archive(&outcome.quiz.questions, &now_rfc3339());
        if archived == 0 {
            info!("💾 题库中已有全部题目，无需归档");
            return;
        }

        match self.bank.persist() {
            Ok(()) => info!("💾 已归档 {} 道题到题库", archived),
            Err(e) => warn!("⚠️ 题库保存失败: {}", e),
        }
    }

    async fn write_output(&self, outcome: &QuizOutcome) -> Result<()> {
        let json = serde_json::to_string_pretty(outcome).context("试卷序列化失败")?;
        let path = Path::new(&self.config.output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("无法写入试卷: {}", self.config.output_path))?;
        Ok(())
    }
}

/// 加载分类目录；目录不可用但题库有内容时，用题库中的分类代替
async fn load_or_derive_catalog(config: &Config, bank: &QuestionBank) -> Result<Vec<Category>> {
    match load_catalog(Path::new(&config.catalog_path)).await {
        Ok(catalog) => Ok(catalog),
        Err(e) if !bank.is_empty() => {
            warn!("⚠️ {}，改用题库中的分类", e);
            Ok(catalog_from_bank(bank))
        }
        Err(e) => Err(e).context("分类目录不可用且题库为空"),
    }
}

fn catalog_from_bank(bank: &QuestionBank) -> Vec<Category> {
    bank.categories()
        .into_iter()
        .map(|info| Category {
            id: info.id,
            name: info.name,
            cheat_sheets: Vec::<CheatSheet>::new(),
        })
        .collect()
}

fn build_mcq_builder(config: &Config) -> McqBuilder {
    let enhancer: Arc<dyn StemEnhancer> = if !config.stem_enhancer_enabled {
        Arc::new(NoopStemEnhancer)
    } else if config.llm_api_key.is_empty() {
        warn!("⚠️ 已启用题干改写但未配置 LLM_API_KEY，使用模板题干");
        Arc::new(NoopStemEnhancer)
    } else {
        let llm = LlmService::new(config);
        info!("🤖 题干改写模型: {}", llm.model_name());
        Arc::new(LlmStemEnhancer::new(llm))
    };

    McqBuilder::new(enhancer, Duration::from_millis(config.stem_timeout_ms))
}
