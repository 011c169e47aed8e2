//! 出题流程 - 流程层
//!
//! 核心职责：定义"一套题"的完整生成流程
//!
//! 流程顺序：
//! 1. 解析请求，确定分类
//! 2. 抓取速查表 → 合并干扰项池 → 逐个来源出题 → 拼卷
//! 3. 在线流程没有产出（或离线模式）时从题库抽题
//!
//! 取消信号只在阶段之间和来源之间检查，不会打断正在进行的抓取。

use crate::error::{AppResult, QuizError};
use crate::models::{Category, Quiz};
use crate::orchestrator::FetchOrchestrator;
use crate::services::{assemble_quiz, McqBuilder, McqInput, QuestionBank};
use crate::workflow::quiz_request::QuizRequest;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 题目来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizOrigin {
    /// 在线抓取速查表生成
    Live,
    /// 从题库抽取
    Bank,
}

impl Display for QuizOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizOrigin::Live => write!(f, "在线抓取"),
            QuizOrigin::Bank => write!(f, "题库"),
        }
    }
}

/// 一次出题的结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub quiz: Quiz,
    /// 目录中全部分类 ID（排序）
    pub all_categories: Vec<String>,
    /// 实际使用的分类 ID
    pub selected: Vec<String>,
    /// 分类 ID -> 名称
    pub category_names: BTreeMap<String, String>,
    pub origin: QuizOrigin,
    pub stem_fallbacks: usize,
    pub failed_sources: usize,
}

/// 出题流程
///
/// - 编排抓取、出题、拼卷和题库回退
/// - 只依赖编排器和业务能力，不直接访问网络
pub struct QuizFlow {
    orchestrator: FetchOrchestrator,
    mcq_builder: McqBuilder,
    bank: Arc<QuestionBank>,
    offline: bool,
}

impl QuizFlow {
    pub fn new(
        orchestrator: FetchOrchestrator,
        mcq_builder: McqBuilder,
        bank: Arc<QuestionBank>,
        offline: bool,
    ) -> Self {
        Self {
            orchestrator,
            mcq_builder,
            bank,
            offline,
        }
    }

    pub fn bank(&self) -> &Arc<QuestionBank> {
        &self.bank
    }

    /// 生成一套题
    pub async fn generate(
        &self,
        catalog: &[Category],
        request: &QuizRequest,
        cancel: &CancellationToken,
    ) -> AppResult<QuizOutcome> {
        let all_categories = sorted_ids(catalog);
        let category_names: BTreeMap<String, String> = catalog
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();
        let selected = resolve_selection(catalog, request);

        info!("📝 开始出题 {}", request);

        let mut outcome = QuizOutcome {
            quiz: Quiz {
                id: String::new(),
                questions: Vec::new(),
            },
            all_categories,
            selected,
            category_names,
            origin: QuizOrigin::Live,
            stem_fallbacks: 0,
            failed_sources: 0,
        };

        if cancel.is_cancelled() {
            return Err(QuizError::Cancelled.into());
        }

        if !self.offline {
            let categories: Vec<Category> = outcome
                .selected
                .iter()
                .filter_map(|id| catalog.iter().find(|c| &c.id == id))
                .cloned()
                .collect();

            let (quiz, stem_fallbacks, failed_sources) =
                self.generate_live(&categories, request, cancel).await?;
            outcome.stem_fallbacks = stem_fallbacks;
            outcome.failed_sources = failed_sources;

            if !quiz.questions.is_empty() {
                outcome.quiz = quiz;
                return Ok(outcome);
            }
            warn!("⚠️ 在线出题没有产出，改为从题库抽题");
        }

        match self.serve_from_bank(&outcome.selected, request) {
            Some(quiz) => {
                outcome.quiz = quiz;
                outcome.origin = QuizOrigin::Bank;
                Ok(outcome)
            }
            None => Err(QuizError::NoQuestionsGenerated {
                categories: outcome.selected,
            }
            .into()),
        }
    }

    /// 在线流程：抓取 → 干扰项池 → 逐个来源出题 → 拼卷
    ///
    /// 返回 (试卷, 题干回退次数, 失败来源数)
    async fn generate_live(
        &self,
        categories: &[Category],
        request: &QuizRequest,
        cancel: &CancellationToken,
    ) -> AppResult<(Quiz, usize, usize)> {
        let report = self.orchestrator.fetch(categories).await;

        if cancel.is_cancelled() {
            return Err(QuizError::Cancelled.into());
        }

        let pool = report.distractor_pool();
        info!("🧩 干扰项池: {} 条", pool.len());

        let mut bundles = Vec::with_capacity(report.sources.len());
        let mut stem_fallbacks = 0;

        for source in &report.sources {
            if cancel.is_cancelled() {
                return Err(QuizError::Cancelled.into());
            }

            let input = McqInput {
                category_id: &source.category_id,
                category_name: &source.category_name,
                sheet: &source.sheet,
                facts: &source.facts,
                seed: request.source_seed(source.sheet_index),
            };

            match self.mcq_builder.build(input, &pool).await {
                Ok(bundle) => {
                    info!(
                        "✓ {} 生成 {} 道题",
                        source.sheet.title,
                        bundle.questions.len()
                    );
                    stem_fallbacks += bundle.stem_fallbacks;
                    bundles.push(bundle.questions);
                }
                Err(e) => {
                    warn!("⚠️ {} 出题失败，跳过: {}", source.sheet.title, e);
                }
            }
        }

        let mut quiz = assemble_quiz(bundles);
        quiz.questions.truncate(request.count);
        Ok((quiz, stem_fallbacks, report.failed))
    }

    /// 从题库按种子抽题；题库中没有可用题目时返回 None
    pub fn serve_from_bank(&self, category_ids: &[String], request: &QuizRequest) -> Option<Quiz> {
        let questions = self
            .bank
            .get_random(category_ids, request.count, request.seed);
        if questions.is_empty() {
            return None;
        }
        info!("📚 从题库抽取 {} 道题", questions.len());
        Some(Quiz {
            id: uuid::Uuid::new_v4().to_string(),
            questions,
        })
    }
}

fn sorted_ids(catalog: &[Category]) -> Vec<String> {
    let mut ids: Vec<String> = catalog.iter().map(|c| c.id.clone()).collect();
    ids.sort();
    ids.dedup();
    ids
}

/// 过滤掉目录中不存在的分类；结果为空时使用全部分类
pub fn resolve_selection(catalog: &[Category], request: &QuizRequest) -> Vec<String> {
    let selected: Vec<String> = request
        .category_ids
        .iter()
        .filter(|id| catalog.iter().any(|c| &c.id == *id))
        .cloned()
        .collect();

    if selected.is_empty() {
        if !request.category_ids.is_empty() {
            warn!(
                "⚠️ 请求的分类都不存在 ({:?})，使用全部分类",
                request.category_ids
            );
        }
        return sorted_ids(catalog);
    }
    selected
}
