//! 抓取编排器 - 编排层
//!
//! ## 职责
//!
//! 把选中分类的速查表页面并发抓取下来，清洗成事实列表。
//!
//! 1. **任务规划**：按分类顺序、速查表顺序生成抓取任务，受每分类页数和总页数限制
//! 2. **并发控制**：使用 Semaphore 限制同时抓取的页面数
//! 3. **缓存优先**：命中缓存时不发请求，未命中时抓取、清洗后写入缓存
//! 4. **失败跳过**：单个来源失败只记日志，不影响其他来源
//! 5. **干扰项收集**：每个任务把自己的事实追加到共享的干扰项输入里
//!
//! 所有任务结束后才返回结果。

use crate::config::Config;
use crate::error::FetchError;
use crate::infrastructure::{ContentCache, PageFetcher};
use crate::models::{Category, CheatSheet};
use crate::services::DistractorPool;
use crate::utils::text::{clean_text, within_fact_length};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// 抓取限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// 同时抓取的页面数
    pub workers: usize,
    /// 每个分类最多抓取的速查表数
    pub pages_per_category: usize,
    /// 单次请求最多抓取的页面数
    pub max_pages: usize,
    pub min_fact_len: usize,
    pub max_fact_len: usize,
}

impl FetchLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.max_fetch_workers,
            pages_per_category: config.pages_per_category,
            max_pages: config.max_pages_per_request,
            min_fact_len: config.min_fact_len,
            max_fact_len: config.max_fact_len,
        }
    }
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 一个待抓取的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    pub category_id: String,
    pub category_name: String,
    pub sheet: CheatSheet,
    /// 速查表在所属分类中的位置
    pub sheet_index: usize,
}

/// 一个来源抓取到的事实
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFacts {
    pub category_id: String,
    pub category_name: String,
    pub sheet: CheatSheet,
    pub sheet_index: usize,
    pub facts: Vec<String>,
}

/// 抓取结果汇总
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// 成功的来源，按任务顺序
    pub sources: Vec<SourceFacts>,
    /// 所有成功来源的事实列表，用于构建干扰项池
    pub pool_inputs: Vec<Vec<String>>,
    /// 失败的来源数
    pub failed: usize,
    /// 命中缓存的来源数
    pub cache_hits: usize,
}

impl FetchReport {
    /// 合并所有来源的事实，得到干扰项池
    pub fn distractor_pool(&self) -> DistractorPool {
        DistractorPool::merge(&self.pool_inputs)
    }
}

/// 抓取编排器
pub struct FetchOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<ContentCache>,
    limits: FetchLimits,
}

impl FetchOrchestrator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, cache: Arc<ContentCache>, limits: FetchLimits) -> Self {
        Self {
            fetcher,
            cache,
            limits,
        }
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    /// 生成抓取任务：分类顺序优先，其次速查表顺序
    pub fn plan(&self, categories: &[Category]) -> Vec<FetchJob> {
        categories
            .iter()
            .flat_map(|category| {
                category
                    .cheat_sheets
                    .iter()
                    .take(self.limits.pages_per_category)
                    .enumerate()
                    .map(move |(sheet_index, sheet)| FetchJob {
                        category_id: category.id.clone(),
                        category_name: category.name.clone(),
                        sheet: sheet.clone(),
                        sheet_index,
                    })
            })
            .take(self.limits.max_pages)
            .collect()
    }

    /// 并发抓取所有任务并等待全部完成
    pub async fn fetch(&self, categories: &[Category]) -> FetchReport {
        let jobs = self.plan(categories);
        if jobs.is_empty() {
            warn!("⚠️ 没有可抓取的速查表");
            return FetchReport::default();
        }

        info!(
            "🌐 开始抓取 {} 个页面 (并发 {})",
            jobs.len(),
            self.limits.workers.max(1)
        );

        let semaphore = Arc::new(Semaphore::new(self.limits.workers.max(1)));
        let pool_inputs: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::with_capacity(jobs.len());

        for (idx, job) in jobs.into_iter().enumerate() {
            let job_index = idx + 1;
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("[来源 {}] 无法获取抓取许可: {}", job_index, e);
                    break;
                }
            };

            let fetcher = Arc::clone(&self.fetcher);
            let cache = Arc::clone(&self.cache);
            let pool_inputs = Arc::clone(&pool_inputs);
            let limits = self.limits;
            let url = job.sheet.url.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let loaded = load_facts(fetcher.as_ref(), &cache, &url, &limits).await?;
                if !loaded.facts.is_empty() {
                    pool_inputs
                        .lock()
                        .expect("pool accumulator poisoned")
                        .push(loaded.facts.clone());
                }
                Ok::<_, FetchError>(loaded)
            });
            handles.push((job_index, job, handle));
        }

        let mut report = FetchReport::default();

        for (job_index, job, handle) in handles {
            match handle.await {
                Ok(Ok(loaded)) => {
                    if loaded.from_cache {
                        report.cache_hits += 1;
                    }
                    if loaded.facts.is_empty() {
                        warn!(
                            "[来源 {}] ⚠️ {} 没有提取到事实，跳过",
                            job_index, job.sheet.title
                        );
                        continue;
                    }
                    debug!(
                        "[来源 {}] ✓ {} 提取到 {} 条事实{}",
                        job_index,
                        job.sheet.title,
                        loaded.facts.len(),
                        if loaded.from_cache { " (缓存)" } else { "" }
                    );
                    report.sources.push(SourceFacts {
                        category_id: job.category_id,
                        category_name: job.category_name,
                        sheet: job.sheet,
                        sheet_index: job.sheet_index,
                        facts: loaded.facts,
                    });
                }
                Ok(Err(e)) => {
                    warn!("[来源 {}] ⚠️ 抓取失败，跳过: {}", job_index, e);
                    report.failed += 1;
                }
                Err(e) => {
                    error!("[来源 {}] 抓取任务执行失败: {}", job_index, e);
                    report.failed += 1;
                }
            }
        }

        report.pool_inputs = std::mem::take(&mut *pool_inputs.lock().expect("pool accumulator poisoned"));

        info!(
            "✓ 抓取完成: 成功 {}, 失败 {}, 缓存命中 {}",
            report.sources.len(),
            report.failed,
            report.cache_hits
        );
        report
    }
}

struct LoadedFacts {
    facts: Vec<String>,
    from_cache: bool,
}

async fn load_facts(
    fetcher: &dyn PageFetcher,
    cache: &ContentCache,
    url: &str,
    limits: &FetchLimits,
) -> Result<LoadedFacts, FetchError> {
    if let Some(facts) = cache.get(url) {
        return Ok(LoadedFacts {
            facts,
            from_cache: true,
        });
    }

    let lines = fetcher.fetch(url).await?;
    let facts: Vec<String> = lines
        .iter()
        .map(|line| clean_text(line))
        .filter(|fact| within_fact_length(fact, limits.min_fact_len, limits.max_fact_len))
        .collect();

    cache.put(url, facts.clone());
    Ok(LoadedFacts {
        facts,
        from_cache: false,
    })
}
