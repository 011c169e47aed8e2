//! 单选题生成器
//!
//! 对一份速查表的事实按种子出题。选事实、抽干扰项、打乱选项、生成题目 ID
//! 都取自同一个随机数流，同样的种子和输入一定得到同样的题目。

use crate::error::QuizError;
use crate::models::{category_label, CheatSheet, Question};
use crate::services::distractor_pool::DistractorPool;
use crate::services::stem_enhancer::{NoopStemEnhancer, StemEnhancer};
use crate::utils::text::sanitize;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// 每份速查表最多选取的事实数
pub const MAX_FACTS_PER_SHEET: usize = 20;
/// 每份速查表最多生成的题目数
pub const MAX_QUESTIONS_PER_SHEET: usize = 25;
/// 每道题的选项数
pub const OPTIONS_PER_QUESTION: usize = 4;
/// 干扰项池的最小条目数
pub const MIN_POOL_SIZE: usize = 3;
/// 默认的题干改写超时
pub const DEFAULT_STEM_TIMEOUT: Duration = Duration::from_secs(4);

/// 一次出题的输入
#[derive(Debug, Clone, Copy)]
pub struct McqInput<'a> {
    pub category_id: &'a str,
    pub category_name: &'a str,
    pub sheet: &'a CheatSheet,
    pub facts: &'a [String],
    pub seed: u64,
}

/// 一份速查表生成的题目
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct McqBundle {
    pub questions: Vec<Question>,
    /// 题干改写失败或超时、回退到模板题干的次数
    pub stem_fallbacks: usize,
}

impl McqBundle {
    pub fn fallback_used(&self) -> bool {
        self.stem_fallbacks > 0
    }
}

/// 单选题生成器
pub struct McqBuilder {
    enhancer: Arc<dyn StemEnhancer>,
    stem_timeout: Duration,
}

impl McqBuilder {
    pub fn new(enhancer: Arc<dyn StemEnhancer>, stem_timeout: Duration) -> Self {
        Self {
            enhancer,
            stem_timeout,
        }
    }

    /// 不改写题干的生成器
    pub fn without_enhancer() -> Self {
        Self::new(Arc::new(NoopStemEnhancer), DEFAULT_STEM_TIMEOUT)
    }

    /// 为一份速查表出题
    ///
    /// 事实为空或干扰项池少于 3 条时返回 `InsufficientFacts`
    pub async fn build(
        &self,
        input: McqInput<'_>,
        pool: &DistractorPool,
    ) -> Result<McqBundle, QuizError> {
        if input.facts.is_empty() || pool.len() < MIN_POOL_SIZE {
            return Err(QuizError::InsufficientFacts {
                facts: input.facts.len(),
                pool: pool.len(),
            });
        }

        let mut rng = StdRng::seed_from_u64(input.seed);

        let sanitized_pool: Vec<String> = pool.iter().map(sanitize).collect();
        let distinct: HashSet<&str> = sanitized_pool
            .iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();

        let mut picks: Vec<usize> = (0..input.facts.len()).collect();
        picks.shuffle(&mut rng);
        picks.truncate(MAX_FACTS_PER_SHEET.min(input.facts.len()));

        let category_label = category_label(input.category_id, input.category_name);
        let namespace = source_namespace(input.category_id, &input.sheet.url);
        let mut bundle = McqBundle::default();

        for ix in picks {
            let correct = sanitize(&input.facts[ix]);
            if correct.is_empty() {
                continue;
            }

            let available = distinct.len() - usize::from(distinct.contains(correct.as_str()));
            if available < OPTIONS_PER_QUESTION - 1 {
                debug!(
                    "干扰项不足，跳过事实: {} (可用 {})",
                    crate::utils::truncate_text(&correct, 40),
                    available
                );
                continue;
            }

            let mut options = vec![correct.clone()];
            let mut seen: HashSet<&str> = HashSet::from([correct.as_str()]);
            while options.len() < OPTIONS_PER_QUESTION {
                let drawn = &sanitized_pool[rng.gen_range(0..sanitized_pool.len())];
                if !drawn.is_empty() && seen.insert(drawn.as_str()) {
                    options.push(drawn.clone());
                }
            }

            options.shuffle(&mut rng);
            let answer_index = options
                .iter()
                .position(|o| *o == correct)
                .unwrap_or_default();
            let id = Uuid::new_v5(&namespace, &rng.gen::<[u8; 16]>());

            let (stem, fell_back) = self
                .resolve_stem(input.category_name, &input.sheet.title, &correct)
                .await;
            if fell_back {
                bundle.stem_fallbacks += 1;
            }

            bundle.questions.push(Question {
                id: id.to_string(),
                stem,
                options,
                answer_index,
                source: input.sheet.title.clone(),
                url: input.sheet.url.clone(),
                category: category_label.clone(),
                category_id: input.category_id.to_string(),
                explanation: None,
            });

            if bundle.questions.len() >= MAX_QUESTIONS_PER_SHEET {
                break;
            }
        }

        if bundle.fallback_used() {
            warn!(
                "{} 有 {} 道题使用了模板题干",
                input.sheet.title, bundle.stem_fallbacks
            );
        }

        Ok(bundle)
    }

    /// 返回 (题干, 是否回退)
    async fn resolve_stem(&self, category_name: &str, title: &str, fact: &str) -> (String, bool) {
        let enhanced = tokio::time::timeout(
            self.stem_timeout,
            self.enhancer.enhance(category_name, title, fact),
        )
        .await;

        match enhanced {
            Ok(Ok(None)) => (default_stem(title), false),
            Ok(Ok(Some(stem))) if !stem.trim().is_empty() => (stem.trim().to_string(), false),
            Ok(Ok(Some(_))) => (default_stem(title), true),
            Ok(Err(e)) => {
                debug!("题干改写失败: {}", e);
                (default_stem(title), true)
            }
            Err(_) => {
                debug!("题干改写超时 ({:?})", self.stem_timeout);
                (default_stem(title), true)
            }
        }
    }
}

/// 来源专属的 ID 命名空间
///
/// 不同来源即使种子相同，生成的题目 ID 也不会重复
fn source_namespace(category_id: &str, url: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{}#{}", url, category_id).as_bytes())
}

/// 模板题干
pub fn default_stem(cheat_title: &str) -> String {
    format!(
        "Which of the following aligns with guidance from \"{}\"?",
        cheat_title
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn sheet() -> CheatSheet {
        CheatSheet::new(
            "Password Storage Cheat Sheet",
            "https://example.org/password.html",
        )
    }

    fn facts() -> Vec<String> {
        (0..30)
            .map(|i| format!("Password storage guidance number {}", i))
            .collect()
    }

    fn pool() -> DistractorPool {
        DistractorPool::merge([vec![
            "Use a strong adaptive hashing function",
            "Apply a unique salt to every password",
            "Never store passwords in plain text",
            "Use a pepper kept outside the database",
            "Upgrade legacy hashes on next login",
        ]])
    }

    fn input<'a>(sheet: &'a CheatSheet, facts: &'a [String], seed: u64) -> McqInput<'a> {
        McqInput {
            category_id: "A02",
            category_name: "Cryptographic Failures",
            sheet,
            facts,
            seed,
        }
    }

    #[tokio::test]
    async fn test_insufficient_facts() {
        let builder = McqBuilder::without_enhancer();
        let sheet = sheet();
        let err = builder.build(input(&sheet, &[], 1), &pool()).await.unwrap_err();
        assert_eq!(err, QuizError::InsufficientFacts { facts: 0, pool: 5 });

        let small = DistractorPool::merge([vec!["Only two entries here", "And another entry"]]);
        let facts = facts();
        let err = builder.build(input(&sheet, &facts, 1), &small).await.unwrap_err();
        assert_eq!(err, QuizError::InsufficientFacts { facts: 30, pool: 2 });
    }

    #[tokio::test]
    async fn test_question_shape() {
        let builder = McqBuilder::without_enhancer();
        let sheet = sheet();
        let facts = facts();
        let bundle = builder.build(input(&sheet, &facts, 42), &pool()).await.unwrap();

        assert_eq!(bundle.questions.len(), MAX_FACTS_PER_SHEET);
        assert_eq!(bundle.stem_fallbacks, 0);
        for q in &bundle.questions {
            assert_eq!(q.options.len(), 4);
            let unique: HashSet<_> = q.options.iter().collect();
            assert_eq!(unique.len(), 4);
            assert!(q.options.iter().all(|o| !o.is_empty()));
            assert!(q.answer_index < 4);
            assert!(q.correct_option().unwrap().starts_with("Password storage guidance"));
            assert_eq!(q.stem, default_stem("Password Storage Cheat Sheet"));
            assert_eq!(q.category, "A02 – Cryptographic Failures");
            assert_eq!(q.category_id, "A02");
        }
    }

    #[tokio::test]
    async fn test_same_seed_same_questions() {
        let builder = McqBuilder::without_enhancer();
        let sheet = sheet();
        let facts = facts();
        let first = builder.build(input(&sheet, &facts, 7), &pool()).await.unwrap();
        let second = builder.build(input(&sheet, &facts, 7), &pool()).await.unwrap();
        assert_eq!(
            serde_json::to_string(&first.questions).unwrap(),
            serde_json::to_string(&second.questions).unwrap()
        );

        let other = builder.build(input(&sheet, &facts, 8), &pool()).await.unwrap();
        assert_ne!(first.questions, other.questions);
    }

    #[tokio::test]
    async fn test_ids_differ_between_sources_with_same_seed() {
        let builder = McqBuilder::without_enhancer();
        let facts = facts();
        let first_sheet = sheet();
        let second_sheet = CheatSheet::new("Key Management Cheat Sheet", "https://example.org/keys.html");

        let first = builder.build(input(&first_sheet, &facts, 42), &pool()).await.unwrap();
        let second = builder.build(input(&second_sheet, &facts, 42), &pool()).await.unwrap();

        let mut ids: HashSet<&str> = first.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), first.questions.len());
        for q in &second.questions {
            assert!(ids.insert(q.id.as_str()), "duplicate id {}", q.id);
        }
        assert!(first.questions.iter().all(|q| Uuid::parse_str(&q.id).is_ok()));
    }

    #[tokio::test]
    async fn test_skips_facts_that_sanitize_to_empty() {
        let builder = McqBuilder::without_enhancer();
        let sheet = sheet();
        let facts = vec!["- ok.".to_string(), "Store only salted password hashes".to_string()];
        let bundle = builder.build(input(&sheet, &facts, 3), &pool()).await.unwrap();
        assert_eq!(bundle.questions.len(), 1);
        assert_eq!(
            bundle.questions[0].correct_option(),
            Some("Store only salted password hashes")
        );
    }

    #[tokio::test]
    async fn test_skips_fact_when_pool_cannot_supply_distractors() {
        let builder = McqBuilder::without_enhancer();
        let sheet = sheet();
        let three = DistractorPool::merge([vec![
            "Use a strong adaptive hashing function",
            "Apply a unique salt to every password",
            "Never store passwords in plain text",
        ]]);
        let facts = vec!["Never store passwords in plain text".to_string()];
        let bundle = builder.build(input(&sheet, &facts, 3), &three).await.unwrap();
        assert!(bundle.questions.is_empty());
    }

    struct FixedEnhancer;

    #[async_trait]
    impl StemEnhancer for FixedEnhancer {
        async fn enhance(&self, _: &str, title: &str, _: &str) -> anyhow::Result<Option<String>> {
            Ok(Some(format!("What does {} recommend?", title)))
        }
    }

    struct SlowEnhancer;

    #[async_trait]
    impl StemEnhancer for SlowEnhancer {
        async fn enhance(&self, _: &str, _: &str, _: &str) -> anyhow::Result<Option<String>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some("too late".to_string()))
        }
    }

    struct FailingEnhancer;

    #[async_trait]
    impl StemEnhancer for FailingEnhancer {
        async fn enhance(&self, _: &str, _: &str, _: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("upstream unavailable")
        }
    }

    #[tokio::test]
    async fn test_enhancer_replaces_stem() {
        let builder = McqBuilder::new(Arc::new(FixedEnhancer), Duration::from_secs(1));
        let sheet = sheet();
        let facts = facts();
        let bundle = builder.build(input(&sheet, &facts[..2], 9), &pool()).await.unwrap();
        assert_eq!(bundle.stem_fallbacks, 0);
        assert!(bundle
            .questions
            .iter()
            .all(|q| q.stem == "What does Password Storage Cheat Sheet recommend?"));
    }

    #[tokio::test]
    async fn test_enhancer_timeout_and_error_fall_back() {
        let sheet = sheet();
        let facts = facts();

        let slow = McqBuilder::new(Arc::new(SlowEnhancer), Duration::from_millis(10));
        let bundle = slow.build(input(&sheet, &facts[..2], 9), &pool()).await.unwrap();
        assert_eq!(bundle.stem_fallbacks, 2);
        assert!(bundle.fallback_used());

        let failing = McqBuilder::new(Arc::new(FailingEnhancer), Duration::from_secs(1));
        let failed = failing.build(input(&sheet, &facts[..2], 9), &pool()).await.unwrap();
        assert_eq!(failed.stem_fallbacks, 2);

        // 回退后的题目与不改写时完全相同
        let plain = McqBuilder::without_enhancer()
            .build(input(&sheet, &facts[..2], 9), &pool())
            .await
            .unwrap();
        assert_eq!(bundle.questions, plain.questions);
    }
}
