//! 题干改写能力
//!
//! 出题时可以注入一个改写器，把模板题干换成更自然的问法。
//! 未配置时使用 [`NoopStemEnhancer`]，始终保留模板题干。

use crate::services::llm_service::LlmService;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// 题干改写能力
///
/// 返回 `Ok(None)` 表示不改写；超时由调用方控制
#[async_trait]
pub trait StemEnhancer: Send + Sync {
    async fn enhance(
        &self,
        category_name: &str,
        cheat_title: &str,
        correct_fact: &str,
    ) -> Result<Option<String>>;
}

/// 不做任何改写
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStemEnhancer;

#[async_trait]
impl StemEnhancer for NoopStemEnhancer {
    async fn enhance(&self, _: &str, _: &str, _: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

const SYSTEM_PROMPT: &str = "You write concise multiple-choice question stems for \
security awareness quizzes. Reply with a single question sentence only. \
Never reveal or paraphrase the correct answer in the question.";

/// 使用 LLM 改写题干
pub struct LlmStemEnhancer {
    llm: LlmService,
}

impl LlmStemEnhancer {
    pub fn new(llm: LlmService) -> Self {
        Self { llm }
    }

    fn build_prompt(category_name: &str, cheat_title: &str, correct_fact: &str) -> String {
        format!(
            "Category: {}\nReference document: \"{}\"\nCorrect answer: {}\n\n\
             Write one question whose correct answer is the statement above.",
            category_name, cheat_title, correct_fact
        )
    }
}

#[async_trait]
impl StemEnhancer for LlmStemEnhancer {
    async fn enhance(
        &self,
        category_name: &str,
        cheat_title: &str,
        correct_fact: &str,
    ) -> Result<Option<String>> {
        let prompt = Self::build_prompt(category_name, cheat_title, correct_fact);
        let response = self.llm.send_to_llm(&prompt, Some(SYSTEM_PROMPT)).await?;

        let stem = response.trim_matches(|c: char| c == '"' || c.is_whitespace());
        if stem.is_empty() {
            anyhow::bail!("LLM 返回的题干为空 (模型: {})", self.llm.model_name());
        }

        debug!("题干改写完成: {}", stem);
        Ok(Some(stem.to_string()))
    }
}
