use crate::models::question::Question;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// 原样透传的元数据文档（保持键顺序）
pub type Metadata = serde_json::Map<String, JsonValue>;

/// 转换后的题库格式版本
pub const BANK_VERSION: &str = "1.0";

/// 没有冒号的 topic 使用的来源名称
const DEFAULT_SOURCE_LABEL: &str = "OWASP";

/// 题库中保存的题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankQuestion {
    pub id: String,
    pub category_id: String,
    pub category: String,
    pub stem: String,
    pub options: Vec<String>,
    pub answer_index: usize,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    /// 答题解析
    #[serde(default)]
    pub explanation: String,
    /// 入库时间（RFC 3339）
    #[serde(default)]
    pub generated: String,
}

impl BankQuestion {
    /// 转成对外的题目结构
    pub fn to_question(&self) -> Question {
        Question {
            id: self.id.clone(),
            stem: self.stem.clone(),
            options: self.options.clone(),
            answer_index: self.answer_index,
            source: self.source.clone(),
            url: self.url.clone(),
            category: self.category.clone(),
            category_id: self.category_id.clone(),
            explanation: Some(self.explanation.clone()).filter(|e| !e.is_empty()),
        }
    }

    /// 把在线生成的题目收进题库
    pub fn from_question(question: &Question, generated: impl Into<String>) -> Self {
        Self {
            id: question.id.clone(),
            category_id: question.category_id.clone(),
            category: question.category.clone(),
            stem: question.stem.clone(),
            options: question.options.clone(),
            answer_index: question.answer_index,
            source: question.source.clone(),
            url: question.url.clone(),
            explanation: question.explanation.clone().unwrap_or_default(),
            generated: generated.into(),
        }
    }
}

/// 持久化的题库文档
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankDocument {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub generated: String,
    #[serde(default)]
    pub meta: Metadata,
    /// 分类 ID -> 题目列表
    #[serde(default)]
    pub questions: BTreeMap<String, Vec<BankQuestion>>,
}

impl BankDocument {
    /// 题目总数
    pub fn question_count(&self) -> usize {
        self.questions.values().map(Vec::len).sum()
    }
}

/// 原始导入格式中的一道题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuestion {
    /// 形如 "A01: Broken Access Control"
    pub topic: String,
    #[serde(default)]
    pub difficulty: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: i64,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 来源地址
    #[serde(default)]
    pub source: String,
}

impl RawQuestion {
    /// 第一个冒号之前的部分作为分类 ID
    pub fn category_id(&self) -> String {
        self.topic
            .split_once(':')
            .map_or(self.topic.as_str(), |(id, _)| id)
            .trim()
            .to_string()
    }

    /// 第一个冒号之后的部分作为来源名称
    pub fn label(&self) -> String {
        self.topic
            .split_once(':')
            .map(|(_, rest)| rest.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SOURCE_LABEL.to_string())
    }

    /// 答案下标，越界或为负时返回 None
    pub fn answer_index(&self) -> Option<usize> {
        usize::try_from(self.answer)
            .ok()
            .filter(|ix| *ix < self.options.len())
    }
}

/// 原始导入文档
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBank {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}
