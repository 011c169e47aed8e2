//! 答卷评分
//!
//! 按题目 ID 对照作答，统计总分和各分类得分。
//! 得分达到总题数的 75%（向上取整）即为通过。

use crate::models::Question;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// 通过线：答对题数占比
pub const PASS_RATIO_PERCENT: usize = 75;

/// 单个分类的得分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    pub score: usize,
    pub total: usize,
}

/// 评分结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub score: usize,
    pub total: usize,
    pub passed: bool,
    /// 分类 ID -> 得分
    pub per_category: BTreeMap<String, CategoryScore>,
}

/// 通过所需的最少答对题数
pub fn pass_threshold(total: usize) -> usize {
    (total * PASS_RATIO_PERCENT).div_ceil(100)
}

/// 对照作答评分
///
/// `answers` 以题目 ID 为键、所选选项下标为值；未作答的题目计为答错
pub fn grade(questions: &[Question], answers: &HashMap<String, usize>) -> Grade {
    let mut per_category: BTreeMap<String, CategoryScore> = BTreeMap::new();
    let mut score = 0;

    for question in questions {
        let entry = per_category
            .entry(question.category_id.clone())
            .or_default();
        entry.total += 1;
        if answers.get(&question.id) == Some(&question.answer_index) {
            entry.score += 1;
            score += 1;
        }
    }

    let total = questions.len();
    Grade {
        score,
        total,
        passed: score >= pass_threshold(total),
        per_category,
    }
}
