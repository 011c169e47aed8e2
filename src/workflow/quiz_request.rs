//! 出题请求
//!
//! 封装"出哪些分类、出多少题、用什么种子"这一信息

use std::fmt::Display;

/// 请求题数的下限
pub const MIN_QUESTION_COUNT: usize = 5;

/// 未指定题数时的默认值
pub const DEFAULT_QUESTION_COUNT: usize = 20;

/// 出题请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    /// 请求的分类 ID，为空表示全部分类
    pub category_ids: Vec<String>,

    /// 题目数量（至少 5）
    pub count: usize,

    /// 随机种子
    pub seed: u64,
}

impl QuizRequest {
    /// 创建出题请求
    ///
    /// - 去掉空白和重复的分类 ID
    /// - 题数缺省为 20，小于 5 时取 5
    /// - 种子缺省为当前时间（纳秒）
    pub fn new(category_ids: Vec<String>, count: Option<usize>, seed: Option<u64>) -> Self {
        let mut ids: Vec<String> = Vec::with_capacity(category_ids.len());
        for id in category_ids {
            let id = id.trim();
            if !id.is_empty() && !ids.iter().any(|known| known == id) {
                ids.push(id.to_string());
            }
        }

        Self {
            category_ids: ids,
            count: count
                .unwrap_or(DEFAULT_QUESTION_COUNT)
                .max(MIN_QUESTION_COUNT),
            seed: seed.unwrap_or_else(time_seed),
        }
    }

    /// 某份速查表使用的种子
    pub fn source_seed(&self, sheet_index: usize) -> u64 {
        self.seed.wrapping_add(sheet_index as u64)
    }
}

impl Display for QuizRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let categories = if self.category_ids.is_empty() {
            "全部".to_string()
        } else {
            self.category_ids.join(",")
        };
        write!(
            f,
            "[分类 {} 题数 {} 种子 {}]",
            categories, self.count, self.seed
        )
    }
}

fn time_seed() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .map_or(0, |nanos| nanos as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_is_clamped() {
        assert_eq!(QuizRequest::new(vec![], Some(2), Some(1)).count, 5);
        assert_eq!(QuizRequest::new(vec![], None, Some(1)).count, 20);
        assert_eq!(QuizRequest::new(vec![], Some(12), Some(1)).count, 12);
    }

    #[test]
    fn test_ids_are_trimmed_and_deduped() {
        let request = QuizRequest::new(
            vec![" A03".into(), "A01".into(), "".into(), "A03".into()],
            None,
            Some(7),
        );
        assert_eq!(request.category_ids, vec!["A03", "A01"]);
        assert_eq!(request.seed, 7);
        assert_eq!(request.source_seed(2), 9);
        assert_eq!(QuizRequest::new(vec![], None, Some(u64::MAX)).source_seed(1), 0);
    }

    #[test]
    fn test_display() {
        let request = QuizRequest::new(vec![], Some(10), Some(3));
        assert_eq!(request.to_string(), "[分类 全部 题数 10 种子 3]");
    }
}
