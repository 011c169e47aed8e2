//! 干扰项池
//!
//! 合并多个来源的事实：清洗、精确去重、按字典序排序。
//! 排序保证同样的输入得到同样的池，出题时才能按种子复现。

use crate::utils::text::sanitize;
use std::collections::HashSet;

/// 去重并排序后的干扰项池，出一套题期间只读共享
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistractorPool {
    entries: Vec<String>,
}

impl DistractorPool {
    /// 合并多个事实列表
    pub fn merge<I, L, S>(lists: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        for list in lists {
            for fact in list {
                let cleaned = sanitize(fact.as_ref());
                if !cleaned.is_empty() {
                    seen.insert(cleaned);
                }
            }
        }

        let mut entries: Vec<String> = seen.into_iter().collect();
        entries.sort();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
