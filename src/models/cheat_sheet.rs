use serde::{Deserialize, Serialize};

/// 一份外部速查表，作为事实来源
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheatSheet {
    pub title: String,
    pub url: String,
}

impl CheatSheet {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// 分类及其速查表（有序）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// 稳定的短代码，如 "A01"
    pub id: String,
    pub name: String,
    #[serde(rename = "cheatSheets", alias = "cheat_sheets", default)]
    pub cheat_sheets: Vec<CheatSheet>,
}

/// 分类目录文件的顶层结构
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryCatalog {
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// 题库中出现过的分类（ID + 名称）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
}

/// 题目中展示的分类标签，如 "A01 – Broken Access Control"
pub fn category_label(id: &str, name: &str) -> String {
    format!("{} – {}", id, name)
}
