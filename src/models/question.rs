use serde::{Deserialize, Serialize};

/// 对外提供的单选题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub stem: String,
    pub options: Vec<String>,
    pub answer_index: usize,
    /// 来源速查表标题
    pub source: String,
    /// 来源速查表地址
    pub url: String,
    /// 分类标签
    pub category: String,
    pub category_id: String,
    /// 仅题库题目带有解析
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// 正确选项的文本
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.answer_index).map(String::as_str)
    }
}

/// 一套试卷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub questions: Vec<Question>,
}
