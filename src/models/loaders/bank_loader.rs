//! 题库文档解析
//!
//! 通过顶层字段判断格式：带 `version` 的是转换后的题库，
//! 否则带 `meta` 的是原始导入格式

use crate::error::BankError;
use crate::models::bank::{BankDocument, RawBank};
use serde_json::Value as JsonValue;

/// 解析出的题库来源
#[derive(Debug, Clone, PartialEq)]
pub enum BankSource {
    /// 空文件
    Empty,
    /// 原始导入格式，需要转换
    Raw(RawBank),
    /// 已转换的题库格式
    Canonical(BankDocument),
}

/// 解析题库文件内容
pub fn parse_bank_document(content: &str) -> Result<BankSource, BankError> {
    if content.trim().is_empty() {
        return Ok(BankSource::Empty);
    }

    let value: JsonValue = serde_json::from_str(content)?;
    let fields = value.as_object().ok_or(BankError::UnknownFormat)?;

    if fields.contains_key("version") {
        let document: BankDocument = serde_json::from_value(value)?;
        return Ok(BankSource::Canonical(document));
    }

    if fields.contains_key("meta") {
        let raw: RawBank = serde_json::from_value(value)?;
        return Ok(BankSource::Raw(raw));
    }

    Err(BankError::UnknownFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_raw_format() {
        let content = r#"{"meta": {"title": "Top 10"}, "questions": [
            {"topic": "A01: Broken Access Control", "question": "Q?", "options": ["a","b"], "answer": 0}
        ]}"#;
        match parse_bank_document(content).unwrap() {
            BankSource::Raw(raw) => {
                assert_eq!(raw.questions.len(), 1);
                assert_eq!(raw.meta["title"], "Top 10");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_canonical_wins_when_both_fields_present() {
        let content = r#"{"version": "1.0", "generated": "", "meta": {}, "questions": {}}"#;
        assert!(matches!(
            parse_bank_document(content).unwrap(),
            BankSource::Canonical(_)
        ));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(parse_bank_document("  \n").unwrap(), BankSource::Empty);
        assert!(matches!(
            parse_bank_document(r#"{"foo": 1}"#),
            Err(BankError::UnknownFormat)
        ));
        assert!(matches!(parse_bank_document("[1]"), Err(BankError::UnknownFormat)));
        assert!(matches!(parse_bank_document("{"), Err(BankError::Json(_))));
    }
}
