//! 题库 - 业务能力层
//!
//! 进程内唯一的权威题库副本，启动时从文件加载一次，之后通过 add / set 修改，
//! 需要时整体序列化回文件。
//!
//! - 修改和持久化持有写锁，读取持有读锁
//! - 持久化失败不会回滚内存中的修改，只把错误返回给调用方
//! - 题库为空时所有读取都返回空结果

use crate::error::BankError;
use crate::models::bank::{BankDocument, BankQuestion, Metadata, RawBank, BANK_VERSION};
use crate::models::loaders::{parse_bank_document, BankSource};
use crate::models::{CategoryInfo, CheatSheet, Question};
use chrono::{SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// 题库状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankStatus {
    /// 没有任何题目
    Empty,
    /// 至少有一道题
    Populated,
}

/// 题库
pub struct QuestionBank {
    document: RwLock<BankDocument>,
    path: Option<PathBuf>,
}

impl QuestionBank {
    /// 没有绑定文件的空题库
    pub fn in_memory() -> Self {
        Self {
            document: RwLock::new(BankDocument::default()),
            path: None,
        }
    }

    /// 从文件加载题库
    ///
    /// 文件不存在或为空时得到空题库；原始格式会先转换
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, BankError> {
        let path = path.into();
        let document = read_document(&path)?;
        info!(
            "题库加载完成: {} ({} 个分类, {} 道题)",
            path.display(),
            document.questions.len(),
            document.question_count()
        );
        Ok(Self {
            document: RwLock::new(document),
            path: Some(path),
        })
    }

    /// 绑定的文件路径
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 追加题目到分类
    pub fn add(&self, category_id: &str, questions: Vec<BankQuestion>) {
        let mut document = self.document.write().expect("question bank poisoned");
        document
            .questions
            .entry(category_id.to_string())
            .or_default()
            .extend(questions);
        document.generated = now_rfc3339();
    }

    /// 替换分类下的全部题目
    pub fn set(&self, category_id: &str, questions: Vec<BankQuestion>) {
        let mut document = self.document.write().expect("question bank poisoned");
        document
            .questions
            .insert(category_id.to_string(), questions);
        document.generated = now_rfc3339();
    }

    /// 把题目按分类追加进题库，跳过题库中已有 ID 的题目
    ///
    /// 返回实际追加的题目数
    pub fn archive(&self, questions: &[Question], generated: &str) -> usize {
        let mut document = self.document.write().expect("question bank poisoned");
        let mut known: HashSet<String> = document
            .questions
            .values()
            .flatten()
            .map(|q| q.id.clone())
            .collect();

        let mut archived = 0;
        for question in questions {
            if !known.insert(question.id.clone()) {
                debug!("题库中已有题目 {}，跳过", question.id);
                continue;
            }
            document
                .questions
                .entry(question.category_id.clone())
                .or_default()
                .push(BankQuestion::from_question(question, generated));
            archived += 1;
        }

        if archived > 0 {
            document.generated = generated.to_string();
        }
        archived
    }

    /// 导入一批原始格式的题目，按分类追加
    ///
    /// 批内按题干精确去重；返回实际导入的题目数
    pub fn ingest_raw(&self, raw: RawBank) -> usize {
        let converted = convert_raw(raw);
        let ingested = converted.question_count();

        let mut document = self.document.write().expect("question bank poisoned");
        if document.version.is_empty() {
            document.version = converted.version;
        }
        for (key, value) in converted.meta {
            document.meta.insert(key, value);
        }
        for (category_id, questions) in converted.questions {
            document
                .questions
                .entry(category_id)
                .or_default()
                .extend(questions);
        }
        document.generated = converted.generated;

        info!("导入原始题目 {} 道", ingested);
        ingested
    }

    /// 从指定分类中按种子随机抽取题目
    ///
    /// 同样的题库内容、分类和种子得到同样的结果；可用题目不足时全部返回
    pub fn get_random<S: AsRef<str>>(&self, category_ids: &[S], count: usize, seed: u64) -> Vec<Question> {
        let document = self.document.read().expect("question bank poisoned");

        let mut requested = HashSet::new();
        let mut pool: Vec<&BankQuestion> = Vec::new();
        for id in category_ids {
            let id = id.as_ref();
            if !requested.insert(id) {
                continue;
            }
            if let Some(questions) = document.questions.get(id) {
                pool.extend(questions.iter());
            }
        }

        if pool.is_empty() {
            return Vec::new();
        }

        let mut rng = StdRng::seed_from_u64(seed);
        pool.shuffle(&mut rng);

        pool.into_iter()
            .take(count)
            .map(BankQuestion::to_question)
            .collect()
    }

    /// 各分类题目数量
    pub fn stats(&self) -> BTreeMap<String, usize> {
        let document = self.document.read().expect("question bank poisoned");
        document
            .questions
            .iter()
            .map(|(id, questions)| (id.clone(), questions.len()))
            .collect()
    }

    /// 题库中出现过的分类，按 ID 排序
    pub fn categories(&self) -> Vec<CategoryInfo> {
        let document = self.document.read().expect("question bank poisoned");
        let mut names: BTreeMap<&str, &str> = BTreeMap::new();
        for question in document.questions.values().flatten() {
            names
                .entry(question.category_id.as_str())
                .or_insert(question.category.as_str());
        }
        names
            .into_iter()
            .map(|(id, name)| CategoryInfo {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect()
    }

    /// 题库中出现过的来源速查表，按名称排序
    pub fn cheat_sheets(&self) -> Vec<CheatSheet> {
        let document = self.document.read().expect("question bank poisoned");
        let mut sheets: BTreeMap<&str, &str> = BTreeMap::new();
        for question in document.questions.values().flatten() {
            if !question.source.is_empty() && !question.url.is_empty() {
                sheets.insert(question.source.as_str(), question.url.as_str());
            }
        }
        sheets
            .into_iter()
            .map(|(title, url)| CheatSheet::new(title, url))
            .collect()
    }

    /// 元数据副本
    pub fn metadata(&self) -> Metadata {
        self.document
            .read()
            .expect("question bank poisoned")
            .meta
            .clone()
    }

    /// 整个题库文档的副本
    pub fn snapshot(&self) -> BankDocument {
        self.document.read().expect("question bank poisoned").clone()
    }

    pub fn is_empty(&self) -> bool {
        self.document
            .read()
            .expect("question bank poisoned")
            .question_count()
            == 0
    }

    pub fn status(&self) -> BankStatus {
        if self.is_empty() {
            BankStatus::Empty
        } else {
            BankStatus::Populated
        }
    }

    /// 整体序列化写回文件
    pub fn persist(&self) -> Result<(), BankError> {
        let path = self.path.as_ref().ok_or(BankError::NoBackingStore)?;
        let mut document = self.document.write().expect("question bank poisoned");
        if document.version.is_empty() {
            document.version = BANK_VERSION.to_string();
        }
        let contents = serde_json::to_string_pretty(&*document)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BankError::io(parent.display().to_string(), e))?;
        }
        fs::write(path, contents).map_err(|e| BankError::io(path.display().to_string(), e))?;

        debug!("题库已保存: {}", path.display());
        Ok(())
    }

    /// 从文件重新加载，替换内存中的题库
    pub fn reload(&self) -> Result<(), BankError> {
        let path = self.path.as_ref().ok_or(BankError::NoBackingStore)?;
        let mut document = self.document.write().expect("question bank poisoned");
        *document = read_document(path)?;
        info!("题库已重新加载: {}", path.display());
        Ok(())
    }
}

impl From<BankDocument> for QuestionBank {
    fn from(document: BankDocument) -> Self {
        Self {
            document: RwLock::new(document),
            path: None,
        }
    }
}

fn read_document(path: &Path) -> Result<BankDocument, BankError> {
    if !path.exists() {
        info!("题库文件不存在，使用空题库: {}", path.display());
        return Ok(BankDocument::default());
    }

    let content =
        fs::read_to_string(path).map_err(|e| BankError::io(path.display().to_string(), e))?;

    Ok(match parse_bank_document(&content)? {
        BankSource::Empty => BankDocument::default(),
        BankSource::Raw(raw) => convert_raw(raw),
        BankSource::Canonical(document) => document,
    })
}

/// 原始导入格式转换为题库格式
///
/// - topic 冒号前为分类 ID，冒号后为来源名称
/// - 每道题分配新的 ID 和入库时间
/// - 答案下标越界的题目被跳过
/// - 批内题干完全相同的只保留第一道
pub fn convert_raw(raw: RawBank) -> BankDocument {
    let generated = now_rfc3339();
    let mut questions: BTreeMap<String, Vec<BankQuestion>> = BTreeMap::new();
    let mut seen_stems: HashSet<String> = HashSet::new();

    for raw_question in raw.questions {
        let Some(answer_index) = raw_question.answer_index() else {
            warn!(
                "答案下标无效，跳过: {}",
                crate::utils::truncate_text(&raw_question.question, 60)
            );
            continue;
        };
        if !seen_stems.insert(raw_question.question.clone()) {
            debug!(
                "重复题干，跳过: {}",
                crate::utils::truncate_text(&raw_question.question, 60)
            );
            continue;
        }

        let category_id = raw_question.category_id();
        let question = BankQuestion {
            id: uuid::Uuid::new_v4().to_string(),
            category_id: category_id.clone(),
            category: raw_question.topic.trim().to_string(),
            source: raw_question.label(),
            stem: raw_question.question,
            options: raw_question.options,
            answer_index,
            url: raw_question.source,
            explanation: raw_question.explanation,
            generated: generated.clone(),
        };
        questions.entry(category_id).or_default().push(question);
    }

    BankDocument {
        version: BANK_VERSION.to_string(),
        generated,
        meta: raw.meta,
        questions,
    }
}

/// 当前时间（RFC 3339，精确到秒）
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
